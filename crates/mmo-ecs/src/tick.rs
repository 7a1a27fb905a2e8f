//! Fixed-step tick scheduler. Extends the teacher's single-stage,
//! dependency-ordered system list into the four stages spec.md §4.1
//! describes (pre-update, update, post-update, late), while keeping its
//! per-system timing diagnostics and its "compute sim time from tick index,
//! never accumulate" discipline — accumulating `tick * dt` in a running
//! float would drift after enough ticks; multiplying fresh each time does
//! not.

use crate::error::EcsError;
use crate::world::World;
use std::collections::HashSet;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TickStage {
    PreUpdate,
    Update,
    PostUpdate,
    Late,
}

impl TickStage {
    pub const ALL: [TickStage; 4] = [TickStage::PreUpdate, TickStage::Update, TickStage::PostUpdate, TickStage::Late];
}

/// A system is boxed rather than a bare `fn` pointer so it can close over
/// shared context (zone registry, process config) that the generic World
/// alone does not carry.
pub type SystemFn = Box<dyn FnMut(&mut World, f64) + Send>;

struct RegisteredSystem {
    name: String,
    stage: TickStage,
    priority: i32,
    after: Vec<String>,
    func: SystemFn,
}

#[derive(Clone, Debug, Default)]
pub struct TickDiagnostics {
    pub system_times: Vec<(String, Duration)>,
    pub command_apply_time: Duration,
    pub total_time: Duration,
}

#[derive(Clone, Copy, Debug)]
pub struct TickConfig {
    pub fixed_dt: f64,
    pub max_catch_up_ticks: u32,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 20.0,
            max_catch_up_ticks: 3,
        }
    }
}

pub struct TickLoop {
    world: World,
    systems: Vec<RegisteredSystem>,
    order_valid: bool,
    tick_counter: u64,
    config: TickConfig,
    last_diagnostics: TickDiagnostics,
}

impl TickLoop {
    pub fn new(world: World, config: TickConfig) -> Self {
        assert!(config.fixed_dt > 0.0 && config.fixed_dt.is_finite());
        Self {
            world,
            systems: Vec::new(),
            order_valid: false,
            tick_counter: 0,
            config,
            last_diagnostics: TickDiagnostics::default(),
        }
    }

    pub fn add_system(&mut self, name: &str, stage: TickStage, priority: i32, func: SystemFn) {
        self.add_system_after(name, stage, priority, &[], func);
    }

    pub fn add_system_after(
        &mut self,
        name: &str,
        stage: TickStage,
        priority: i32,
        after: &[&str],
        func: SystemFn,
    ) {
        self.systems.push(RegisteredSystem {
            name: name.to_string(),
            stage,
            priority,
            after: after.iter().map(|s| s.to_string()).collect(),
            func,
        });
        self.order_valid = false;
    }

    /// Validates every `after` reference exists and that the dependency
    /// graph within each stage is acyclic (DFS-based cycle detection).
    pub fn validate_system_order(&self) -> Result<(), EcsError> {
        let names: HashSet<&str> = self.systems.iter().map(|s| s.name.as_str()).collect();
        for system in &self.systems {
            for dep in &system.after {
                if !names.contains(dep.as_str()) {
                    return Err(EcsError::UnknownSystemDependency {
                        system: system.name.clone(),
                        after: dep.clone(),
                    });
                }
            }
        }

        for stage in TickStage::ALL {
            let stage_systems: Vec<&RegisteredSystem> = self.systems.iter().filter(|s| s.stage == stage).collect();
            let mut visiting: HashSet<&str> = HashSet::new();
            let mut visited: HashSet<&str> = HashSet::new();

            fn visit<'a>(
                name: &'a str,
                stage_systems: &[&'a RegisteredSystem],
                visiting: &mut HashSet<&'a str>,
                visited: &mut HashSet<&'a str>,
            ) -> Result<(), EcsError> {
                if visited.contains(name) {
                    return Ok(());
                }
                if !visiting.insert(name) {
                    return Err(EcsError::SystemOrderCycle { system: name.to_string() });
                }
                if let Some(sys) = stage_systems.iter().find(|s| s.name == name) {
                    for dep in &sys.after {
                        if stage_systems.iter().any(|s| s.name == *dep) {
                            visit(dep, stage_systems, visiting, visited)?;
                        }
                    }
                }
                visiting.remove(name);
                visited.insert(name);
                Ok(())
            }

            for system in &stage_systems {
                visit(&system.name, &stage_systems, &mut visiting, &mut visited)?;
            }
        }
        Ok(())
    }

    /// Orders systems within a stage by (priority, then topologically by
    /// `after`, then registration order) so observed order matches
    /// spec.md §5's `(priority, registration-order)` rule while still
    /// respecting explicit dependencies.
    fn ordered_stage_indices(&self, stage: TickStage) -> Vec<usize> {
        let mut indices: Vec<usize> = self
            .systems
            .iter()
            .enumerate()
            .filter(|(_, s)| s.stage == stage)
            .map(|(i, _)| i)
            .collect();
        indices.sort_by(|&a, &b| {
            self.systems[a]
                .priority
                .cmp(&self.systems[b].priority)
                .then(a.cmp(&b))
        });

        // Stable pass: move any system after its `after` dependencies.
        let mut result: Vec<usize> = Vec::with_capacity(indices.len());
        let mut placed: HashSet<usize> = HashSet::new();
        fn place(
            idx: usize,
            systems: &[RegisteredSystem],
            indices: &[usize],
            placed: &mut HashSet<usize>,
            result: &mut Vec<usize>,
        ) {
            if placed.contains(&idx) {
                return;
            }
            for dep_name in &systems[idx].after {
                if let Some(&dep_idx) = indices.iter().find(|&&j| systems[j].name == *dep_name) {
                    place(dep_idx, systems, indices, placed, result);
                }
            }
            placed.insert(idx);
            result.push(idx);
        }
        for idx in indices.clone() {
            place(idx, &self.systems, &indices, &mut placed, &mut result);
        }
        result
    }

    pub fn tick(&mut self) {
        if !self.order_valid {
            self.validate_system_order().expect("system ordering must be valid before ticking");
            self.order_valid = true;
        }

        let tick_start = Instant::now();
        let mut system_times = Vec::with_capacity(self.systems.len());
        let dt = self.config.fixed_dt;

        for stage in TickStage::ALL {
            for idx in self.ordered_stage_indices(stage) {
                let start = Instant::now();
                let system = &mut self.systems[idx];
                (system.func)(&mut self.world, dt);
                system_times.push((system.name.clone(), start.elapsed()));
            }
        }

        let apply_start = Instant::now();
        self.world.apply_deferred();
        let command_apply_time = apply_start.elapsed();

        self.tick_counter += 1;
        self.last_diagnostics = TickDiagnostics {
            system_times,
            command_apply_time,
            total_time: tick_start.elapsed(),
        };
    }

    pub fn run_ticks(&mut self, n: u32) {
        for _ in 0..n {
            self.tick();
        }
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    /// Derived from tick index, never accumulated, so it cannot drift.
    pub fn sim_time(&self) -> f64 {
        self.tick_counter as f64 * self.config.fixed_dt
    }

    pub fn fixed_dt(&self) -> f64 {
        self.config.fixed_dt
    }

    pub fn max_catch_up_ticks(&self) -> u32 {
        self.config.max_catch_up_ticks
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn last_diagnostics(&self) -> &TickDiagnostics {
        &self.last_diagnostics
    }

    pub fn system_count(&self) -> usize {
        self.systems.len()
    }
}
