//! Wires every subsystem's free functions into the four-stage `TickLoop`.
//! Shared context the `World` alone does not carry (zone registry, the
//! deterministic RNG, the behavior tree registry, per-entity patrol routes)
//! is captured by each system's closure behind an `Arc<Mutex<_>>` —
//! `SystemFn` requires `Send`, so that is the price of keeping it unchanged
//! rather than threading this context through `TickLoop` itself.

use mmo_ai::prelude::*;
use mmo_combat::prelude::*;
use mmo_ecs::prelude::*;
use mmo_spatial::prelude::ZoneRegistry;
use rand_pcg::Pcg32;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Design constant a production deployment would pull from `SimConfig`;
/// kept here since the composition root is the one place that owns both
/// the tick loop and the config values simultaneously.
pub const THREAT_IDLE_DECAY_TICKS: u64 = 5 * 20;
const NPC_MOVE_SPEED: f32 = 5.0;

/// Shared composition-root state every closure clones a handle to.
/// `tick` mirrors `TickLoop`'s own private counter so a system can recover
/// "now" without `TickLoop` threading it through `SystemFn`'s signature.
pub struct SimContext {
    pub zones: Arc<Mutex<ZoneRegistry>>,
    pub rng: Arc<Mutex<Pcg32>>,
    pub tree_registry: Arc<Mutex<TreeRegistry>>,
    pub patrol_routes: Arc<Mutex<HashMap<EntityId, Vec<Vec3>>>>,
    pub tick: Arc<AtomicU64>,
}

impl SimContext {
    pub fn new(zones: ZoneRegistry, rng_seed: u64) -> Self {
        Self {
            zones: Arc::new(Mutex::new(zones)),
            rng: Arc::new(Mutex::new(Pcg32::new(rng_seed, 0))),
            tree_registry: Arc::new(Mutex::new(TreeRegistry::new())),
            patrol_routes: Arc::new(Mutex::new(HashMap::new())),
            tick: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn now(&self) -> u64 {
        self.tick.load(Ordering::Relaxed)
    }
}

/// The zone every wired system assumes. A deployment with more than one
/// registered zone needs a per-entity zone lookup (`Transform::zone_id`)
/// threaded through each closure instead of this constant; left as a single
/// zone here since the reference wiring only registers one.
const PRIMARY_ZONE: u32 = 0;

fn steer_toward(world: &mut World, entity: EntityId, target: Vec3, speed_cap: f32) {
    let Ok(position) = world.get::<Transform>(entity).map(|t| t.position) else { return };
    let Ok(movement) = world.get_mut::<Movement>(entity) else { return };
    let dx = target.x - position.x;
    let dy = target.y - position.y;
    let len = (dx * dx + dy * dy).sqrt();
    movement.velocity = if len > 0.1 {
        Vec3::new(dx / len * speed_cap, dy / len * speed_cap, 0.0)
    } else {
        Vec3::ZERO
    };
}

fn apply_ai_command(world: &mut World, entity: EntityId, command: AiCommand, now: u64) {
    match command {
        AiCommand::MoveTo(point) | AiCommand::Patrol(point) => {
            steer_toward(world, entity, point, NPC_MOVE_SPEED)
        }
        AiCommand::FleeTo(point) => steer_toward(world, entity, point, NPC_MOVE_SPEED * 1.5),
        AiCommand::AttackTarget(target) => {
            if let Ok(ai) = world.get_mut::<Ai>(entity) {
                ai.state = AiState::Combat;
            }
            record_threat(world, target, entity, ThreatKind::Damage, 1.0, 1.0, now);
        }
        AiCommand::UseSkill(skill_id, target) => {
            let _ = try_start_cast(world, entity, skill_id, CastAim::Target(target), now);
        }
        AiCommand::None => {}
    }
}

fn ai_decision_system(world: &mut World, ctx: &SimContext) {
    let now = ctx.now();
    let ids: Vec<EntityId> = world.iter::<Ai>().map(|(id, _)| id).collect();
    let routes = ctx.patrol_routes.lock().unwrap();
    let trees = ctx.tree_registry.lock().unwrap();

    for id in ids {
        let Ok(ai) = world.get::<Ai>(id) else { continue };
        if !should_run_decision(ai, now) || ai.state == AiState::Dead {
            continue;
        }
        let Some(tree) = trees.get(ai.tree) else { continue };
        let empty_route: Vec<Vec3> = Vec::new();
        let patrol_points = routes.get(&id).unwrap_or(&empty_route);

        let command = {
            let ai = world.get_mut::<Ai>(id).unwrap();
            let mut dctx = DecisionContext {
                self_id: id,
                perception: &ai.perception,
                memory: &mut ai.memory,
                spawn_position: ai.spawn_position,
                patrol_points,
            };
            let (_, command) = tick_node(tree, &mut dctx);
            command
        };
        if let Ok(ai) = world.get_mut::<Ai>(id) {
            ai.last_decision_tick = now;
        }
        apply_ai_command(world, id, command, now);
    }
}

pub fn build_tick_loop(world: World, config: TickConfig, ctx: Arc<SimContext>) -> TickLoop {
    let mut tick_loop = TickLoop::new(world, config);

    {
        let ctx = ctx.clone();
        tick_loop.add_system("ai_perception", TickStage::PreUpdate, 0, Box::new(move |world, _dt| {
            let now = ctx.now();
            let zones = ctx.zones.lock().unwrap();
            let Ok(grid) = zones.grid(PRIMARY_ZONE) else { return };
            let ids: Vec<EntityId> = world.iter::<Ai>().map(|(id, _)| id).collect();
            for id in ids {
                let due = world.get::<Ai>(id).map(|ai| should_refresh_perception(ai, now)).unwrap_or(false);
                if !due {
                    continue;
                }
                let snapshot = build_perception(world, grid, id, now);
                if let Ok(ai) = world.get_mut::<Ai>(id) {
                    ai.perception = snapshot;
                    ai.last_perception_tick = now;
                }
            }
        }));
    }

    {
        tick_loop.add_system_after("leash_update", TickStage::PreUpdate, 10, &["ai_perception"], Box::new(move |world, _dt| {
            let ids: Vec<EntityId> = world.iter::<Ai>().map(|(id, _)| id).collect();
            for id in ids {
                update_leash_state(world, id);
            }
        }));
    }

    {
        let ctx = ctx.clone();
        tick_loop.add_system_after("ai_decision", TickStage::PreUpdate, 20, &["leash_update"], Box::new(move |world, _dt| {
            ai_decision_system(world, &ctx);
        }));
    }

    {
        let ctx = ctx.clone();
        tick_loop.add_system("finish_casts", TickStage::Update, 0, Box::new(move |world, _dt| {
            let now = ctx.now();
            let mut rng = ctx.rng.lock().unwrap();
            let zones = ctx.zones.lock().unwrap();
            let terrain = zones.terrain(PRIMARY_ZONE).ok();
            finish_casts_system(world, now, &mut *rng, terrain);
        }));
    }

    {
        let ctx = ctx.clone();
        tick_loop.add_system_after("projectiles", TickStage::Update, 10, &["finish_casts"], Box::new(move |world, dt| {
            let now = ctx.now();
            let zones = ctx.zones.lock().unwrap();
            let Ok(grid) = zones.grid(PRIMARY_ZONE) else { return };
            let mut rng = ctx.rng.lock().unwrap();
            let _hits = tick_projectiles(world, grid, dt, now, &mut *rng);
        }));
    }

    {
        let ctx = ctx.clone();
        tick_loop.add_system("periodic_effects", TickStage::Update, 20, Box::new(move |world, _dt| {
            let now = ctx.now();
            let mut rng = ctx.rng.lock().unwrap();
            let dot_targets: Vec<EntityId> = world.iter::<DamageOverTime>().map(|(id, _)| id).collect();
            for id in dot_targets {
                tick_dots(world, id, now, &mut *rng);
            }
            let hot_targets: Vec<EntityId> = world.iter::<HealingOverTime>().map(|(id, _)| id).collect();
            for id in hot_targets {
                tick_hots(world, id, now, &mut *rng);
            }
        }));
    }

    {
        let ctx = ctx.clone();
        tick_loop.add_system("threat_decay", TickStage::Update, 30, Box::new(move |world, _dt| {
            decay_idle_threat_system(world, ctx.now(), THREAT_IDLE_DECAY_TICKS);
        }));
    }

    {
        let ctx = ctx.clone();
        tick_loop.add_system("cc_expiry", TickStage::PostUpdate, 0, Box::new(move |world, _dt| {
            expire_cc_system(world, ctx.now(), CC_IMMUNITY_TICKS_DEFAULT);
        }));
    }

    {
        let ctx = ctx.clone();
        tick_loop.add_system("advance_tick_counter", TickStage::Late, 1000, Box::new(move |_world, _dt| {
            ctx.tick.fetch_add(1, Ordering::Relaxed);
        }));
    }

    tick_loop
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmo_spatial::prelude::{GridConfig, TerrainMap};

    fn registry_with_primary_zone() -> ZoneRegistry {
        let mut zones = ZoneRegistry::new();
        zones.register_zone(PRIMARY_ZONE, GridConfig::default(), TerrainMap::new(256, 256, 1.0));
        zones
    }

    #[test]
    fn idle_npc_with_no_enemies_patrols_via_the_registered_tree() {
        let ctx = Arc::new(SimContext::new(registry_with_primary_zone(), 7));
        {
            let mut trees = ctx.tree_registry.lock().unwrap();
            trees.register(
                BehaviorTreeId(1),
                Node::Selector(vec![
                    Node::Decorator(Predicate::HasEnemy, Box::new(Node::Action(ActionKind::AttackTarget))),
                    Node::Action(ActionKind::Patrol),
                ]),
            );
        }
        let mut tick_loop = build_tick_loop(World::new(), TickConfig::default(), ctx.clone());
        let npc = tick_loop.world_mut().create();
        tick_loop.world_mut().add(npc, Transform { position: Vec3::ZERO, facing: 0.0, zone_id: 0 }).unwrap();
        tick_loop.world_mut().add(npc, Movement { velocity: Vec3::ZERO, speed_cap: 5.0, flags: MovementFlags::empty() }).unwrap();
        tick_loop.world_mut().add(npc, Ai::new(BehaviorTreeId(1), Vec3::ZERO, 30.0, 60.0)).unwrap();
        {
            let mut zones = ctx.zones.lock().unwrap();
            zones.grid_mut(PRIMARY_ZONE).unwrap().insert(npc, Vec3::ZERO);
        }

        for _ in 0..6 {
            tick_loop.tick();
        }

        let ai = tick_loop.world().get::<Ai>(npc).unwrap();
        assert_eq!(ai.state, AiState::Idle);
    }

    #[test]
    fn steer_toward_points_velocity_at_the_target() {
        let mut world = World::new();
        let id = world.create();
        world.add(id, Transform { position: Vec3::ZERO, facing: 0.0, zone_id: 0 }).unwrap();
        world.add(id, Movement { velocity: Vec3::ZERO, speed_cap: 5.0, flags: MovementFlags::empty() }).unwrap();
        steer_toward(&mut world, id, Vec3::new(10.0, 0.0, 0.0), 5.0);
        let movement = world.get::<Movement>(id).unwrap();
        assert!(movement.velocity.x > 0.0);
        assert!(movement.velocity.y.abs() < 0.001);
    }
}
