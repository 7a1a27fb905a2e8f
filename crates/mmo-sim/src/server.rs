//! `SimServer`: the process-facing handle around a `TickLoop` plus the
//! matchmaking, match-instance, and interest-management state that lives
//! alongside it but outside the `World` proper.

use crate::composition::{build_tick_loop, SimContext};
use crate::metrics::SimMetricsSnapshot;
use mmo_ecs::prelude::*;
use mmo_interest::prelude::*;
use mmo_match::prelude::*;
use mmo_net::prelude::*;
use mmo_spatial::prelude::ZoneRegistry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// One active matchmaking queue per match type, and every match instance
/// currently running, independent of queue state once formed.
#[derive(Default)]
struct MatchState {
    queues: HashMap<MatchTypeId, MatchmakingQueue>,
    instances: HashMap<u64, MatchInstance>,
    next_match_id: u64,
    /// ELO rating is a persistent player stat, not a live sim component;
    /// the composition root keeps a lightweight cache so inbound queue
    /// requests don't need to carry it from the client.
    ratings: HashMap<EntityId, f32>,
}

const DEFAULT_RATING: f32 = 1500.0;

pub struct SimServer {
    tick_loop: TickLoop,
    ctx: Arc<SimContext>,
    config: SimConfig,
    interest: InterestManager,
    matches: MatchState,
    outbound: Vec<(EntityId, ObserverUpdate)>,
    last_tick_duration: Duration,
}

impl SimServer {
    pub fn new(config: SimConfig, zones: ZoneRegistry, rng_seed: u64) -> Self {
        let tick_config = TickConfig {
            fixed_dt: 1.0 / config.tick_hz as f64,
            max_catch_up_ticks: 3,
        };
        let ctx = Arc::new(SimContext::new(zones, rng_seed));
        let tick_loop = build_tick_loop(World::new(), tick_config, ctx.clone());
        Self {
            tick_loop,
            ctx,
            config,
            interest: InterestManager::new(150.0),
            matches: MatchState::default(),
            outbound: Vec::new(),
            last_tick_duration: Duration::default(),
        }
    }

    pub fn world(&self) -> &World {
        self.tick_loop.world()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.tick_loop.world_mut()
    }

    pub fn register_match_type(&mut self, type_config: MatchTypeConfig) {
        self.matches.queues.insert(type_config.id, MatchmakingQueue::new(type_config, self.config.tick_hz));
    }

    pub fn enqueue_for_match(&mut self, match_type: MatchTypeId, player: EntityId, rating: f32, group: Vec<EntityId>) {
        let now = self.ctx.now();
        if let Some(queue) = self.matches.queues.get_mut(&match_type) {
            queue.enqueue(player, rating, now, group);
        }
    }

    /// Runs one fixed-step tick: the `TickLoop` stages, then the
    /// out-of-`World` systems (queue scans, match advances, interest
    /// refresh) that operate on composition-root state instead of
    /// components.
    pub fn tick(&mut self) {
        self.tick_loop.tick();
        let now = self.ctx.now();

        for queue in self.matches.queues.values_mut() {
            queue.drop_timed_out(now);
            for formed in queue.scan(now) {
                self.start_match(formed);
            }
        }

        let mut ended = Vec::new();
        for (&id, instance) in self.matches.instances.iter_mut() {
            if let Some(_winning_team) = instance.advance(now) {
                if instance.phase == MatchPhase::Completed {
                    ended.push(id);
                }
            }
        }
        for id in ended {
            self.matches.instances.remove(&id);
        }

        self.refresh_interest();
        self.last_tick_duration = self.tick_loop.last_diagnostics().total_time;
    }

    fn start_match(&mut self, formed: FormedMatch) {
        let match_id = self.matches.next_match_id;
        self.matches.next_match_id += 1;
        let victory = VictoryCondition { score_limit: Some(10), kill_limit: None, max_duration_ticks: 20 * 60 * self.config.tick_hz as u64 };
        let instance = MatchInstance::new(match_id, formed.match_type, 0, formed.teams, victory, self.ctx.now());
        self.matches.instances.insert(match_id, instance);
    }

    fn refresh_interest(&mut self) {
        let zones = self.ctx.zones.lock().unwrap();
        let Ok(grid) = zones.grid(0) else { return };
        let observers: Vec<EntityId> = self.tick_loop.world().iter::<Transform>().map(|(id, _)| id).collect();
        for observer in observers {
            let delta = self.interest.refresh(grid, observer);
            if delta.is_empty() {
                continue;
            }
            let still_visible: Vec<EntityId> = self
                .interest
                .current_set(observer)
                .map(|set| set.iter().copied().collect())
                .unwrap_or_default();
            let updates = build_updates(self.tick_loop.world(), &delta, &still_visible);
            for update in updates {
                self.outbound.push((observer, update));
            }
        }
    }

    pub fn drain_outbound(&mut self) -> Vec<(EntityId, ObserverUpdate)> {
        std::mem::take(&mut self.outbound)
    }

    pub fn handle_inbound(&mut self, envelope: InboundEnvelope) -> Result<(), CommandError> {
        let Some(entity) = envelope.entity else {
            return Err(CommandError::NotAuthenticated);
        };
        let now = self.ctx.now();
        let world = self.tick_loop.world_mut();
        match envelope.command {
            InboundCommand::Move { direction, .. } => {
                if let Ok(movement) = world.get_mut::<Movement>(entity) {
                    let cap = movement.speed_cap;
                    movement.velocity = Vec3::new(direction.x * cap, direction.y * cap, 0.0);
                }
                Ok(())
            }
            InboundCommand::SetTarget { target } => {
                if let Ok(t) = world.get_mut::<Target>(entity) {
                    t.set_target(target, TargetType::Hostile);
                } else {
                    let mut t = Target::new();
                    t.set_target(target, TargetType::Hostile);
                    world.add(entity, t).map_err(CommandError::Ecs)?;
                }
                Ok(())
            }
            InboundCommand::ClearTarget => {
                if let Ok(t) = world.get_mut::<Target>(entity) {
                    t.clear_target();
                }
                Ok(())
            }
            InboundCommand::UseSkill { skill_id, aim } => {
                mmo_combat::prelude::try_start_cast(world, entity, skill_id, aim, now)
                    .map(|_| ())
                    .map_err(CommandError::Combat)
            }
            InboundCommand::QueueForMatch { match_type } => {
                let rating = *self.matches.ratings.entry(entity).or_insert(DEFAULT_RATING);
                self.enqueue_for_match(MatchTypeId(match_type), entity, rating, vec![entity]);
                Ok(())
            }
            InboundCommand::LeaveQueue => {
                for queue in self.matches.queues.values_mut() {
                    queue.leave(entity);
                }
                Ok(())
            }
            _ => Err(CommandError::Malformed { reason: "command not wired at this composition root" }),
        }
    }

    pub fn metrics_snapshot(&self) -> SimMetricsSnapshot {
        SimMetricsSnapshot {
            tick_count: self.tick_loop.tick_count(),
            last_tick_duration: self.last_tick_duration,
            entity_count: self.tick_loop.world().alive_count(),
            combat_event_count: 0,
            match_count: self.matches.instances.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmo_spatial::prelude::{GridConfig, TerrainMap};

    fn single_zone_registry() -> ZoneRegistry {
        let mut zones = ZoneRegistry::new();
        zones.register_zone(0, GridConfig::default(), TerrainMap::new(256, 256, 1.0));
        zones
    }

    fn test_server() -> SimServer {
        SimServer::new(SimConfig::default(), single_zone_registry(), 42)
    }

    #[test]
    fn tick_advances_tick_count_and_reports_entity_count() {
        let mut server = test_server();
        let entity = server.world_mut().create();
        server.world_mut().add(entity, Transform { position: Vec3::ZERO, facing: 0.0, zone_id: 0 }).unwrap();
        server.tick();
        server.tick();
        assert_eq!(server.metrics_snapshot().tick_count, 2);
        assert_eq!(server.metrics_snapshot().entity_count, 1);
    }

    #[test]
    fn queueing_two_players_forms_a_match() {
        let mut server = test_server();
        let type_id = MatchTypeId(1);
        server.register_match_type(MatchTypeConfig { id: type_id, team_count: 2, team_size: 1 });
        let a = server.world_mut().create();
        let b = server.world_mut().create();
        server.enqueue_for_match(type_id, a, 1500.0, vec![a]);
        server.enqueue_for_match(type_id, b, 1500.0, vec![b]);
        server.tick();
        assert_eq!(server.metrics_snapshot().match_count, 1);
    }

    #[test]
    fn unauthenticated_envelope_is_rejected() {
        let mut server = test_server();
        let envelope = InboundEnvelope { session_id: 1, entity: None, command: InboundCommand::ClearTarget, received_tick: 0 };
        assert!(matches!(server.handle_inbound(envelope), Err(CommandError::NotAuthenticated)));
    }

    #[test]
    fn interest_refresh_spawns_nearby_entities_into_each_others_feed() {
        let mut server = test_server();
        let observer = server.world_mut().create();
        let other = server.world_mut().create();
        server.world_mut().add(observer, Transform { position: Vec3::ZERO, facing: 0.0, zone_id: 0 }).unwrap();
        server.world_mut().add(other, Transform { position: Vec3::new(5.0, 0.0, 0.0), facing: 0.0, zone_id: 0 }).unwrap();
        {
            let mut zones = server.ctx.zones.lock().unwrap();
            let grid = zones.grid_mut(0).unwrap();
            grid.insert(observer, Vec3::ZERO);
            grid.insert(other, Vec3::new(5.0, 0.0, 0.0));
        }
        server.tick();
        let updates = server.drain_outbound();
        assert!(updates.iter().any(|(obs, update)| *obs == observer && matches!(update, ObserverUpdate::Spawn { entity, .. } if *entity == other)));
    }
}
