//! Crowd-control application: immunity check, diminishing-returns scaling,
//! DR-counter bookkeeping, post-removal immunity grant.

use crate::error::CombatError;
use mmo_ecs::prelude::{CcEffect, CcEffectId, CcType, CrowdControl, World, EntityId, DR_MULTIPLIERS};

#[derive(Clone, Copy, Debug)]
pub struct CcApplyRequest {
    pub effect_id: CcEffectId,
    pub cc_type: CcType,
    pub source: EntityId,
    pub base_duration_ticks: u64,
    pub break_policy: mmo_ecs::prelude::BreakPolicy,
    pub damage_threshold: Option<i32>,
    pub slow_pct: f32,
    pub snare_pct: f32,
    pub hard: bool,
    pub cleanse_tier: u8,
}

/// Applies one CC effect honoring immunity and diminishing returns. Returns
/// the actually-applied (possibly DR-scaled) duration in ticks, or an error
/// if every component type in the request is currently immune.
pub fn apply_cc(
    world: &mut World,
    target: EntityId,
    request: CcApplyRequest,
    now: u64,
    dr_window_ticks: u64,
) -> Result<u64, CombatError> {
    let cc = world
        .get_mut::<CrowdControl>(target)
        .map_err(|_| CombatError::InvalidTarget { reason: "no CrowdControl component" })?;

    for bit in request.cc_type.iter_bits() {
        if cc.is_immune(bit, now) {
            return Err(CombatError::CcForbids);
        }
    }

    let mut min_mult = 1.0f32;
    for bit in request.cc_type.iter_bits() {
        let idx = cc.dr_index(bit, now, dr_window_ticks);
        min_mult = min_mult.min(DR_MULTIPLIERS[idx]);
    }
    if min_mult <= 0.0 {
        return Err(CombatError::CcForbids);
    }

    let duration = (request.base_duration_ticks as f32 * min_mult).round() as u64;
    cc.effects.insert(
        request.effect_id,
        CcEffect {
            cc_type: request.cc_type,
            source: request.source,
            start_tick: now,
            end_tick: now + duration,
            break_policy: request.break_policy,
            damage_threshold: request.damage_threshold,
            damage_taken: 0,
            slow_pct: request.slow_pct,
            snare_pct: request.snare_pct,
            hard: request.hard,
            cleanse_tier: request.cleanse_tier,
        },
    );
    for bit in request.cc_type.iter_bits() {
        cc.record_application(bit, now);
    }

    Ok(duration)
}

/// Design constant: immunity window granted after a hard-CC effect is
/// removed (expiry or break).
pub const CC_IMMUNITY_TICKS_DEFAULT: u64 = 40; // 2s at 20Hz

/// Call when an effect ends (naturally or via break) to grant the
/// post-removal immunity window for its hard CC types.
pub fn on_cc_removed(world: &mut World, target: EntityId, effect: &CcEffect, now: u64, immunity_ticks: u64) {
    if !effect.hard {
        return;
    }
    if let Ok(cc) = world.get_mut::<CrowdControl>(target) {
        for bit in effect.cc_type.iter_bits() {
            cc.grant_immunity(bit, now, immunity_ticks);
        }
    }
}

/// Sweeps every entity's `CrowdControl` for effects whose `end_tick` has
/// passed, removing them and granting post-removal immunity. Runs in
/// post-update per spec.md §4.1's stage ordering.
pub fn expire_cc_system(world: &mut World, now: u64, immunity_ticks: u64) {
    let expired: Vec<(EntityId, CcEffectId, CcEffect)> = world
        .iter::<CrowdControl>()
        .flat_map(|(id, cc)| {
            cc.effects
                .iter()
                .filter(|(_, e)| e.end_tick <= now)
                .map(move |(eid, e)| (id, *eid, *e))
                .collect::<Vec<_>>()
        })
        .collect();

    for (entity, effect_id, effect) in expired {
        if let Ok(cc) = world.get_mut::<CrowdControl>(entity) {
            cc.effects.remove(&effect_id);
        }
        on_cc_removed(world, entity, &effect, now, immunity_ticks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmo_ecs::prelude::BreakPolicy;

    fn source() -> EntityId {
        EntityId::new(9, 0)
    }

    fn request(cc_type: CcType, duration: u64) -> CcApplyRequest {
        CcApplyRequest {
            effect_id: 1,
            cc_type,
            source: source(),
            base_duration_ticks: duration,
            break_policy: BreakPolicy::TimerOnly,
            damage_threshold: None,
            slow_pct: 0.0,
            snare_pct: 0.0,
            hard: true,
            cleanse_tier: 0,
        }
    }

    #[test]
    fn scenario_s2_dr_sequence() {
        let mut world = World::new();
        let id = world.create();
        world.add(id, CrowdControl::new()).unwrap();

        let dr_window = 360u64; // 18s at 20Hz
        let d1 = apply_cc(&mut world, id, request(CcType::STUN, 60), 0, dr_window).unwrap();
        assert_eq!(d1, 60);

        world.get_mut::<CrowdControl>(id).unwrap().effects.clear();
        let d2 = apply_cc(&mut world, id, request(CcType::STUN, 60), 0, dr_window).unwrap();
        assert_eq!(d2, 30);

        world.get_mut::<CrowdControl>(id).unwrap().effects.clear();
        let d3 = apply_cc(&mut world, id, request(CcType::STUN, 60), 0, dr_window).unwrap();
        assert_eq!(d3, 15);

        world.get_mut::<CrowdControl>(id).unwrap().effects.clear();
        let d4 = apply_cc(&mut world, id, request(CcType::STUN, 60), 0, dr_window);
        assert!(d4.is_err());
    }

    #[test]
    fn dr_resets_after_window_elapses() {
        let mut world = World::new();
        let id = world.create();
        world.add(id, CrowdControl::new()).unwrap();
        let dr_window = 360u64;
        apply_cc(&mut world, id, request(CcType::STUN, 60), 0, dr_window).unwrap();
        world.get_mut::<CrowdControl>(id).unwrap().effects.clear();
        let after_window = apply_cc(&mut world, id, request(CcType::STUN, 60), 400, dr_window).unwrap();
        assert_eq!(after_window, 60);
    }

    #[test]
    fn immunity_blocks_reapplication() {
        let mut world = World::new();
        let id = world.create();
        world.add(id, CrowdControl::new()).unwrap();
        world.get_mut::<CrowdControl>(id).unwrap().grant_immunity(CcType::ROOT, 0, 40);
        let result = apply_cc(&mut world, id, request(CcType::ROOT, 60), 10, 360);
        assert!(result.is_err());
    }

    #[test]
    fn scenario_s3_root_breaks_on_third_hit_then_grants_immunity() {
        let mut world = World::new();
        let id = world.create();
        world.add(id, CrowdControl::new()).unwrap();
        let mut root = request(CcType::ROOT, 1000);
        root.break_policy = BreakPolicy::DamageThreshold;
        root.damage_threshold = Some(100);
        apply_cc(&mut world, id, root, 0, 360).unwrap();

        let cc = world.get_mut::<CrowdControl>(id).unwrap();
        assert!(cc.on_damage_taken(30, 1).is_empty());
        assert!(cc.on_damage_taken(40, 2).is_empty());
        let broken = cc.on_damage_taken(40, 3);
        assert_eq!(broken.len(), 1);
        let effect = CcEffect {
            cc_type: CcType::ROOT,
            source: source(),
            start_tick: 0,
            end_tick: 3,
            break_policy: BreakPolicy::DamageThreshold,
            damage_threshold: Some(100),
            damage_taken: 110,
            slow_pct: 0.0,
            snare_pct: 0.0,
            hard: true,
            cleanse_tier: 0,
        };
        on_cc_removed(&mut world, id, &effect, 3, 40);

        let reapply = apply_cc(&mut world, id, request(CcType::ROOT, 60), 3, 360);
        assert!(reapply.is_err());
    }

    #[test]
    fn expire_cc_system_grants_immunity_for_hard_cc() {
        let mut world = World::new();
        let id = world.create();
        world.add(id, CrowdControl::new()).unwrap();
        apply_cc(&mut world, id, request(CcType::STUN, 10), 0, 360).unwrap();
        expire_cc_system(&mut world, 10, 40);
        assert!(world.get::<CrowdControl>(id).unwrap().is_immune(CcType::STUN, 20));
    }
}
