//! Combat resolution: damage/heal pipelines, crowd control, periodic
//! effects, casting, projectiles, and threat — all operating on an
//! `mmo_ecs::World` passed in by the caller.

pub mod apply;
pub mod cast;
pub mod crowd_control;
pub mod damage;
pub mod error;
pub mod events;
pub mod periodic;
pub mod projectile_system;
pub mod threat_system;

pub mod prelude {
    pub use crate::apply::{apply_damage_to, apply_heal_to, combat_stats_or_default, AppliedDamage};
    pub use crate::cast::{finish_casts_system, resolve_action_skill, resolve_skill, try_start_cast, GCD_TICKS};
    pub use crate::crowd_control::{apply_cc, expire_cc_system, on_cc_removed, CcApplyRequest, CC_IMMUNITY_TICKS_DEFAULT};
    pub use crate::damage::{resolve_damage, resolve_heal, DamageInput, DamageOutput, HealInput, HealOutput};
    pub use crate::error::CombatError;
    pub use crate::events::CombatEvent;
    pub use crate::periodic::{apply_dot, apply_hot, resolve_dot_stacking, tick_dots, tick_hots};
    pub use crate::projectile_system::{tick_projectiles, ProjectileHit};
    pub use crate::threat_system::{current_aggro_target, decay_idle_threat_system, generate_heal_threat, record_threat, taunt};
}
