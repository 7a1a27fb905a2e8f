pub mod ai;
pub mod crowd_control;
pub mod dot_hot;
pub mod health;
pub mod projectile;
pub mod skills;
pub mod target;
pub mod threat;
pub mod transform;

pub use ai::{Ai, AiMemory, AiState, BehaviorTreeId, PerceptionSnapshot};
pub use crowd_control::{BreakPolicy, CcEffect, CcEffectId, CcType, CrowdControl, DrState, DR_MULTIPLIERS};
pub use dot_hot::{
    Absorb, DamageOverTime, DotInstance, HealingOverTime, HotInstance, PeriodicInstanceId, Shield,
    SpreadPolicy, StackingMode, PANDEMIC_EXTENSION_RATIO,
};
pub use health::{CombatStats, Health};
pub use projectile::{MatchMembership, Projectile};
pub use skills::{CastAim, CastState, DamageSchool, SkillDef, SkillDelivery, SkillId, SkillRuntime, Skills};
pub use target::{Target, TargetType};
pub use threat::{coefficient_for, Threat, ThreatEntry, ThreatKind};
pub use transform::{Dodge, Movement, MovementFlags, Transform, Vec3};
