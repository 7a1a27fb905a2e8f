use crate::components::skills::{DamageSchool, SkillId};
use crate::components::transform::Vec3;
use crate::entity::EntityId;
use crate::storage::Component;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Projectile {
    pub owner: EntityId,
    pub velocity: Vec3,
    pub speed: f32,
    pub range: f32,
    pub traveled: f32,
    pub damage: f32,
    pub radius: f32,
    pub physical: bool,
    pub school: DamageSchool,
    pub piercing: bool,
    pub skill_id: SkillId,
    pub hit_set: HashSet<EntityId>,
}

impl Projectile {
    pub fn has_expired(&self) -> bool {
        self.traveled >= self.range
    }

    pub fn advance(&mut self, dt: f32, position: &mut Vec3) {
        position.x += self.velocity.x * dt;
        position.y += self.velocity.y * dt;
        position.z += self.velocity.z * dt;
        self.traveled += self.speed * dt;
    }
}

impl Component for Projectile {
    const NAME: &'static str = "Projectile";
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct MatchMembership {
    pub match_id: u64,
    pub team_id: u32,
}

impl Component for MatchMembership {
    const NAME: &'static str = "MatchMembership";
}
