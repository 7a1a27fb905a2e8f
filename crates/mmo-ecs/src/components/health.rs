use crate::storage::Component;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Health {
    pub current_hp: i32,
    pub max_hp: i32,
    pub current_mp: i32,
    pub max_mp: i32,
    pub dead: bool,
    pub last_damage_tick: u64,
}

impl Health {
    pub fn new(max_hp: i32, max_mp: i32) -> Self {
        Self {
            current_hp: max_hp,
            max_hp,
            current_mp: max_mp,
            max_mp,
            dead: false,
            last_damage_tick: 0,
        }
    }

    /// Applies residual damage (post-mitigation, post-absorb) and keeps the
    /// `dead` flag coherent with `current_hp == 0`.
    pub fn apply_damage(&mut self, amount: i32, tick: u64) {
        if amount <= 0 {
            return;
        }
        self.current_hp = (self.current_hp - amount).max(0);
        self.last_damage_tick = tick;
        self.dead = self.current_hp == 0;
    }

    /// Applies healing, clamped to `max_hp`. Returns the effective heal and
    /// the overheal (recorded, never applied).
    pub fn apply_heal(&mut self, amount: i32) -> (i32, i32) {
        if self.dead || amount <= 0 {
            return (0, amount.max(0));
        }
        let room = self.max_hp - self.current_hp;
        let effective = amount.min(room);
        self.current_hp += effective;
        (effective, amount - effective)
    }
}

impl Component for Health {
    const NAME: &'static str = "Health";
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct CombatStats {
    pub level: u32,
    pub atk_power: f32,
    pub spell_power: f32,
    pub armor: f32,
    pub magic_resist: f32,
    pub crit_chance: f32,
    pub crit_mult: f32,
    pub dmg_inc: f32,
    pub dmg_red: f32,
    pub attack_speed: f32,
}

impl Component for CombatStats {
    const NAME: &'static str = "CombatStats";
}
