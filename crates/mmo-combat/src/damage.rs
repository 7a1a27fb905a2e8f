//! Damage and healing pipelines shared by targeted, action, and
//! periodic-tick (DoT/HoT) resolution.

use mmo_ecs::prelude::CombatStats;
use rand::Rng;

/// Design constant: scales damage by `1 + Δlevel * k`, clamped to
/// `[0.5, 1.5]`.
pub const LEVEL_DELTA_K: f32 = 0.05;
pub const MAX_MITIGATION: f32 = 0.75;

#[derive(Clone, Copy, Debug)]
pub struct DamageInput {
    pub base: f32,
    pub physical: bool,
    pub armor_reduction_factor: f32,
    /// Pre-rolled crit outcome when the caller wants determinism (tests,
    /// replay); `None` rolls against `attacker.crit_chance` using `rng`.
    pub forced_crit: Option<bool>,
}

#[derive(Clone, Copy, Debug)]
pub struct DamageOutput {
    pub amount: f32,
    pub crit: bool,
}

/// Implements spec.md §4.4's six-step damage pipeline exactly, floored at 1.
pub fn resolve_damage(
    attacker: &CombatStats,
    defender: &CombatStats,
    input: DamageInput,
    rng: &mut impl Rng,
) -> DamageOutput {
    let power = if input.physical { attacker.atk_power } else { attacker.spell_power };
    let mut damage = input.base * (1.0 + power / 100.0);

    let mitigation_stat = if input.physical { defender.armor } else { defender.magic_resist };
    let reduction = (mitigation_stat * input.armor_reduction_factor).min(MAX_MITIGATION);
    damage *= 1.0 - reduction;

    let crit = input.forced_crit.unwrap_or_else(|| rng.gen::<f32>() < attacker.crit_chance);
    if crit {
        damage *= attacker.crit_mult;
    }

    let level_delta = attacker.level as i32 - defender.level as i32;
    let level_mult = (1.0 + level_delta as f32 * LEVEL_DELTA_K).clamp(0.5, 1.5);
    damage *= level_mult;

    damage *= 1.0 + attacker.dmg_inc;
    damage *= 1.0 - defender.dmg_red;

    DamageOutput {
        amount: damage.max(1.0),
        crit,
    }
}

#[derive(Clone, Copy, Debug)]
pub struct HealInput {
    pub base: f32,
    pub sp_coef: f32,
    pub ap_coef: f32,
    pub school_modifier: f32,
    pub forced_crit: Option<bool>,
}

#[derive(Clone, Copy, Debug)]
pub struct HealOutput {
    pub amount: f32,
    pub crit: bool,
}

pub fn resolve_heal(caster: &CombatStats, input: HealInput, rng: &mut impl Rng) -> HealOutput {
    let mut amount = (input.base + caster.spell_power * input.sp_coef + caster.atk_power * input.ap_coef)
        * input.school_modifier;
    let crit = input.forced_crit.unwrap_or_else(|| rng.gen::<f32>() < caster.crit_chance);
    if crit {
        amount *= caster.crit_mult;
    }
    HealOutput { amount, crit }
}

fn stats(level: u32, atk_power: f32, armor: f32) -> CombatStats {
    CombatStats {
        level,
        atk_power,
        spell_power: 0.0,
        armor,
        magic_resist: 0.0,
        crit_chance: 0.0,
        crit_mult: 2.0,
        dmg_inc: 0.0,
        dmg_red: 0.0,
        attack_speed: 1.0,
    }
}
