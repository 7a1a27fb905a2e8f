use crate::entity::EntityId;
use crate::storage::Component;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreatKind {
    Damage,
    Healing,
    Buff,
    Debuff,
    Taunt,
    Detaunt,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ThreatEntry {
    pub value: f32,
    pub mult: f32,
    pub temp_mult: f32,
    pub taunt_until: u64,
    pub fade_until: u64,
    pub fade_amount: f32,
    pub last_update: u64,
}

impl ThreatEntry {
    fn new(now: u64) -> Self {
        Self {
            value: 0.0,
            mult: 1.0,
            temp_mult: 1.0,
            taunt_until: 0,
            fade_until: 0,
            fade_amount: 0.0,
            last_update: now,
        }
    }

    pub fn effective(&self, now: u64) -> f32 {
        if self.taunt_until > now {
            return f32::INFINITY;
        }
        let base = self.value * self.mult * self.temp_mult;
        let fade = if self.fade_until > now { self.fade_amount } else { 0.0 };
        (base - fade).max(0.0)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Threat {
    pub table: HashMap<EntityId, ThreatEntry>,
}

/// Threat-generation coefficient per update kind, applied to the raw amount
/// (damage dealt, effective heal, etc.) before it is added to `value`.
pub fn coefficient_for(kind: ThreatKind) -> f32 {
    match kind {
        ThreatKind::Damage => 1.0,
        ThreatKind::Healing => 0.5,
        ThreatKind::Buff => 0.3,
        ThreatKind::Debuff => 1.0,
        ThreatKind::Taunt | ThreatKind::Detaunt => 0.0,
    }
}

impl Threat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, attacker: EntityId, kind: ThreatKind, amount: f32, class_mult: f32, now: u64) {
        let entry = self.table.entry(attacker).or_insert_with(|| ThreatEntry::new(now));
        match kind {
            ThreatKind::Taunt => {
                let highest = self
                    .table
                    .values()
                    .map(|e| e.effective(now))
                    .filter(|v| v.is_finite())
                    .fold(0.0f32, f32::max);
                let entry = self.table.entry(attacker).or_insert_with(|| ThreatEntry::new(now));
                entry.value = highest * 1.1;
                entry.taunt_until = now + 1;
                entry.last_update = now;
            }
            ThreatKind::Detaunt => {
                entry.value = (entry.value - amount).max(0.0);
                entry.last_update = now;
            }
            _ => {
                entry.value += amount * coefficient_for(kind) * class_mult;
                entry.last_update = now;
            }
        }
    }

    pub fn extend_taunt(&mut self, attacker: EntityId, until_tick: u64, now: u64) {
        let entry = self.table.entry(attacker).or_insert_with(|| ThreatEntry::new(now));
        entry.taunt_until = until_tick;
    }

    /// Highest-effective-value attacker, ties broken by most recent update.
    pub fn current_target(&self, now: u64) -> Option<EntityId> {
        self.table
            .iter()
            .max_by(|(_, a), (_, b)| {
                let ea = a.effective(now);
                let eb = b.effective(now);
                ea.partial_cmp(&eb)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.last_update.cmp(&b.last_update))
            })
            .map(|(id, _)| *id)
    }

    /// Removes entries with no update for `idle_ticks`; frees the table if
    /// it ends up empty.
    pub fn decay_idle(&mut self, now: u64, idle_ticks: u64) {
        self.table.retain(|_, e| now.saturating_sub(e.last_update) < idle_ticks);
    }
}

impl Component for Threat {
    const NAME: &'static str = "Threat";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eid(i: u32) -> EntityId {
        EntityId::new(i, 0)
    }

    #[test]
    fn damage_threat_accumulates_and_picks_argmax() {
        let mut threat = Threat::new();
        threat.update(eid(1), ThreatKind::Damage, 100.0, 1.0, 0);
        threat.update(eid(2), ThreatKind::Damage, 150.0, 1.0, 1);
        assert_eq!(threat.current_target(1), Some(eid(2)));
    }

    #[test]
    fn healing_generates_half_threat() {
        let mut threat = Threat::new();
        threat.update(eid(1), ThreatKind::Healing, 100.0, 1.0, 0);
        assert_eq!(threat.table[&eid(1)].value, 50.0);
    }

    #[test]
    fn taunt_overrides_with_effectively_infinite_value() {
        let mut threat = Threat::new();
        threat.update(eid(1), ThreatKind::Damage, 1000.0, 1.0, 0);
        threat.update(eid(2), ThreatKind::Taunt, 0.0, 1.0, 1);
        assert_eq!(threat.current_target(1), Some(eid(2)));
    }

    #[test]
    fn idle_entries_decay() {
        let mut threat = Threat::new();
        threat.update(eid(1), ThreatKind::Damage, 10.0, 1.0, 0);
        threat.decay_idle(200, 100);
        assert!(threat.table.is_empty());
    }
}
