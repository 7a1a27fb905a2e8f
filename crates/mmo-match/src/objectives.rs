//! Objective capture: progress advances toward 1.0 while the strongest
//! attacking team outnumbers the defending (owning) team's presence in
//! radius, flips ownership once progress reaches 1.0.

#[derive(Clone, Debug)]
pub struct Objective {
    pub id: u32,
    pub owner_team: Option<usize>,
    pub progress: f32,
    pub capture_rate_per_sec: f32,
}

impl Objective {
    pub fn new(id: u32, capture_rate_per_sec: f32) -> Self {
        Self { id, owner_team: None, progress: 0.0, capture_rate_per_sec }
    }
}

/// `counts_by_team[i]` is the number of team `i` members currently within
/// the objective's capture radius. Returns the newly-flipped owner, if any.
pub fn tick_objective(obj: &mut Objective, counts_by_team: &[u32], dt: f64) -> Option<usize> {
    let strongest_attacker = counts_by_team
        .iter()
        .enumerate()
        .filter(|(team, _)| Some(*team) != obj.owner_team)
        .max_by_key(|(_, &count)| count);

    let Some((attacking_team, &attacker_count)) = strongest_attacker else {
        return None;
    };

    // Unowned objectives are contested by whichever other team is present;
    // an owned one is defended solely by the owner's own headcount.
    let defender_count = match obj.owner_team {
        Some(owner) => counts_by_team.get(owner).copied().unwrap_or(0),
        None => counts_by_team
            .iter()
            .enumerate()
            .filter(|(team, _)| *team != attacking_team)
            .map(|(_, &count)| count)
            .sum(),
    };

    if attacker_count == 0 || attacker_count <= defender_count {
        return None;
    }

    obj.progress = (obj.progress + obj.capture_rate_per_sec * dt as f32).min(1.0);
    if obj.progress >= 1.0 {
        obj.owner_team = Some(attacking_team);
        obj.progress = 0.0;
        return Some(attacking_team);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_progresses_only_while_outnumbered() {
        let mut obj = Objective::new(1, 0.5);
        assert!(tick_objective(&mut obj, &[3, 1], 1.0).is_none());
        assert!(obj.progress > 0.0);
        let progress_after_first_tick = obj.progress;
        assert!(tick_objective(&mut obj, &[1, 1], 1.0).is_none());
        assert_eq!(obj.progress, progress_after_first_tick);
    }

    #[test]
    fn capture_flips_owner_at_full_progress() {
        let mut obj = Objective::new(1, 1.0);
        obj.owner_team = Some(1);
        let flipped = tick_objective(&mut obj, &[5, 0], 1.0);
        assert_eq!(flipped, Some(0));
        assert_eq!(obj.owner_team, Some(0));
        assert_eq!(obj.progress, 0.0);
    }

    #[test]
    fn defenders_outnumbering_attackers_holds_progress() {
        let mut obj = Objective::new(1, 1.0);
        obj.owner_team = Some(0);
        obj.progress = 0.4;
        tick_objective(&mut obj, &[5, 1], 1.0);
        assert_eq!(obj.progress, 0.4);
    }
}
