//! Hit validation and score theft.

use std::collections::HashMap;

use log::debug;
use shared::KILL_BONUS;

use crate::room::PlayerState;

/// Result of a confirmed kill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitOutcome {
    pub stolen: u32,
    pub shooter_score: u32,
    pub target_score: u32,
}

/// Applies a hit report against the player table. A confirmed hit transfers
/// half the target's score (rounded down) plus a flat bonus to the shooter,
/// marks the target dead, and stamps its respawn deadline. Reports that fail
/// a guard (self-hit, unknown party, target already dead) change nothing and
/// return `None`.
pub fn resolve_hit(
    players: &mut HashMap<u32, PlayerState>,
    shooter_id: u32,
    target_id: u32,
    respawn_deadline: u64,
) -> Option<HitOutcome> {
    if shooter_id == target_id {
        debug!("Ignoring self-hit report from player {}", shooter_id);
        return None;
    }

    let stolen = match (players.get(&shooter_id), players.get(&target_id)) {
        (Some(_), Some(target)) if target.alive => target.score / 2,
        (Some(_), Some(_)) => {
            debug!("Ignoring hit on already-dead player {}", target_id);
            return None;
        }
        _ => {
            debug!(
                "Ignoring hit with unknown participant ({} -> {})",
                shooter_id, target_id
            );
            return None;
        }
    };

    let mut shooter_score = 0;
    if let Some(shooter) = players.get_mut(&shooter_id) {
        shooter.score += KILL_BONUS + stolen;
        shooter_score = shooter.score;
    }

    let mut target_score = 0;
    if let Some(target) = players.get_mut(&target_id) {
        target.score = target.score.saturating_sub(stolen);
        target.alive = false;
        target.respawn_at = Some(respawn_deadline);
        target_score = target.score;
    }

    Some(HitOutcome {
        stolen,
        shooter_score,
        target_score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn players_with_scores(scores: &[(u32, u32)]) -> HashMap<u32, PlayerState> {
        let mut players = HashMap::new();
        for (id, score) in scores {
            let mut player = PlayerState::new(*id, format!("Player{}", id), 0xffffff);
            player.score = *score;
            players.insert(*id, player);
        }
        players
    }

    #[test]
    fn test_hit_transfers_half_plus_bonus() {
        let mut players = players_with_scores(&[(1, 0), (2, 100)]);

        let outcome = resolve_hit(&mut players, 1, 2, 5000).unwrap();

        assert_eq!(outcome.stolen, 50);
        assert_eq!(outcome.shooter_score, 70);
        assert_eq!(outcome.target_score, 50);
        assert_eq!(players[&1].score, 70);
        assert_eq!(players[&2].score, 50);
    }

    #[test]
    fn test_odd_score_steals_rounded_down_half() {
        let mut players = players_with_scores(&[(1, 0), (2, 1)]);

        let outcome = resolve_hit(&mut players, 1, 2, 5000).unwrap();

        assert_eq!(outcome.stolen, 0);
        assert_eq!(outcome.shooter_score, KILL_BONUS);
        assert_eq!(outcome.target_score, 1);
    }

    #[test]
    fn test_zero_score_target_still_yields_bonus() {
        let mut players = players_with_scores(&[(1, 10), (2, 0)]);

        let outcome = resolve_hit(&mut players, 1, 2, 5000).unwrap();

        assert_eq!(outcome.stolen, 0);
        assert_eq!(outcome.shooter_score, 10 + KILL_BONUS);
        assert_eq!(outcome.target_score, 0);
    }

    #[test]
    fn test_hit_marks_target_dead_with_deadline() {
        let mut players = players_with_scores(&[(1, 0), (2, 40)]);

        resolve_hit(&mut players, 1, 2, 7500).unwrap();

        let target = &players[&2];
        assert!(!target.alive);
        assert_eq!(target.respawn_at, Some(7500));
        assert!(players[&1].alive);
    }

    #[test]
    fn test_self_hit_is_rejected() {
        let mut players = players_with_scores(&[(1, 100)]);

        assert!(resolve_hit(&mut players, 1, 1, 5000).is_none());
        assert_eq!(players[&1].score, 100);
        assert!(players[&1].alive);
    }

    #[test]
    fn test_hit_on_dead_target_is_rejected() {
        let mut players = players_with_scores(&[(1, 0), (2, 100), (3, 0)]);
        resolve_hit(&mut players, 1, 2, 5000).unwrap();

        assert!(resolve_hit(&mut players, 3, 2, 6000).is_none());
        assert_eq!(players[&3].score, 0);
        assert_eq!(players[&2].score, 50);
    }

    #[test]
    fn test_unknown_shooter_or_target_is_rejected() {
        let mut players = players_with_scores(&[(1, 50)]);

        assert!(resolve_hit(&mut players, 9, 1, 5000).is_none());
        assert!(resolve_hit(&mut players, 1, 9, 5000).is_none());
        assert_eq!(players[&1].score, 50);
    }

    #[test]
    fn test_dead_shooter_can_still_land_hits() {
        let mut players = players_with_scores(&[(1, 0), (2, 60)]);
        resolve_hit(&mut players, 2, 1, 5000).unwrap();
        assert!(!players[&1].alive);

        // Projectiles fired before death keep flying on the clients.
        let outcome = resolve_hit(&mut players, 1, 2, 6000).unwrap();
        assert_eq!(outcome.stolen, (60 + KILL_BONUS) / 2);
        assert!(!players[&2].alive);
    }

    #[test]
    fn test_consecutive_kills_accumulate() {
        let mut players = players_with_scores(&[(1, 0), (2, 100), (3, 8)]);

        resolve_hit(&mut players, 1, 2, 5000).unwrap();
        let outcome = resolve_hit(&mut players, 1, 3, 5000).unwrap();

        assert_eq!(outcome.stolen, 4);
        assert_eq!(players[&1].score, 70 + KILL_BONUS + 4);
    }
}
