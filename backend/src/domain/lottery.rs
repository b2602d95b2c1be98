//! Arisan lottery draw state machine.
//!
//! A round is complete once every participant has won. Selection is a pure
//! function of the candidate list and an injected RNG; persisting the
//! outcome is the caller's job.

use crate::errors::{DomainError, DomainResult};
use rand::Rng;
use shared::{LotteryParticipant, RoundState};

/// `InRound` while anyone has not won yet. An empty pool counts as exhausted.
pub fn round_state(participants: &[LotteryParticipant]) -> RoundState {
    if participants.iter().any(|p| !p.has_won) {
        RoundState::InRound
    } else {
        RoundState::RoundExhausted
    }
}

/// Pick one candidate index uniformly at random
pub fn select_winner<R: Rng>(candidates: &[usize], rng: &mut R) -> Option<usize> {
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.random_range(0..candidates.len())])
}

/// Outcome of a draw, not yet persisted
#[derive(Debug, Clone, PartialEq)]
pub struct DrawPlan {
    pub winner: LotteryParticipant,
    pub round_reset: bool,
    /// The full participant set after the draw, in table order
    pub participants: Vec<LotteryParticipant>,
}

pub fn plan_draw<R: Rng>(
    mut participants: Vec<LotteryParticipant>,
    rng: &mut R,
) -> DomainResult<DrawPlan> {
    if participants.is_empty() {
        return Err(DomainError::NoParticipants);
    }

    let mut round_reset = false;
    let mut candidates: Vec<usize> = participants
        .iter()
        .enumerate()
        .filter(|(_, p)| !p.has_won)
        .map(|(index, _)| index)
        .collect();

    if candidates.is_empty() {
        reset_round(&mut participants);
        candidates = (0..participants.len()).collect();
        round_reset = true;
    }

    let index = select_winner(&candidates, rng).ok_or(DomainError::NoParticipants)?;
    participants[index].has_won = true;

    Ok(DrawPlan {
        winner: participants[index].clone(),
        round_reset,
        participants,
    })
}

/// Clear every win flag; returns how many participants were reset
pub fn reset_round(participants: &mut [LotteryParticipant]) -> usize {
    for participant in participants.iter_mut() {
        participant.has_won = false;
    }
    participants.len()
}


#[cfg(test)]
mod tests {
    use super::test_participants::{participant, pool};
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    #[test]
    fn test_empty_pool_has_no_participants() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(matches!(
            plan_draw(Vec::new(), &mut rng),
            Err(DomainError::NoParticipants)
        ));
    }

    #[test]
    fn test_three_draws_visit_everyone_then_reset() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut participants = pool(&["A", "B", "C"]);
        let mut winners = HashSet::new();

        for _ in 0..3 {
            assert_eq!(round_state(&participants), RoundState::InRound);
            let plan = plan_draw(participants, &mut rng).unwrap();
            assert!(!plan.round_reset);
            assert!(winners.insert(plan.winner.resident_name.clone()));
            participants = plan.participants;
        }
        assert_eq!(winners.len(), 3);
        assert_eq!(round_state(&participants), RoundState::RoundExhausted);

        let plan = plan_draw(participants, &mut rng).unwrap();
        assert!(plan.round_reset);
        assert!(winners.contains(&plan.winner.resident_name));
        let still_won: Vec<_> = plan.participants.iter().filter(|p| p.has_won).collect();
        assert_eq!(still_won.len(), 1);
        assert_eq!(still_won[0].id, plan.winner.id);
    }

    #[test]
    fn test_only_candidates_can_win() {
        let participants = vec![
            participant("a", "A", true),
            participant("b", "B", false),
            participant("c", "C", true),
        ];
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let plan = plan_draw(participants.clone(), &mut rng).unwrap();
            assert_eq!(plan.winner.id, "b");
            assert_eq!(round_state(&plan.participants), RoundState::RoundExhausted);
        }
    }

    #[test]
    fn test_seeded_draws_are_reproducible() {
        let names = ["A", "B", "C", "D", "E"];
        let run = |seed: u64| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut participants = pool(&names);
            let mut order = Vec::new();
            for _ in 0..names.len() {
                let plan = plan_draw(participants, &mut rng).unwrap();
                order.push(plan.winner.resident_name);
                participants = plan.participants;
            }
            order
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn test_select_winner_on_empty_candidates() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(select_winner(&[], &mut rng), None);
        assert_eq!(select_winner(&[3], &mut rng), Some(3));
    }

    #[test]
    fn test_reset_round_and_empty_state() {
        let mut participants = vec![participant("a", "A", true), participant("b", "B", false)];
        assert_eq!(reset_round(&mut participants), 2);
        assert!(participants.iter().all(|p| !p.has_won));
        assert_eq!(round_state(&[]), RoundState::RoundExhausted);
    }
}
