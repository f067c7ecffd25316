//! Battle bookkeeping
//!
//! Tracks the local energy and hand-size estimate, the rule that decides
//! whether a card play landed, and the reports produced by turns and battles.

use serde::{Deserialize, Serialize};

use crate::config::TurnBudget;

/// Local estimate of energy and hand size
///
/// Neither value is observable on screen. They only bound how many plays are
/// attempted before the turn is handed back; nothing guarantees they match
/// the game's own counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnEstimate {
    pub energy: u32,
    pub hand_size: u32,
    budget: TurnBudget,
}

impl TurnEstimate {
    /// Fresh estimate for a new battle
    pub fn new(budget: TurnBudget) -> Self {
        Self {
            energy: budget.starting_energy,
            hand_size: budget.starting_hand_size,
            budget,
        }
    }

    /// A play was confirmed
    pub fn record_play(&mut self) {
        self.energy = self.energy.saturating_sub(1);
        self.hand_size = self.hand_size.saturating_sub(1).max(1);
    }

    /// The turn ended; the game refills energy and deals a new hand
    pub fn refill(&mut self) {
        self.energy = self.budget.starting_energy;
        self.hand_size = self.budget.starting_hand_size;
    }

    pub fn out_of_energy(&self) -> bool {
        self.energy == 0
    }
}

/// Result of checking a drag against the hit point readings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Hit points dropped by `damage`
    Landed { damage: u32 },
    /// No observable effect, or no reading to compare
    Unconfirmed,
}

impl PlayOutcome {
    pub fn landed(&self) -> bool {
        matches!(self, PlayOutcome::Landed { .. })
    }
}

/// A play counts only when both readings exist and the second is lower
pub fn confirm_play(before: Option<u32>, after: Option<u32>) -> PlayOutcome {
    match (before, after) {
        (Some(before), Some(after)) if after < before => PlayOutcome::Landed {
            damage: before - after,
        },
        _ => PlayOutcome::Unconfirmed,
    }
}

/// Why the turn engine returned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnExit {
    /// Perception stopped reporting an active player turn: the battle is
    /// over, or the turn passed to the enemy
    Inactive,
    /// All rounds were used
    RoundBudgetSpent,
}

/// Summary of one turn engine invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnReport {
    pub rounds: u32,
    pub cards_played: u32,
    pub damage_dealt: u32,
    /// END TURN bursts issued by stalled rounds
    pub turns_ended: u32,
    pub exit: TurnExit,
}

/// How the supervisor left a battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleOutcome {
    /// Perception reported the battle over
    Finished,
    /// The player's turn never came
    PlayerTurnTimeout,
    /// The turn cap was reached
    TurnBudgetSpent,
}

/// Result screen dismissal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dismissal {
    /// Extra rounds of CONTINUE clicks after the first, one per check that
    /// still saw the result screen
    pub retries: u32,
    /// The result screen was gone before the budget ran out
    pub cleared: bool,
}

/// Summary of one battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleReport {
    pub turns: u32,
    pub cards_played: u32,
    pub damage_dealt: u32,
    pub outcome: BattleOutcome,
    pub dismissal: Dismissal,
}

impl BattleReport {
    pub fn empty(outcome: BattleOutcome) -> Self {
        Self {
            turns: 0,
            cards_played: 0,
            damage_dealt: 0,
            outcome,
            dismissal: Dismissal::default(),
        }
    }

    pub(crate) fn absorb(&mut self, turn: &TurnReport) {
        self.cards_played += turn.cards_played;
        self.damage_dealt += turn.damage_dealt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_record_play() {
        let mut estimate = TurnEstimate::new(TurnBudget::default());
        estimate.record_play();

        assert_eq!(estimate.energy, 4);
        assert_eq!(estimate.hand_size, 4);
    }

    #[test]
    fn test_hand_never_below_one() {
        let mut estimate = TurnEstimate::new(TurnBudget {
            starting_energy: 9,
            starting_hand_size: 2,
        });
        for _ in 0..5 {
            estimate.record_play();
        }

        assert_eq!(estimate.hand_size, 1);
        assert_eq!(estimate.energy, 4);
    }

    #[test]
    fn test_energy_exhaustion() {
        let mut estimate = TurnEstimate::new(TurnBudget {
            starting_energy: 1,
            starting_hand_size: 5,
        });
        assert!(!estimate.out_of_energy());

        estimate.record_play();
        assert!(estimate.out_of_energy());
        estimate.record_play();
        assert_eq!(estimate.energy, 0);
    }

    #[test]
    fn test_confirm_play_cases() {
        assert_eq!(
            confirm_play(Some(1000), Some(880)),
            PlayOutcome::Landed { damage: 120 }
        );
        assert_eq!(confirm_play(Some(1000), Some(1000)), PlayOutcome::Unconfirmed);
        assert_eq!(confirm_play(None, Some(10)), PlayOutcome::Unconfirmed);
        assert_eq!(confirm_play(Some(10), None), PlayOutcome::Unconfirmed);
        assert_eq!(confirm_play(None, None), PlayOutcome::Unconfirmed);
        // Zero is a real reading, unlike an absent one
        assert!(confirm_play(Some(5), Some(0)).landed());
    }

    proptest! {
        #[test]
        fn prop_play_lands_only_on_observed_drop(
            before in proptest::option::of(0u32..100_000),
            after in proptest::option::of(0u32..100_000),
        ) {
            let outcome = confirm_play(before, after);
            let expected = matches!((before, after), (Some(b), Some(a)) if a < b);
            prop_assert_eq!(outcome.landed(), expected);
            if let PlayOutcome::Landed { damage } = outcome {
                prop_assert_eq!(Some(damage), before.zip(after).map(|(b, a)| b - a));
            }
        }

        #[test]
        fn prop_refill_is_idempotent(
            plays in 0usize..12,
            energy in 1u32..10,
            hand in 1u32..6,
        ) {
            let budget = TurnBudget { starting_energy: energy, starting_hand_size: hand };
            let mut estimate = TurnEstimate::new(budget);
            for _ in 0..plays {
                estimate.record_play();
            }
            prop_assert!(estimate.hand_size >= 1);

            estimate.refill();
            let once = estimate;
            estimate.refill();
            prop_assert_eq!(once, estimate);
            prop_assert_eq!(estimate.energy, energy);
            prop_assert_eq!(estimate.hand_size, hand);
        }
    }
}
