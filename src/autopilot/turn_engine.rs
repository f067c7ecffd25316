//! Turn engine
//!
//! Each round scans the estimated card slots left to right and drags each
//! one onto the enemy. A play counts only when the monster's hit points are
//! seen to drop. After a confirmed play the hand has shifted, so the slot
//! positions are recomputed and the scan restarts from the left. A round
//! without a single confirmed play hands the turn back.

use std::collections::HashSet;

use crate::config::{Point, TurnBudget};
use crate::game::{confirm_play, PlayOutcome, TurnEstimate, TurnExit, TurnReport};
use crate::perception::text::END_TURN_MARKER;
use crate::perception::Perception;
use crate::surface::Surface;

use super::Cockpit;

/// Plays cards until the battle ends or the round budget runs out
#[derive(Debug, Clone)]
pub struct TurnEngine {
    budget: TurnBudget,
    estimate: TurnEstimate,
}

impl TurnEngine {
    pub fn new(budget: TurnBudget) -> Self {
        Self {
            budget,
            estimate: TurnEstimate::new(budget),
        }
    }

    /// Current energy and hand-size estimate
    pub fn estimate(&self) -> &TurnEstimate {
        &self.estimate
    }

    /// Start over for a new battle
    pub fn reset(&mut self) {
        self.estimate = TurnEstimate::new(self.budget);
    }

    /// The turn was handed back by someone else
    pub fn refill(&mut self) {
        self.estimate.refill();
    }

    /// Run rounds until perception reports the battle inactive
    pub fn run<S: Surface, P: Perception>(&mut self, cockpit: &mut Cockpit<'_, S, P>) -> TurnReport {
        let settings = cockpit.settings;
        let timings = &settings.timings;

        let mut report = TurnReport {
            rounds: 0,
            cards_played: 0,
            damage_dealt: 0,
            turns_ended: 0,
            exit: TurnExit::RoundBudgetSpent,
        };

        cockpit.gestures.click(settings.geometry.zones.neutral);
        cockpit.pause(timings.neutral_click);

        for round in 1..=settings.limits.max_rounds {
            if !cockpit.perception.battle_phase().is_active() {
                log::info!("Player turn no longer active after {} rounds", report.rounds);
                report.exit = TurnExit::Inactive;
                break;
            }
            report.rounds = round;
            log::info!(
                "Round {} | energy ~{} | hand ~{}",
                round,
                self.estimate.energy,
                self.estimate.hand_size
            );

            if self.play_round(cockpit, &mut report) == 0 {
                self.end_turn(cockpit);
                report.turns_ended += 1;
            }

            cockpit.pause(timings.round_gap);
        }

        log::info!(
            "Turn engine done: {} cards, {} damage over {} rounds",
            report.cards_played,
            report.damage_dealt,
            report.rounds
        );
        report
    }

    /// One scan over the hand; returns confirmed plays
    fn play_round<S: Surface, P: Perception>(
        &mut self,
        cockpit: &mut Cockpit<'_, S, P>,
        report: &mut TurnReport,
    ) -> u32 {
        let settings = cockpit.settings;
        let mut failed: HashSet<Point> = HashSet::new();
        let mut played = 0;

        'scan: loop {
            let slots = settings.slots.slots(self.estimate.hand_size);
            log::debug!(
                "Scanning {} slots: {:?}",
                slots.len(),
                slots.iter().map(|p| p.x).collect::<Vec<_>>()
            );

            for slot in slots {
                if !cockpit.perception.battle_phase().is_active() {
                    break 'scan;
                }
                if failed.contains(&slot) {
                    continue;
                }
                if self.estimate.out_of_energy() {
                    log::info!("Out of energy for this turn");
                    break 'scan;
                }

                match self.try_slot(cockpit, slot) {
                    Some(damage) => {
                        self.estimate.record_play();
                        played += 1;
                        report.cards_played += 1;
                        report.damage_dealt += damage;
                        log::info!(
                            "Card played from x={}, hand now ~{}",
                            slot.x,
                            self.estimate.hand_size
                        );
                        // Cards re-centered; every old position is stale
                        failed.clear();
                        continue 'scan;
                    }
                    None => {
                        failed.insert(slot);
                    }
                }
            }
            break;
        }

        played
    }

    /// Drag one slot, retrying within the configured attempts
    ///
    /// Returns the observed damage when a play was confirmed.
    fn try_slot<S: Surface, P: Perception>(
        &mut self,
        cockpit: &mut Cockpit<'_, S, P>,
        slot: Point,
    ) -> Option<u32> {
        let settings = cockpit.settings;
        let target = settings.geometry.zones.enemy_target;

        for attempt in 1..=settings.limits.slot_attempts {
            if attempt > 1 {
                log::debug!("Retry {}/{} at x={}", attempt, settings.limits.slot_attempts, slot.x);
                cockpit.pause(settings.timings.slot_retry);
            }

            let before = cockpit.perception.monster_hit_points();
            if !cockpit.gestures.drag(slot, target) {
                continue;
            }

            cockpit.pause(settings.timings.verify_settle);
            let after = cockpit.perception.monster_hit_points();
            match confirm_play(before, after) {
                PlayOutcome::Landed { damage } => {
                    log::info!("Damage dealt: {}", damage);
                    return Some(damage);
                }
                PlayOutcome::Unconfirmed => {
                    log::debug!("Play from x={} unconfirmed ({:?} -> {:?})", slot.x, before, after);
                }
            }
        }

        None
    }

    /// Hand the turn back and wait out the enemy
    fn end_turn<S: Surface, P: Perception>(&mut self, cockpit: &mut Cockpit<'_, S, P>) {
        let settings = cockpit.settings;
        let timings = &settings.timings;
        log::info!("No card landed this round, ending turn");

        cockpit
            .gestures
            .click_each(&settings.geometry.zones.end_turn_candidates, timings.end_turn_click_gap);

        match cockpit.gestures.surface().activate_text(END_TURN_MARKER) {
            Ok(true) => log::debug!("END TURN activated through the page"),
            Ok(false) => log::debug!("No END TURN element on the page"),
            Err(e) => log::warn!("END TURN fallback failed: {}", e),
        }

        cockpit.pause(timings.end_turn_settle);
        self.estimate.refill();
        cockpit.pause(timings.enemy_animation);
    }
}
