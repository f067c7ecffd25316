//! Battle supervisor
//!
//! Drives turns until the battle is over, then clears the result screen.

use crate::config::TurnBudget;
use crate::game::{BattleOutcome, BattleReport, Dismissal};
use crate::perception::Perception;
use crate::surface::Surface;

use super::{BattleRunner, Cockpit, TurnEngine};

/// What the wait for the player's turn ended with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TurnWait {
    PlayerTurn,
    Over,
    TimedOut,
}

/// Runs whole battles on top of the turn engine
#[derive(Debug, Clone)]
pub struct BattleSupervisor {
    engine: TurnEngine,
}

impl BattleSupervisor {
    pub fn new(budget: TurnBudget) -> Self {
        Self {
            engine: TurnEngine::new(budget),
        }
    }

    /// Play one battle to the end
    pub fn run<S: Surface, P: Perception>(&mut self, cockpit: &mut Cockpit<'_, S, P>) -> BattleReport {
        let settings = cockpit.settings;
        let timings = &settings.timings;
        let limits = settings.limits;

        log::info!("Battle started");
        self.engine.reset();
        cockpit.pause(timings.battle_load);

        let mut report = BattleReport::empty(BattleOutcome::TurnBudgetSpent);

        while report.turns < limits.max_turns {
            if cockpit.perception.battle_phase().battle_over {
                report.outcome = BattleOutcome::Finished;
                break;
            }

            match self.wait_for_player_turn(cockpit) {
                TurnWait::PlayerTurn => {}
                TurnWait::Over => {
                    log::info!("Battle ended during the enemy turn");
                    report.outcome = BattleOutcome::Finished;
                    break;
                }
                TurnWait::TimedOut => {
                    log::warn!("Timed out waiting for the player's turn");
                    report.outcome = BattleOutcome::PlayerTurnTimeout;
                    break;
                }
            }

            report.turns += 1;
            log::info!("Turn {}", report.turns);
            let turn = self.engine.run(cockpit);
            report.absorb(&turn);

            // The monster may have died to the last card
            let observation = cockpit.perception.observe_battle();
            log::debug!("Monster hit points after turn: {:?}", observation.monster_hit_points);
            if observation.is_battle_over() {
                report.outcome = BattleOutcome::Finished;
                break;
            }
            if observation.is_player_turn() {
                if !cockpit.gestures.click(settings.geometry.zones.end_turn) {
                    log::warn!("END TURN click was not dispatched");
                }
                self.engine.refill();
                cockpit.pause(timings.supervisor_end_turn);
            }
        }

        if report.outcome == BattleOutcome::TurnBudgetSpent {
            log::warn!("Gave up after {} turns", report.turns);
        }

        report.dismissal = self.dismiss_result_screen(cockpit);
        log::info!(
            "Battle done: {:?}, {} turns, {} cards, {} damage",
            report.outcome,
            report.turns,
            report.cards_played,
            report.damage_dealt
        );
        report
    }

    fn wait_for_player_turn<S: Surface, P: Perception>(
        &mut self,
        cockpit: &mut Cockpit<'_, S, P>,
    ) -> TurnWait {
        let settings = cockpit.settings;
        for _ in 0..settings.limits.player_turn_polls {
            let phase = cockpit.perception.battle_phase();
            if phase.battle_over {
                return TurnWait::Over;
            }
            if phase.player_turn {
                return TurnWait::PlayerTurn;
            }
            cockpit.pause(settings.timings.player_turn_poll);
        }
        TurnWait::TimedOut
    }

    /// Click CONTINUE candidates until the result screen is gone
    ///
    /// The first round of clicks always goes out. Every later round is a
    /// retry, issued only when the re-check still sees the result screen.
    /// Once the retry budget is spent one last click at the fallback
    /// position is made regardless.
    fn dismiss_result_screen<S: Surface, P: Perception>(
        &mut self,
        cockpit: &mut Cockpit<'_, S, P>,
    ) -> Dismissal {
        let settings = cockpit.settings;
        let timings = &settings.timings;
        let zones = &settings.geometry.zones;
        let mut dismissal = Dismissal::default();

        cockpit.pause(timings.result_appear);
        click_continue(cockpit);

        for _ in 0..settings.limits.dismiss_rounds {
            if !cockpit.perception.result_screen_visible() {
                log::info!("Result screen dismissed after {} retries", dismissal.retries);
                dismissal.cleared = true;
                return dismissal;
            }
            dismissal.retries += 1;
            log::debug!(
                "CONTINUE retry {}/{}",
                dismissal.retries,
                settings.limits.dismiss_rounds
            );
            click_continue(cockpit);
        }

        log::warn!("Result screen still up, forcing a final CONTINUE click");
        cockpit.gestures.click(zones.continue_fallback);
        cockpit.pause(timings.dismiss_forced);
        dismissal
    }
}

/// One round over every CONTINUE candidate, then let the screen settle
fn click_continue<S: Surface, P: Perception>(cockpit: &mut Cockpit<'_, S, P>) {
    let settings = cockpit.settings;
    let timings = &settings.timings;
    cockpit
        .gestures
        .click_each(&settings.geometry.zones.continue_candidates, timings.dismiss_click_gap);
    cockpit.pause(timings.dismiss_check);
}

impl<S: Surface, P: Perception> BattleRunner<S, P> for BattleSupervisor {
    fn run_battle(&mut self, cockpit: &mut Cockpit<'_, S, P>) -> BattleReport {
        self.run(cockpit)
    }
}
