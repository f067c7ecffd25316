//! Map session orchestration
//!
//! Visits every configured location in order, reads its popup, and keeps
//! launching battles there while the popup offers PLAY with attempts left.

use serde::{Deserialize, Serialize};

use crate::config::LocationZone;
use crate::game::{BattleReport, PopupState};
use crate::perception::Perception;
use crate::surface::Surface;

use super::{BattleRunner, Cockpit};

/// What happened at one location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationStatus {
    /// Clicking the location did not open a popup
    NoPopup,
    Locked,
    /// No attempts left today
    Exhausted,
    /// Attempts remain but the popup offers no PLAY control
    NotPlayable,
    /// At least one battle was launched
    Played,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationReport {
    pub name: String,
    pub status: LocationStatus,
    pub battles: u32,
}

/// Summary of a whole map session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReport {
    pub battles: u32,
    pub cards_played: u32,
    pub damage_dealt: u32,
    pub locations: Vec<LocationReport>,
}

impl SessionReport {
    fn record(&mut self, battle: &BattleReport) {
        self.battles += 1;
        self.cards_played += battle.cards_played;
        self.damage_dealt += battle.damage_dealt;
    }
}

/// Walks the map, delegating each battle to a [`BattleRunner`]
pub struct MapSession<R> {
    runner: R,
}

impl<R> MapSession<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Visit every location once, easiest first
    pub fn run<S, P>(&mut self, cockpit: &mut Cockpit<'_, S, P>) -> SessionReport
    where
        S: Surface,
        P: Perception,
        R: BattleRunner<S, P>,
    {
        let settings = cockpit.settings;
        let mut report = SessionReport::default();

        open_map(cockpit);
        for location in &settings.geometry.locations {
            let entry = self.play_location(cockpit, location, &mut report);
            report.locations.push(entry);
        }

        log::info!(
            "Session done: {} battles, {} cards, {} damage",
            report.battles,
            report.cards_played,
            report.damage_dealt
        );
        report
    }

    fn play_location<S, P>(
        &mut self,
        cockpit: &mut Cockpit<'_, S, P>,
        location: &LocationZone,
        report: &mut SessionReport,
    ) -> LocationReport
    where
        S: Surface,
        P: Perception,
        R: BattleRunner<S, P>,
    {
        let settings = cockpit.settings;
        log::info!("Checking {}", location.name);

        let mut popup = open_popup(cockpit, location);
        let skipped = if !popup.is_open {
            log::warn!("{}: no popup opened", location.name);
            Some(LocationStatus::NoPopup)
        } else if popup.is_locked {
            log::info!("{}: locked", location.name);
            Some(LocationStatus::Locked)
        } else if popup.exhausted || popup.attempts == 0 {
            log::info!(
                "{}: no attempts remaining ({}/{})",
                location.name,
                popup.attempts,
                popup.max_attempts
            );
            Some(LocationStatus::Exhausted)
        } else if !popup.playable() {
            log::warn!("{}: attempts left but no PLAY control", location.name);
            Some(LocationStatus::NotPlayable)
        } else {
            None
        };

        if let Some(status) = skipped {
            close_popup(cockpit);
            return LocationReport {
                name: location.name.clone(),
                status,
                battles: 0,
            };
        }

        log::info!(
            "{}: {}/{} attempts available",
            location.name,
            popup.attempts,
            popup.max_attempts
        );

        let mut battles = 0;
        while popup.playable() {
            if battles >= settings.limits.max_battles_per_location {
                log::warn!(
                    "{}: stopping after {} battles, attempts still read {}",
                    location.name,
                    battles,
                    popup.attempts
                );
                break;
            }

            cockpit.gestures.click(settings.geometry.zones.play_button);
            cockpit.pause(settings.timings.play_load);

            let battle = self.runner.run_battle(cockpit);
            battles += 1;
            report.record(&battle);
            log::info!("Completed battle {} on {}", report.battles, location.name);

            open_map(cockpit);
            popup = open_popup(cockpit, location);
        }

        log::info!("{}: done after {} battles", location.name, battles);
        close_popup(cockpit);

        LocationReport {
            name: location.name.clone(),
            status: LocationStatus::Played,
            battles,
        }
    }
}

fn open_map<S: Surface, P: Perception>(cockpit: &mut Cockpit<'_, S, P>) {
    let settings = cockpit.settings;
    cockpit.gestures.click(settings.geometry.zones.map_tab);
    cockpit.pause(settings.timings.map_navigation);
}

fn open_popup<S: Surface, P: Perception>(
    cockpit: &mut Cockpit<'_, S, P>,
    location: &LocationZone,
) -> PopupState {
    let settings = cockpit.settings;
    cockpit.gestures.click(location.point);
    cockpit.pause(settings.timings.popup_open);
    cockpit.perception.popup()
}

fn close_popup<S: Surface, P: Perception>(cockpit: &mut Cockpit<'_, S, P>) {
    let settings = cockpit.settings;
    cockpit.gestures.click(settings.geometry.zones.popup_close);
    cockpit.pause(settings.timings.popup_close);
}
