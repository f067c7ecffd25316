//! Neura Pilot - text-perception battle automation for the Neura Knights web client
//!
//! This library drives the game's card battles through a rendering surface:
//! it reads state from the visible page text, synthesizes pointer gestures,
//! and walks the map locations while battle attempts remain.
//!
//! ## Layers
//!
//! - [`perception`] turns page text into facts and never fails
//! - [`gesture`] turns clicks and drags into pointer operations
//! - [`autopilot`] holds the turn engine, the battle supervisor, and the map session
//! - [`surface`] is the host contract; the `browser` feature adds a Chromium backend

pub mod autopilot;
pub mod config;
pub mod game;
pub mod gesture;
pub mod perception;
pub mod surface;

#[cfg(test)]
mod testing;

use crate::autopilot::{BattleSupervisor, Cockpit, MapSession, SessionReport};
use crate::config::{ConfigError, Settings};
use crate::perception::TextPerception;
use crate::surface::{Surface, SurfaceError};

/// Errors that stop a session before it starts
#[derive(Debug, thiserror::Error)]
pub enum PilotError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Runs map sessions with one set of settings
#[derive(Debug, Clone)]
pub struct Pilot {
    settings: Settings,
}

impl Pilot {
    /// Create a pilot, rejecting inconsistent settings
    pub fn new(settings: Settings) -> Result<Self, PilotError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Play every location on the map once
    ///
    /// The surface must report the canonical viewport; otherwise the
    /// coordinate table does not apply and nothing is clicked.
    pub fn run<S: Surface>(&self, surface: &S) -> Result<SessionReport, PilotError> {
        let (width, height) = surface.viewport()?;
        self.settings.geometry.check_surface(width, height)?;

        if !self.settings.automation.auto_battle {
            log::info!("Auto battle disabled, skipping the map session");
            return Ok(SessionReport::default());
        }

        let perception = TextPerception::new(surface, &self.settings.geometry);
        let mut cockpit = Cockpit::new(surface, perception, &self.settings);
        let mut session = MapSession::new(BattleSupervisor::new(self.settings.budget));

        Ok(session.run(&mut cockpit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autopilot::LocationStatus;
    use crate::testing::FakeSurface;

    #[test]
    fn test_viewport_mismatch_touches_nothing() {
        let surface = FakeSurface::new();
        surface.set_viewport(390, 844);
        let pilot = Pilot::new(Settings::default()).unwrap();

        let result = pilot.run(&surface);

        assert!(matches!(
            result,
            Err(PilotError::Config(ConfigError::ViewportMismatch { .. }))
        ));
        assert_eq!(surface.pointer_calls(), 0);
    }

    #[test]
    fn test_auto_battle_disabled() {
        let surface = FakeSurface::new();
        let mut settings = Settings::default();
        settings.automation.auto_battle = false;
        let pilot = Pilot::new(settings).unwrap();

        let report = pilot.run(&surface).unwrap();

        assert_eq!(report, SessionReport::default());
        assert_eq!(surface.pointer_calls(), 0);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut settings = Settings::default();
        settings.limits.slot_attempts = 0;
        assert!(matches!(Pilot::new(settings), Err(PilotError::Config(_))));
    }

    #[test]
    fn test_blank_page_visits_every_location() {
        let surface = FakeSurface::new();
        let pilot = Pilot::new(Settings::default()).unwrap();

        let report = pilot.run(&surface).unwrap();
        let geometry = &pilot.settings().geometry;

        assert_eq!(report.battles, 0);
        assert_eq!(report.locations.len(), geometry.locations.len());
        assert!(report
            .locations
            .iter()
            .all(|l| l.status == LocationStatus::NoPopup));

        let presses = surface.presses();
        assert_eq!(presses.first(), Some(&geometry.zones.map_tab));
        // Map tab, then a click and a close per location
        assert_eq!(presses.len(), 1 + 2 * geometry.locations.len());
    }

    #[test]
    fn test_popup_text_drives_a_battle() {
        let surface = FakeSurface::new();
        // Popup reads 1/3 and offers PLAY; after PLAY the page never changes,
        // so the battle times out waiting for END TURN.
        surface.show("TRAINING\nDAILY REWARD LIMIT\n1 / 3", &["PLAY"]);
        let mut settings = Settings::default();
        settings.limits.max_battles_per_location = 1;
        let pilot = Pilot::new(settings).unwrap();

        let report = pilot.run(&surface).unwrap();

        // Every location shows the same text, so each one plays once
        assert_eq!(report.locations[0].status, LocationStatus::Played);
        assert_eq!(report.locations[0].battles, 1);
        assert_eq!(
            surface.presses_at(pilot.settings().geometry.zones.play_button),
            report.battles as usize
        );
    }
}
