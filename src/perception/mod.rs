//! Perception
//!
//! Derives UI facts from whatever the host can show us. The turn engine and
//! the orchestrators only see the [`Perception`] trait, so a structured
//! game-state backend could replace text scraping without touching them.

pub mod text;

use crate::config::ViewportGeometry;
use crate::game::{BattleObservation, BattlePhase, PopupState};
use crate::surface::Surface;

/// Observe current state
///
/// Implementations never fail: when a fact cannot be extracted they return
/// the conservative reading (popup closed, battle not over, hit points
/// unknown).
pub trait Perception {
    /// Read the location popup
    fn popup(&mut self) -> PopupState;

    /// Read player-turn and battle-over markers
    fn battle_phase(&mut self) -> BattlePhase;

    /// Estimate the monster's hit points
    fn monster_hit_points(&mut self) -> Option<u32>;

    /// Whether the post-battle result screen is still showing
    fn result_screen_visible(&mut self) -> bool;

    /// Phase and hit points together
    fn observe_battle(&mut self) -> BattleObservation {
        BattleObservation {
            phase: self.battle_phase(),
            monster_hit_points: self.monster_hit_points(),
        }
    }
}

/// Perception by scanning the visible text of a [`Surface`]
pub struct TextPerception<'a, S: Surface> {
    surface: &'a S,
    /// Location names in tie-break order
    locations: Vec<String>,
}

impl<'a, S: Surface> TextPerception<'a, S> {
    /// Create a text perception over a surface
    pub fn new(surface: &'a S, geometry: &ViewportGeometry) -> Self {
        Self {
            surface,
            locations: geometry.location_names().map(str::to_string).collect(),
        }
    }

    /// Visible text, or an empty string if the surface could not be read
    fn snapshot_text(&self) -> String {
        match self.surface.visible_text() {
            Ok(text) => text,
            Err(e) => {
                log::debug!("Text snapshot failed: {}", e);
                String::new()
            }
        }
    }

    fn snapshot_labels(&self) -> Vec<String> {
        match self.surface.element_labels() {
            Ok(labels) => labels,
            Err(e) => {
                log::debug!("Label snapshot failed: {}", e);
                Vec::new()
            }
        }
    }
}

impl<S: Surface> Perception for TextPerception<'_, S> {
    fn popup(&mut self) -> PopupState {
        let text = self.snapshot_text();
        if text.is_empty() {
            return PopupState::closed();
        }
        let labels = self.snapshot_labels();
        let popup = text::parse_popup(&text, &labels, self.locations.iter().map(String::as_str));
        log::debug!("Popup: {:?}", popup);
        popup
    }

    fn battle_phase(&mut self) -> BattlePhase {
        text::parse_phase(&self.snapshot_text())
    }

    fn monster_hit_points(&mut self) -> Option<u32> {
        text::parse_hit_points(&self.snapshot_text())
    }

    fn result_screen_visible(&mut self) -> bool {
        text::result_screen_visible(&self.snapshot_text())
    }
}
