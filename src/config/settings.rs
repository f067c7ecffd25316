//! User settings
//!
//! Defines all configurable options for the automation. Every section
//! defaults independently, so a JSON file only needs the fields it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::geometry::{SlotLayout, ViewportGeometry};
use super::ConfigError;

/// Main settings structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Canonical viewport and named zones
    pub geometry: ViewportGeometry,
    /// Card slot positions per hand size
    pub slots: SlotLayout,
    /// Starting energy and hand size for the per-battle estimate
    pub budget: TurnBudget,
    /// Round, turn, and retry caps
    pub limits: BattleLimits,
    /// Settle delays
    pub timings: TimingSettings,
    /// Session-level switches
    pub automation: AutomationSettings,
}

impl Settings {
    /// Parse settings from JSON and validate them
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Check cross-field invariants
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.geometry.validate()?;
        self.slots.validate()?;

        if self.budget.starting_energy == 0 {
            return Err(ConfigError::Invalid("starting_energy must be at least 1".into()));
        }
        if self.budget.starting_hand_size == 0 {
            return Err(ConfigError::Invalid(
                "starting_hand_size must be at least 1".into(),
            ));
        }
        if !(1..=2).contains(&self.limits.slot_attempts) {
            return Err(ConfigError::Invalid(
                "slot_attempts must be 1 or 2 (at most one retry per slot)".into(),
            ));
        }
        if self.limits.max_battles_per_location == 0 {
            return Err(ConfigError::Invalid(
                "max_battles_per_location must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Starting values of the per-battle estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnBudget {
    /// Energy the game refills at the start of each turn
    pub starting_energy: u32,
    /// Cards dealt at the start of each turn
    pub starting_hand_size: u32,
}

impl Default for TurnBudget {
    fn default() -> Self {
        Self {
            starting_energy: 5,
            starting_hand_size: 5,
        }
    }
}

/// Caps that guarantee forward progress
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleLimits {
    /// Rounds the turn engine runs per invocation
    pub max_rounds: u32,
    /// Turns the supervisor drives before giving up on a battle
    pub max_turns: u32,
    /// Polls spent waiting for the player's turn
    pub player_turn_polls: u32,
    /// Drag attempts per slot within one pass (1 = no retry)
    pub slot_attempts: u32,
    /// Click rounds spent dismissing the result screen
    pub dismiss_rounds: u32,
    /// Battles started from one location before moving on
    pub max_battles_per_location: u32,
}

impl Default for BattleLimits {
    fn default() -> Self {
        Self {
            max_rounds: 20,
            max_turns: 50,
            player_turn_polls: 30,
            slot_attempts: 1,
            dismiss_rounds: 5,
            max_battles_per_location: 10,
        }
    }
}

/// Timing settings for screen interactions, all in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    /// Gap between the two safe-zone clicks of a reset
    pub reset_click_gap: u64,
    /// Pause between the reset and the drag itself
    pub pre_drag: u64,
    /// Settle after moving onto the card
    pub approach: u64,
    /// Settle after pressing the card
    pub press: u64,
    /// Delay between sweep steps
    pub sweep_step: u64,
    /// Hold at the drop target before releasing
    pub hold: u64,
    /// Card play animation after release
    pub release_animation: u64,
    /// Settle after the confirm click
    pub confirm: u64,
    /// Pause before retrying a slot that did not confirm
    pub slot_retry: u64,
    /// Wait before re-reading hit points
    pub verify_settle: u64,
    /// Gap between redundant END TURN clicks
    pub end_turn_click_gap: u64,
    /// Settle after the END TURN burst
    pub end_turn_settle: u64,
    /// Enemy turn animation
    pub enemy_animation: u64,
    /// Pause between rounds
    pub round_gap: u64,
    /// Settle after the neutral click that opens a turn
    pub neutral_click: u64,
    /// Wait after the supervisor's own END TURN click
    pub supervisor_end_turn: u64,
    /// Battle scene loading
    pub battle_load: u64,
    /// Interval between player-turn polls
    pub player_turn_poll: u64,
    /// Wait for the result screen to appear
    pub result_appear: u64,
    /// Gap between CONTINUE candidate clicks
    pub dismiss_click_gap: u64,
    /// Wait before re-checking the result screen
    pub dismiss_check: u64,
    /// Settle after the last-resort CONTINUE click
    pub dismiss_forced: u64,
    /// Map tab transition
    pub map_navigation: u64,
    /// Popup open animation
    pub popup_open: u64,
    /// Popup close animation
    pub popup_close: u64,
    /// Wait after pressing PLAY
    pub play_load: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            reset_click_gap: 150,
            pre_drag: 200,
            approach: 500,
            press: 300,
            sweep_step: 40,
            hold: 300,
            release_animation: 1500,
            confirm: 500,
            slot_retry: 300,
            verify_settle: 500,
            end_turn_click_gap: 200,
            end_turn_settle: 2500,
            enemy_animation: 2500,
            round_gap: 500,
            neutral_click: 500,
            supervisor_end_turn: 5000,
            battle_load: 3000,
            player_turn_poll: 1000,
            result_appear: 3000,
            dismiss_click_gap: 500,
            dismiss_check: 2000,
            dismiss_forced: 2000,
            map_navigation: 3000,
            popup_open: 3000,
            popup_close: 2000,
            play_load: 3000,
        }
    }
}

/// Session-level switches, threaded explicitly through the pilot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomationSettings {
    /// Run battles at all
    pub auto_battle: bool,
    /// Run the browser without a window
    pub headless: bool,
    /// Game client origin
    pub base_url: String,
    /// Pause between accounts (ms)
    pub account_pause_ms: u64,
}

impl Default for AutomationSettings {
    fn default() -> Self {
        Self {
            auto_battle: true,
            headless: false,
            base_url: "https://www.neuraknights.gg".to_string(),
            account_pause_ms: 5000,
        }
    }
}
