//! Perceived UI state
//!
//! Snapshots derived from a single perception pass. They are recomputed
//! before every decision and never cached across turns.

use serde::{Deserialize, Serialize};

/// A map location popup as read from the screen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopupState {
    /// Whether the popup overlay is showing
    pub is_open: bool,
    /// Location named in the popup, if one was recognized
    pub location: Option<String>,
    /// Remaining battle attempts (first number of the "n / m" counter)
    pub attempts: u32,
    /// Daily attempt limit (second number of the counter)
    pub max_attempts: u32,
    /// PLAY is offered, nothing is LOCKED, and attempts remain
    pub can_play: bool,
    /// A LOCKED control is present
    pub is_locked: bool,
    /// Rewards are exhausted for today
    pub exhausted: bool,
}

impl PopupState {
    /// The conservative reading: no popup
    pub fn closed() -> Self {
        Self::default()
    }

    /// Whether another battle can be started from this popup
    pub fn playable(&self) -> bool {
        self.is_open && self.can_play && self.attempts > 0
    }
}

/// Turn and end-of-battle markers from one perception pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattlePhase {
    /// The END TURN control is visible
    pub player_turn: bool,
    /// A result marker is visible, or the view fell back to the map
    pub battle_over: bool,
}

impl BattlePhase {
    /// The player can act and the battle has not ended
    pub fn is_active(&self) -> bool {
        self.player_turn && !self.battle_over
    }
}

/// One observation of the battle view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleObservation {
    /// Best-effort hit point estimate; `None` means unknown, not zero
    pub monster_hit_points: Option<u32>,
    pub phase: BattlePhase,
}

impl BattleObservation {
    pub fn is_player_turn(&self) -> bool {
        self.phase.player_turn
    }

    pub fn is_battle_over(&self) -> bool {
        self.phase.battle_over
    }
}
