//! Configuration module
//!
//! Handles user settings, the viewport coordinate table, and automation
//! preferences.

pub mod geometry;
pub mod settings;

pub use geometry::{LocationZone, Point, SlotLayout, ViewportGeometry, Zones};
pub use settings::{AutomationSettings, BattleLimits, Settings, TimingSettings, TurnBudget};

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid settings: {0}")]
    Invalid(String),
    #[error("Surface is {actual:?}, coordinate table expects {expected:?}")]
    ViewportMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
}
