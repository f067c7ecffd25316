//! Game state and bookkeeping
//!
//! Transient UI snapshots, the per-battle estimate, and battle reports.

pub mod battle;
pub mod state;

pub use battle::{
    confirm_play, BattleOutcome, BattleReport, Dismissal, PlayOutcome, TurnEstimate, TurnExit,
    TurnReport,
};
pub use state::{BattleObservation, BattlePhase, PopupState};
