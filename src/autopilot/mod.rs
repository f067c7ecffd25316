//! Battle automation
//!
//! The closed loop: the [`TurnEngine`] plays cards within a turn, the
//! [`BattleSupervisor`] drives turns until the battle ends, and the
//! [`MapSession`] walks the map locations launching battles while attempts
//! remain. All three share one [`Cockpit`].

pub mod map_session;
pub mod supervisor;
pub mod turn_engine;

pub use map_session::{LocationReport, LocationStatus, MapSession, SessionReport};
pub use supervisor::BattleSupervisor;
pub use turn_engine::TurnEngine;

use crate::config::Settings;
use crate::game::BattleReport;
use crate::gesture::GestureExecutor;
use crate::perception::Perception;
use crate::surface::Surface;

/// Gestures, perception, and settings for one session
pub struct Cockpit<'a, S: Surface, P: Perception> {
    pub gestures: GestureExecutor<'a, S>,
    pub perception: P,
    pub settings: &'a Settings,
}

impl<'a, S: Surface, P: Perception> Cockpit<'a, S, P> {
    pub fn new(surface: &'a S, perception: P, settings: &'a Settings) -> Self {
        Self {
            gestures: GestureExecutor::new(surface, settings),
            perception,
            settings,
        }
    }

    /// Settle delay
    pub fn pause(&self, ms: u64) {
        self.gestures.pause(ms);
    }
}

/// Runs one battle, from the PLAY press until the result screen is gone
pub trait BattleRunner<S: Surface, P: Perception> {
    fn run_battle(&mut self, cockpit: &mut Cockpit<'_, S, P>) -> BattleReport;
}
