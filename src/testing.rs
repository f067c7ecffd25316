//! Test doubles shared by the unit tests
//!
//! `FakeSurface` records every pointer operation and can fail one chosen
//! call. `ScriptedPerception` answers perception queries from closures.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::Point;
use crate::game::{BattlePhase, PopupState};
use crate::perception::Perception;
use crate::surface::{PointerAction, Surface, SurfaceError};

#[derive(Debug)]
pub struct FakeState {
    pub viewport: (u32, u32),
    pub text: String,
    pub labels: Vec<String>,
    pub fail_reads: bool,
    pub cursor: Point,
    pub held: bool,
    pub events: Vec<PointerAction>,
    /// Cursor position at every successful press
    pub presses: Vec<Point>,
    pub pointer_calls: usize,
    /// Zero-based pointer call that fails once
    pub fail_call: Option<usize>,
    pub activated: Vec<String>,
    pub paused_ms: u64,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            viewport: (500, 815),
            text: String::new(),
            labels: Vec::new(),
            fail_reads: false,
            cursor: Point::new(0, 0),
            held: false,
            events: Vec::new(),
            presses: Vec::new(),
            pointer_calls: 0,
            fail_call: None,
            activated: Vec::new(),
            paused_ms: 0,
        }
    }
}

/// In-memory surface; pauses return immediately
#[derive(Debug, Default)]
pub struct FakeSurface {
    state: Rc<RefCell<FakeState>>,
}

impl FakeSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle for closures that need to look at the surface
    pub fn handle(&self) -> Rc<RefCell<FakeState>> {
        Rc::clone(&self.state)
    }

    pub fn show(&self, text: &str, labels: &[&str]) {
        let mut state = self.state.borrow_mut();
        state.text = text.to_string();
        state.labels = labels.iter().map(|s| s.to_string()).collect();
    }

    pub fn fail_reads(&self, fail: bool) {
        self.state.borrow_mut().fail_reads = fail;
    }

    pub fn fail_pointer_call(&self, call: usize) {
        self.state.borrow_mut().fail_call = Some(call);
    }

    pub fn set_viewport(&self, width: u32, height: u32) {
        self.state.borrow_mut().viewport = (width, height);
    }

    pub fn held(&self) -> bool {
        self.state.borrow().held
    }

    pub fn presses(&self) -> Vec<Point> {
        self.state.borrow().presses.clone()
    }

    pub fn presses_at(&self, point: Point) -> usize {
        self.state.borrow().presses.iter().filter(|p| **p == point).count()
    }

    pub fn events(&self) -> Vec<PointerAction> {
        self.state.borrow().events.clone()
    }

    pub fn pointer_calls(&self) -> usize {
        self.state.borrow().pointer_calls
    }

    pub fn activated(&self) -> Vec<String> {
        self.state.borrow().activated.clone()
    }

    /// Total settle time requested so far
    pub fn paused_ms(&self) -> u64 {
        self.state.borrow().paused_ms
    }
}

impl Surface for FakeSurface {
    fn viewport(&self) -> Result<(u32, u32), SurfaceError> {
        Ok(self.state.borrow().viewport)
    }

    fn visible_text(&self) -> Result<String, SurfaceError> {
        let state = self.state.borrow();
        if state.fail_reads {
            return Err(SurfaceError::Script("injected read failure".into()));
        }
        Ok(state.text.clone())
    }

    fn element_labels(&self) -> Result<Vec<String>, SurfaceError> {
        let state = self.state.borrow();
        if state.fail_reads {
            return Err(SurfaceError::Script("injected read failure".into()));
        }
        Ok(state.labels.clone())
    }

    fn pointer(&self, action: PointerAction) -> Result<(), SurfaceError> {
        let mut state = self.state.borrow_mut();
        let call = state.pointer_calls;
        state.pointer_calls += 1;
        if state.fail_call == Some(call) {
            state.fail_call = None;
            return Err(SurfaceError::Backend(format!("injected fault at call {call}")));
        }

        match action {
            PointerAction::Move(point) => state.cursor = point,
            PointerAction::Press => {
                state.held = true;
                let at = state.cursor;
                state.presses.push(at);
            }
            PointerAction::Release => state.held = false,
        }
        state.events.push(action);
        Ok(())
    }

    fn activate_text(&self, needle: &str) -> Result<bool, SurfaceError> {
        let mut state = self.state.borrow_mut();
        state.activated.push(needle.to_string());
        Ok(state.text.to_uppercase().contains(needle))
    }

    fn navigate(&self, _url: &str) -> Result<(), SurfaceError> {
        Ok(())
    }

    fn pause(&self, ms: u64) {
        self.state.borrow_mut().paused_ms += ms;
    }
}

pub const ACTIVE: BattlePhase = BattlePhase {
    player_turn: true,
    battle_over: false,
};

pub const OVER: BattlePhase = BattlePhase {
    player_turn: false,
    battle_over: true,
};

pub const WAITING: BattlePhase = BattlePhase {
    player_turn: false,
    battle_over: false,
};

/// Perception answering from closures, counting every query
pub struct ScriptedPerception {
    popup: Box<dyn FnMut() -> PopupState>,
    phase: Box<dyn FnMut() -> BattlePhase>,
    hit_points: Box<dyn FnMut() -> Option<u32>>,
    result_screen: Box<dyn FnMut() -> bool>,
    pub phase_reads: usize,
    pub hit_point_reads: usize,
    pub result_reads: usize,
}

impl ScriptedPerception {
    /// Active battle, unknown hit points, no popup, no result screen
    pub fn new() -> Self {
        Self {
            popup: Box::new(PopupState::closed),
            phase: Box::new(|| ACTIVE),
            hit_points: Box::new(|| None),
            result_screen: Box::new(|| false),
            phase_reads: 0,
            hit_point_reads: 0,
            result_reads: 0,
        }
    }

    pub fn with_popup(mut self, f: impl FnMut() -> PopupState + 'static) -> Self {
        self.popup = Box::new(f);
        self
    }

    pub fn with_phase(mut self, f: impl FnMut() -> BattlePhase + 'static) -> Self {
        self.phase = Box::new(f);
        self
    }

    pub fn with_hit_points(mut self, f: impl FnMut() -> Option<u32> + 'static) -> Self {
        self.hit_points = Box::new(f);
        self
    }

    pub fn with_result_screen(mut self, f: impl FnMut() -> bool + 'static) -> Self {
        self.result_screen = Box::new(f);
        self
    }

    /// Hit points read from a fixed script, repeating the last entry
    pub fn with_hit_point_script(self, script: Vec<Option<u32>>) -> Self {
        let mut idx = 0;
        self.with_hit_points(move || {
            let value = script.get(idx).or(script.last()).copied().flatten();
            idx += 1;
            value
        })
    }
}

impl Perception for ScriptedPerception {
    fn popup(&mut self) -> PopupState {
        (self.popup)()
    }

    fn battle_phase(&mut self) -> BattlePhase {
        self.phase_reads += 1;
        (self.phase)()
    }

    fn monster_hit_points(&mut self) -> Option<u32> {
        self.hit_point_reads += 1;
        (self.hit_points)()
    }

    fn result_screen_visible(&mut self) -> bool {
        self.result_reads += 1;
        (self.result_screen)()
    }
}
