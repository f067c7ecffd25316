//! Pointer gesture generation
//!
//! Turns semantic actions (click a zone, drag a card onto the enemy) into
//! move/press/release sequences on the [`Surface`]. Gestures never return
//! errors to their caller: a failed gesture is reported as `false` after the
//! pointer has been reset, and the caller's retry policy decides what next.

use crate::config::{Point, Settings};
use crate::surface::{PointerAction, Surface, SurfaceError};

/// Intermediate moves between drag origin and destination
pub const DRAG_STEPS: u32 = 15;

/// Stages of a drag, used to label failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    /// Move onto the card
    Approach,
    /// Press the button
    Press,
    /// Interpolated moves towards the target
    Sweep,
    /// Rest on the target
    Hold,
    /// Let go
    Release,
    /// Click the neutral confirm zone
    Confirm,
}

/// A drag stage that could not be dispatched
#[derive(Debug, thiserror::Error)]
#[error("Drag failed during {phase:?}: {source}")]
pub struct GestureError {
    pub phase: DragPhase,
    #[source]
    pub source: SurfaceError,
}

trait InPhase<T> {
    fn in_phase(self, phase: DragPhase) -> Result<T, GestureError>;
}

impl<T> InPhase<T> for Result<T, SurfaceError> {
    fn in_phase(self, phase: DragPhase) -> Result<T, GestureError> {
        self.map_err(|source| GestureError { phase, source })
    }
}

/// Executes clicks and drags, tracking whether the button is down
pub struct GestureExecutor<'a, S: Surface> {
    surface: &'a S,
    settings: &'a Settings,
    button_held: bool,
}

impl<'a, S: Surface> GestureExecutor<'a, S> {
    /// Create a gesture executor over a surface
    pub fn new(surface: &'a S, settings: &'a Settings) -> Self {
        Self {
            surface,
            settings,
            button_held: false,
        }
    }

    pub fn surface(&self) -> &'a S {
        self.surface
    }

    /// Whether a press is outstanding
    pub fn button_held(&self) -> bool {
        self.button_held
    }

    /// Settle delay on the underlying surface
    pub fn pause(&self, ms: u64) {
        self.surface.pause(ms);
    }

    /// Single click at a point
    pub fn click(&mut self, at: Point) -> bool {
        match self.try_click(at) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Click at {} failed: {}", at, e);
                self.reset();
                false
            }
        }
    }

    /// Click every candidate in order, pausing `gap_ms` after each
    ///
    /// Returns how many clicks were dispatched.
    pub fn click_each(&mut self, candidates: &[Point], gap_ms: u64) -> usize {
        let mut dispatched = 0;
        for &point in candidates {
            if self.click(point) {
                dispatched += 1;
            }
            self.pause(gap_ms);
        }
        dispatched
    }

    /// Release any held button, then click the safe zones
    ///
    /// Cancels a gesture the UI may still consider in progress.
    pub fn reset(&mut self) {
        let settings = self.settings;
        self.release_if_held();
        for &point in &settings.geometry.zones.drag_reset {
            if let Err(e) = self.try_click(point) {
                log::debug!("Reset click at {} failed: {}", point, e);
                self.release_if_held();
            }
            self.pause(settings.timings.reset_click_gap);
        }
    }

    /// Drag from `from` to `to`
    ///
    /// Returns whether the gesture was dispatched in full. That says nothing
    /// about whether the game accepted it.
    pub fn drag(&mut self, from: Point, to: Point) -> bool {
        self.reset();
        self.pause(self.settings.timings.pre_drag);

        match self.drag_sequence(from, to) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("{} (from {} to {})", e, from, to);
                self.reset();
                false
            }
        }
    }

    fn drag_sequence(&mut self, from: Point, to: Point) -> Result<(), GestureError> {
        let settings = self.settings;
        let timings = &settings.timings;

        self.surface
            .pointer(PointerAction::Move(from))
            .in_phase(DragPhase::Approach)?;
        self.pause(timings.approach);

        self.press().in_phase(DragPhase::Press)?;
        self.pause(timings.press);

        // Linear sweep; a single jump reads as a mis-click to the client
        for step in 1..=DRAG_STEPS {
            let at = from.lerp(to, step as f64 / DRAG_STEPS as f64);
            self.surface
                .pointer(PointerAction::Move(at))
                .in_phase(DragPhase::Sweep)?;
            self.pause(timings.sweep_step);
        }

        self.surface
            .pointer(PointerAction::Move(to))
            .in_phase(DragPhase::Hold)?;
        self.pause(timings.hold);

        self.release().in_phase(DragPhase::Release)?;
        self.pause(timings.release_animation);

        self.try_click(settings.geometry.zones.drag_confirm).in_phase(DragPhase::Confirm)?;
        self.pause(timings.confirm);

        Ok(())
    }

    fn try_click(&mut self, at: Point) -> Result<(), SurfaceError> {
        self.surface.pointer(PointerAction::Move(at))?;
        self.press()?;
        self.release()
    }

    fn press(&mut self) -> Result<(), SurfaceError> {
        self.surface.pointer(PointerAction::Press)?;
        self.button_held = true;
        Ok(())
    }

    fn release(&mut self) -> Result<(), SurfaceError> {
        self.surface.pointer(PointerAction::Release)?;
        self.button_held = false;
        Ok(())
    }

    fn release_if_held(&mut self) {
        if self.button_held {
            if let Err(e) = self.release() {
                log::warn!("Could not release pointer: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeSurface;

    const CARD: Point = Point::new(130, 690);
    const ENEMY: Point = Point::new(250, 150);

    fn moves(events: &[PointerAction]) -> Vec<Point> {
        events
            .iter()
            .filter_map(|e| match e {
                PointerAction::Move(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_click_sequence() {
        let surface = FakeSurface::new();
        let settings = Settings::default();
        let mut gestures = GestureExecutor::new(&surface, &settings);

        assert!(gestures.click(Point::new(250, 504)));
        assert_eq!(
            surface.events(),
            vec![
                PointerAction::Move(Point::new(250, 504)),
                PointerAction::Press,
                PointerAction::Release,
            ]
        );
        assert!(!surface.held());
    }

    #[test]
    fn test_drag_sweeps_linearly() {
        let surface = FakeSurface::new();
        let settings = Settings::default();
        let mut gestures = GestureExecutor::new(&surface, &settings);

        assert!(gestures.drag(CARD, ENEMY));
        assert!(!surface.held());

        let events = surface.events();
        let press_at = events
            .iter()
            .enumerate()
            .filter(|(_, e)| **e == PointerAction::Press)
            .map(|(i, _)| i)
            .collect::<Vec<_>>();
        // Two reset clicks, the card press, the confirm click
        assert_eq!(press_at.len(), 4);
        assert_eq!(surface.presses()[2], CARD);

        let sweep = moves(&events[press_at[2]..press_at[3]]);
        // 15 interpolated steps, the hold move, the confirm move
        assert_eq!(sweep.len(), DRAG_STEPS as usize + 2);
        assert_eq!(sweep[0], CARD.lerp(ENEMY, 1.0 / 15.0));
        assert_eq!(sweep[DRAG_STEPS as usize - 1], ENEMY);
        assert_eq!(sweep[DRAG_STEPS as usize], ENEMY);
        assert_eq!(sweep[DRAG_STEPS as usize + 1], settings.geometry.zones.drag_confirm);

        let ys: Vec<i32> = sweep[..DRAG_STEPS as usize].iter().map(|p| p.y).collect();
        assert!(ys.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_drag_settle_budget() {
        let surface = FakeSurface::new();
        let settings = Settings::default();
        let mut gestures = GestureExecutor::new(&surface, &settings);
        let t = &settings.timings;

        assert!(gestures.drag(CARD, ENEMY));
        let reset = t.reset_click_gap * settings.geometry.zones.drag_reset.len() as u64;
        let expected = reset
            + t.pre_drag
            + t.approach
            + t.press
            + t.sweep_step * DRAG_STEPS as u64
            + t.hold
            + t.release_animation
            + t.confirm;
        assert_eq!(surface.paused_ms(), expected);
    }

    #[test]
    fn test_drag_fault_in_every_phase_leaves_button_released() {
        let settings = Settings::default();
        let reset_calls = 3 * settings.geometry.zones.drag_reset.len();
        let steps = DRAG_STEPS as usize;
        let phases = [
            (DragPhase::Approach, reset_calls),
            (DragPhase::Press, reset_calls + 1),
            (DragPhase::Sweep, reset_calls + 2 + steps / 2),
            (DragPhase::Hold, reset_calls + 2 + steps),
            (DragPhase::Release, reset_calls + 3 + steps),
        ];

        for (phase, call) in phases {
            let surface = FakeSurface::new();
            surface.fail_pointer_call(call);
            let mut gestures = GestureExecutor::new(&surface, &settings);

            assert!(!gestures.drag(CARD, ENEMY), "{phase:?} should fail");
            assert!(!surface.held(), "{phase:?} left the button down");
            assert!(!gestures.button_held(), "{phase:?} left the executor pressed");
        }
    }

    #[test]
    fn test_failed_release_is_retried_by_reset() {
        let surface = FakeSurface::new();
        let settings = Settings::default();
        let mut gestures = GestureExecutor::new(&surface, &settings);

        // Move, Press, Release(fails)
        surface.fail_pointer_call(2);
        assert!(!gestures.click(Point::new(10, 10)));
        assert!(!surface.held());
        assert!(!gestures.button_held());
    }

    #[test]
    fn test_click_each_tries_all_candidates() {
        let surface = FakeSurface::new();
        let settings = Settings::default();
        let mut gestures = GestureExecutor::new(&surface, &settings);
        let candidates = settings.geometry.zones.end_turn_candidates.clone();

        let dispatched = gestures.click_each(&candidates, 200);
        assert_eq!(dispatched, candidates.len());
        assert_eq!(surface.presses(), candidates);
    }
}
