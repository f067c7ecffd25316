//! Viewport geometry and named interaction zones
//!
//! Every coordinate in this module is expressed in the canonical 500x815
//! logical viewport of the game client. The table is valid only as a whole:
//! if the rendering surface reports a different size, nothing is rescaled.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// A point in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Linear interpolation towards `to`, `t` in [0, 1]
    pub fn lerp(self, to: Point, t: f64) -> Point {
        let x = self.x as f64 + (to.x - self.x) as f64 * t;
        let y = self.y as f64 + (to.y - self.y) as f64 * t;
        Point::new(x.round() as i32, y.round() as i32)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A map location and where to click it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationZone {
    /// Upper-case name as printed in the popup header
    pub name: String,
    pub point: Point,
}

impl LocationZone {
    pub fn new(name: &str, x: i32, y: i32) -> Self {
        Self {
            name: name.to_string(),
            point: Point::new(x, y),
        }
    }
}

/// Named interaction zones
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Zones {
    /// MAP entry of the bottom navigation bar
    pub map_tab: Point,
    /// Header area that closes a location popup
    pub popup_close: Point,
    /// PLAY button inside a location popup
    pub play_button: Point,
    /// Drop target for dragged cards
    pub enemy_target: Point,
    /// Empty area clicked before a turn starts
    pub neutral: Point,
    /// Safe zones clicked to cancel a stuck gesture
    pub drag_reset: Vec<Point>,
    /// Clicked after every drag so a lingering overlay resolves
    pub drag_confirm: Point,
    /// Single END TURN position used between turns
    pub end_turn: Point,
    /// Redundant END TURN positions tried when a round stalls
    pub end_turn_candidates: Vec<Point>,
    /// Where the result-screen CONTINUE button may sit
    pub continue_candidates: Vec<Point>,
    /// Last-resort CONTINUE click once the retry budget is spent
    pub continue_fallback: Point,
}

impl Default for Zones {
    fn default() -> Self {
        Self {
            map_tab: Point::new(250, 780),
            popup_close: Point::new(250, 82),
            play_button: Point::new(250, 504),
            enemy_target: Point::new(250, 150),
            neutral: Point::new(250, 500),
            drag_reset: vec![Point::new(250, 150), Point::new(250, 400)],
            drag_confirm: Point::new(250, 300),
            end_turn: Point::new(250, 777),
            end_turn_candidates: vec![
                Point::new(400, 750),
                Point::new(420, 760),
                Point::new(380, 740),
                Point::new(250, 777),
            ],
            continue_candidates: vec![
                Point::new(339, 614),
                Point::new(335, 610),
                Point::new(340, 620),
                Point::new(330, 600),
                Point::new(320, 614),
                Point::new(350, 614),
                Point::new(250, 614),
                Point::new(250, 550),
            ],
            continue_fallback: Point::new(339, 614),
        }
    }
}

/// Fixed logical screen size plus every coordinate the automation uses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportGeometry {
    pub width: u32,
    pub height: u32,
    pub zones: Zones,
    /// Map locations in play order (easiest first). The order doubles as the
    /// tie-break when several names are visible in a popup.
    pub locations: Vec<LocationZone>,
}

impl Default for ViewportGeometry {
    fn default() -> Self {
        Self {
            width: 500,
            height: 815,
            zones: Zones::default(),
            locations: vec![
                LocationZone::new("TRAINING", 314, 569),
                LocationZone::new("FOREST", 94, 528),
                LocationZone::new("BRIDGE", 80, 429),
                LocationZone::new("CAVES", 39, 317),
                LocationZone::new("GHOST TOWN", 165, 295),
                LocationZone::new("MOUNTAIN", 38, 198),
                LocationZone::new("CASTLE", 264, 159),
            ],
        }
    }
}

impl ViewportGeometry {
    /// Check the surface size against the canonical viewport
    pub fn check_surface(&self, width: u32, height: u32) -> Result<(), ConfigError> {
        if (width, height) != (self.width, self.height) {
            return Err(ConfigError::ViewportMismatch {
                expected: (self.width, self.height),
                actual: (width, height),
            });
        }
        Ok(())
    }

    /// Location names in priority order
    pub fn location_names(&self) -> impl Iterator<Item = &str> {
        self.locations.iter().map(|l| l.name.as_str())
    }

    pub fn location(&self, name: &str) -> Option<&LocationZone> {
        self.locations.iter().find(|l| l.name == name)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid("viewport size must be non-zero".into()));
        }
        if self.locations.is_empty() {
            return Err(ConfigError::Invalid("no map locations configured".into()));
        }
        let zones = &self.zones;
        if zones.drag_reset.is_empty() {
            return Err(ConfigError::Invalid("drag_reset needs at least one zone".into()));
        }
        if zones.end_turn_candidates.is_empty() {
            return Err(ConfigError::Invalid(
                "end_turn_candidates needs at least one zone".into(),
            ));
        }
        if zones.continue_candidates.is_empty() {
            return Err(ConfigError::Invalid(
                "continue_candidates needs at least one zone".into(),
            ));
        }
        Ok(())
    }
}

/// Largest hand the slot table describes
pub const MAX_HAND_SIZE: u32 = 5;

/// Card slot positions by estimated hand size
///
/// Row `n - 1` holds the drag origins for a hand of `n` cards, left to right.
/// Cards re-center as the hand shrinks, so every size has its own row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotLayout {
    /// Vertical position of the card row
    pub row_y: i32,
    pub by_hand_size: Vec<Vec<i32>>,
}

impl Default for SlotLayout {
    fn default() -> Self {
        Self {
            row_y: 690,
            by_hand_size: vec![
                vec![250],
                vec![220, 290],
                vec![185, 250, 315],
                vec![155, 215, 285, 345],
                vec![130, 190, 250, 310, 370],
            ],
        }
    }
}

impl SlotLayout {
    /// Drag origins for the given hand size, clamped to the defined sizes
    pub fn slots(&self, hand_size: u32) -> Vec<Point> {
        let defined = self.by_hand_size.len().max(1) as u32;
        let idx = hand_size.clamp(1, defined) as usize - 1;
        self.by_hand_size
            .get(idx)
            .map(|row| row.iter().map(|&x| Point::new(x, self.row_y)).collect())
            .unwrap_or_default()
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.by_hand_size.is_empty() {
            return Err(ConfigError::Invalid("slot table is empty".into()));
        }
        if self.by_hand_size.len() > MAX_HAND_SIZE as usize {
            return Err(ConfigError::Invalid(format!(
                "slot table describes {} hand sizes, at most {MAX_HAND_SIZE} supported",
                self.by_hand_size.len()
            )));
        }
        if let Some(size) = self.by_hand_size.iter().position(Vec::is_empty) {
            return Err(ConfigError::Invalid(format!(
                "slot row for hand size {} is empty",
                size + 1
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_lookup_clamps() {
        let layout = SlotLayout::default();

        assert_eq!(layout.slots(0), layout.slots(1));
        assert_eq!(layout.slots(9), layout.slots(5));
        assert_eq!(layout.slots(1), vec![Point::new(250, 690)]);
        assert_eq!(layout.slots(5).len(), 5);
    }

    #[test]
    fn test_slots_are_left_to_right() {
        let layout = SlotLayout::default();

        for size in 1..=5 {
            let xs: Vec<i32> = layout.slots(size).iter().map(|p| p.x).collect();
            assert!(xs.windows(2).all(|w| w[0] < w[1]), "size {size}: {xs:?}");
        }
    }

    #[test]
    fn test_empty_row_rejected() {
        let mut layout = SlotLayout::default();
        layout.by_hand_size[2].clear();
        assert!(layout.validate().is_err());

        layout.by_hand_size.clear();
        assert!(layout.validate().is_err());
    }

    #[test]
    fn test_viewport_mismatch() {
        let geometry = ViewportGeometry::default();

        assert!(geometry.check_surface(500, 815).is_ok());
        match geometry.check_surface(1920, 1080) {
            Err(ConfigError::ViewportMismatch { expected, actual }) => {
                assert_eq!(expected, (500, 815));
                assert_eq!(actual, (1920, 1080));
            }
            other => panic!("expected mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_lerp_is_linear() {
        let from = Point::new(130, 690);
        let to = Point::new(250, 150);

        assert_eq!(from.lerp(to, 0.0), from);
        assert_eq!(from.lerp(to, 1.0), to);
        assert_eq!(from.lerp(to, 0.5), Point::new(190, 420));
    }

    #[test]
    fn test_location_priority_order() {
        let geometry = ViewportGeometry::default();
        let names: Vec<&str> = geometry.location_names().collect();

        assert_eq!(names.first(), Some(&"TRAINING"));
        assert_eq!(names.last(), Some(&"CASTLE"));
        assert_eq!(geometry.location("CAVES").map(|l| l.point), Some(Point::new(39, 317)));
    }
}
