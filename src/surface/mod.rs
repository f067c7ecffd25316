//! Rendering surface contract
//!
//! The automation core only needs a handful of primitives from its host:
//! read the visible text, list interactive element labels, drive a single
//! pointer, and navigate. Everything else is built on top of this trait.

#[cfg(feature = "browser")]
pub mod chrome;

use std::time::Duration;

use crate::config::Point;

/// A low-level pointer operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    /// Move the pointer to a viewport position
    Move(Point),
    /// Press the primary button at the current position
    Press,
    /// Release the primary button at the current position
    Release,
}

/// Host environment the automation runs against
///
/// Methods take `&self` so that perception and gestures can share one
/// surface; implementations keep any mutable state behind interior
/// mutability.
pub trait Surface {
    /// Current logical viewport size (width, height)
    fn viewport(&self) -> Result<(u32, u32), SurfaceError>;

    /// Full visible text of the current view
    fn visible_text(&self) -> Result<String, SurfaceError>;

    /// Text labels of interactive elements
    fn element_labels(&self) -> Result<Vec<String>, SurfaceError>;

    /// Dispatch one pointer operation
    fn pointer(&self, action: PointerAction) -> Result<(), SurfaceError>;

    /// Activate the first element whose text contains `needle`
    ///
    /// Returns whether such an element was found.
    fn activate_text(&self, needle: &str) -> Result<bool, SurfaceError>;

    /// Navigate to an address and wait until the page is stable
    fn navigate(&self, url: &str) -> Result<(), SurfaceError>;

    /// Settle delay
    fn pause(&self, ms: u64) {
        if ms > 0 {
            std::thread::sleep(Duration::from_millis(ms));
        }
    }
}

/// Surface errors
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("Backend failure: {0}")]
    Backend(String),
    #[error("Page script failed: {0}")]
    Script(String),
    #[error("Rendering surface is gone")]
    Closed,
}
