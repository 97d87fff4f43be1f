//! Canvas Geometry and Placement
//!
//! Phrases live on a fixed-size logical canvas (1920×1080 by default)
//! regardless of the surface that eventually draws them. This module tracks
//! which rectangles of that canvas are occupied and finds free spots for new
//! text blocks.
//!
//! - [`SpatialIndex`]: the set of occupied rectangles
//! - [`PlacementEngine`]: bounded random sampling against the index

mod placement;
mod spatial;

use serde::{Deserialize, Serialize};

pub use placement::{Placement, PlacementEngine, PlacementError, DEFAULT_MAX_ATTEMPTS};
pub use spatial::{Reservation, ReservationId, SpatialIndex};

/// Dimensions of the logical canvas and of the blocks placed on it
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanvasGeometry {
    /// Canvas width in canvas units
    pub width: f32,
    /// Canvas height in canvas units
    pub height: f32,
    /// Keep-out border on every side; anchors never land inside it
    pub margin: f32,
    /// Fixed width of every text block
    pub block_width: f32,
    /// Vertical extent of one line of a block
    pub line_height: f32,
}

impl Default for CanvasGeometry {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
            margin: 100.0,
            block_width: 100.0,
            line_height: 30.0,
        }
    }
}

impl CanvasGeometry {
    /// Create geometry for a canvas of the given size with default block metrics
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Height of a block with `line_count` lines
    #[must_use]
    pub fn block_height(&self, line_count: usize) -> f32 {
        line_count as f32 * self.line_height
    }

    /// Inclusive range of valid anchor x coordinates
    #[must_use]
    pub fn x_range(&self) -> (f32, f32) {
        (self.margin, self.width - self.margin)
    }

    /// Inclusive range of valid anchor y coordinates
    #[must_use]
    pub fn y_range(&self) -> (f32, f32) {
        (self.margin, self.height - self.margin)
    }

    /// Whether an anchor lies inside the placeable region
    #[must_use]
    pub fn contains_anchor(&self, x: f32, y: f32) -> bool {
        let (x_min, x_max) = self.x_range();
        let (y_min, y_max) = self.y_range();
        (x_min..=x_max).contains(&x) && (y_min..=y_max).contains(&y)
    }
}
