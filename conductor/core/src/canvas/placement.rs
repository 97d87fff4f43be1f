//! Bounded random placement
//!
//! Placement is approximate by nature: the engine samples anchors uniformly
//! inside the margins and commits the first one that does not collide. A
//! crowded canvas may report [`PlacementError::NoRoomFound`] even though a
//! free spot exists.

use rand::Rng;
use thiserror::Error;

use super::{CanvasGeometry, ReservationId, SpatialIndex};

/// Default number of samples before giving up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;

/// Reasons a block could not be placed
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlacementError {
    /// Every sampled anchor collided with an existing reservation
    #[error("no free area found after {attempts} attempts")]
    NoRoomFound {
        /// Number of anchors tried
        attempts: u32,
    },

    /// A block with zero lines has nothing to place
    #[error("cannot place an empty block")]
    EmptyBlock,
}

/// A committed placement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Anchor x
    pub x: f32,
    /// Anchor y
    pub y: f32,
    /// Reservation now held for the block
    pub reservation: ReservationId,
}

/// Finds free anchors for text blocks
#[derive(Debug, Clone)]
pub struct PlacementEngine {
    geometry: CanvasGeometry,
    max_attempts: u32,
}

impl PlacementEngine {
    /// Create an engine for the given canvas
    #[must_use]
    pub fn new(geometry: CanvasGeometry, max_attempts: u32) -> Self {
        Self {
            geometry,
            max_attempts,
        }
    }

    /// Canvas this engine places onto
    #[must_use]
    pub fn geometry(&self) -> &CanvasGeometry {
        &self.geometry
    }

    /// Attempt budget per placement
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Find a free anchor for `line_count` lines and reserve it
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::EmptyBlock`] for `line_count == 0` and
    /// [`PlacementError::NoRoomFound`] when the attempt budget runs out.
    pub fn place<R: Rng + ?Sized>(
        &self,
        index: &mut SpatialIndex,
        line_count: usize,
        rng: &mut R,
    ) -> Result<Placement, PlacementError> {
        if line_count == 0 {
            return Err(PlacementError::EmptyBlock);
        }

        let (x_min, x_max) = self.geometry.x_range();
        let (y_min, y_max) = self.geometry.y_range();

        for _ in 0..self.max_attempts {
            let x = sample(rng, x_min, x_max);
            let y = sample(rng, y_min, y_max);

            if !index.overlaps(x, y, line_count) {
                let height = self.geometry.block_height(line_count);
                let reservation = index.reserve(x, y, height);
                return Ok(Placement { x, y, reservation });
            }
        }

        Err(PlacementError::NoRoomFound {
            attempts: self.max_attempts,
        })
    }
}

/// Uniform sample from `[lo, hi]`, collapsing to `lo` for a degenerate range
fn sample<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.gen_range(lo..=hi)
    } else {
        lo
    }
}
