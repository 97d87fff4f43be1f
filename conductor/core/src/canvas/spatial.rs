//! Occupied-area index
//!
//! Every visible phrase owns exactly one rectangle in the [`SpatialIndex`].
//! Rectangles are keyed by a monotonically increasing [`ReservationId`] so
//! releasing one never disturbs the handles held by other phrases.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Opaque handle to one occupied rectangle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReservationId(u64);

impl ReservationId {
    /// Raw numeric value, mostly useful for logging
    #[must_use]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ReservationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "res-{}", self.0)
    }
}

/// An occupied rectangle anchored at its top-left corner
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width of the rectangle
    pub width: f32,
    /// Height of the rectangle
    pub height: f32,
}

impl Reservation {
    /// Strict axis-aligned box overlap; touching edges do not count
    #[must_use]
    pub fn intersects(&self, x: f32, y: f32, width: f32, height: f32) -> bool {
        x < self.x + self.width
            && x + width > self.x
            && y < self.y + self.height
            && y + height > self.y
    }
}

/// Set of occupied rectangles on the canvas
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    reservations: HashMap<ReservationId, Reservation>,
    next_id: u64,
    block_width: f32,
    line_height: f32,
}

impl SpatialIndex {
    /// Create an empty index for blocks of the given width and line height
    #[must_use]
    pub fn new(block_width: f32, line_height: f32) -> Self {
        Self {
            reservations: HashMap::new(),
            next_id: 0,
            block_width,
            line_height,
        }
    }

    /// Record a new occupied rectangle and return its handle
    pub fn reserve(&mut self, x: f32, y: f32, height: f32) -> ReservationId {
        let id = ReservationId(self.next_id);
        self.next_id += 1;
        self.reservations.insert(
            id,
            Reservation {
                x,
                y,
                width: self.block_width,
                height,
            },
        );
        tracing::trace!(reservation = %id, x, y, height, "Reserved canvas area");
        id
    }

    /// Remove exactly the rectangle behind `id`
    ///
    /// Returns `false` when the handle was already released.
    pub fn release(&mut self, id: ReservationId) -> bool {
        let removed = self.reservations.remove(&id).is_some();
        if removed {
            tracing::trace!(reservation = %id, "Released canvas area");
        }
        removed
    }

    /// Whether a block of `line_count` lines anchored at `(x, y)` would
    /// intersect any current reservation
    #[must_use]
    pub fn overlaps(&self, x: f32, y: f32, line_count: usize) -> bool {
        let height = line_count as f32 * self.line_height;
        self.reservations
            .values()
            .any(|r| r.intersects(x, y, self.block_width, height))
    }

    /// Look up a reservation
    #[must_use]
    pub fn get(&self, id: ReservationId) -> Option<&Reservation> {
        self.reservations.get(&id)
    }

    /// Number of live reservations
    #[must_use]
    pub fn len(&self) -> usize {
        self.reservations.len()
    }

    /// Whether nothing is reserved
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reservations.is_empty()
    }

    /// Iterate over all live reservations
    pub fn iter(&self) -> impl Iterator<Item = (ReservationId, &Reservation)> {
        self.reservations.iter().map(|(id, r)| (*id, r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> SpatialIndex {
        SpatialIndex::new(100.0, 30.0)
    }

    #[test]
    fn test_reserve_returns_distinct_ids() {
        let mut idx = index();
        let a = idx.reserve(100.0, 100.0, 30.0);
        let b = idx.reserve(400.0, 100.0, 30.0);
        assert_ne!(a, b);
        assert_eq!(idx.len(), 2);
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut idx = index();
        let a = idx.reserve(100.0, 100.0, 30.0);
        assert!(idx.release(a));
        assert!(!idx.release(a));
        assert!(idx.is_empty());
    }

    #[test]
    fn test_release_keeps_other_handles_valid() {
        let mut idx = index();
        let a = idx.reserve(100.0, 100.0, 30.0);
        let b = idx.reserve(300.0, 100.0, 30.0);
        let c = idx.reserve(500.0, 100.0, 30.0);

        idx.release(a);

        // b and c still name their own rectangles after a is gone
        assert!((idx.get(b).map(|r| r.x).unwrap_or_default() - 300.0).abs() < f32::EPSILON);
        assert!(idx.release(c));
        assert!(idx.overlaps(300.0, 100.0, 1));
        assert!(!idx.overlaps(500.0, 100.0, 1));
    }

    #[test]
    fn test_overlap_predicate() {
        let mut idx = index();
        idx.reserve(200.0, 200.0, 60.0);

        assert!(idx.overlaps(200.0, 200.0, 1));
        assert!(idx.overlaps(250.0, 230.0, 1));
        assert!(idx.overlaps(150.0, 180.0, 1));
        // Touching edges are not overlaps
        assert!(!idx.overlaps(300.0, 200.0, 1));
        assert!(!idx.overlaps(100.0, 200.0, 1));
        assert!(!idx.overlaps(200.0, 260.0, 1));
        assert!(!idx.overlaps(200.0, 170.0, 1));
    }

    #[test]
    fn test_candidate_height_uses_line_count() {
        let mut idx = index();
        idx.reserve(200.0, 300.0, 30.0);

        // One line from y=250 ends at 280, clear of 300
        assert!(!idx.overlaps(200.0, 250.0, 1));
        // Three lines from y=250 reach 340
        assert!(idx.overlaps(200.0, 250.0, 3));
    }

    #[test]
    fn test_empty_index_never_overlaps() {
        let idx = index();
        assert!(!idx.overlaps(500.0, 500.0, 10));
    }
}
