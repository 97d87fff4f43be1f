//! Phrases and the phrase store
//!
//! A [`Phrase`] is a placed block of text lines with an opacity that the
//! [`LifecycleScheduler`](crate::lifecycle::LifecycleScheduler) decays every
//! frame. The [`PhraseStore`] keeps phrases in insertion order (oldest at
//! index 0) and owns the [`SpatialIndex`] their reservations live in, so a
//! phrase and its rectangle are always added and removed together.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::canvas::{CanvasGeometry, PlacementEngine, PlacementError, ReservationId, SpatialIndex};

/// Opacity of a freshly placed phrase
pub const FULL_OPACITY: f32 = 255.0;

/// Default number of phrases kept before the oldest starts fading out
pub const DEFAULT_CAPACITY: usize = 30;

/// Unique identifier for a phrase
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PhraseId(pub u64);

impl std::fmt::Display for PhraseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "phrase-{}", self.0)
    }
}

/// Where a phrase's text came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhraseOrigin {
    /// Transcribed speech
    Live,
    /// Poetic reply or idle filler
    Generated,
}

impl PhraseOrigin {
    /// How the renderer aligns text of this origin against the anchor
    #[must_use]
    pub fn alignment(self) -> Alignment {
        match self {
            Self::Live => Alignment::Left,
            Self::Generated => Alignment::Right,
        }
    }
}

/// Horizontal text alignment relative to the anchor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    /// Text starts at the anchor
    Left,
    /// Text ends at the anchor
    Right,
}

/// A block of text lines placed on the canvas
#[derive(Clone, Debug, PartialEq)]
pub struct Phrase {
    /// Stable identifier
    pub id: PhraseId,
    /// Word-group lines, top to bottom
    pub lines: Vec<String>,
    /// Anchor x
    pub x: f32,
    /// Anchor y
    pub y: f32,
    /// Current opacity in `[0, 255]`
    pub opacity: f32,
    /// Live or generated
    pub origin: PhraseOrigin,
    /// Area held in the spatial index, `None` once released
    pub reservation: Option<ReservationId>,
}

/// Render-ready snapshot of a phrase
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhraseView {
    /// Phrase this view was taken from
    pub id: PhraseId,
    /// Lower-cased lines, truncated to the renderer's limit
    pub lines: Vec<String>,
    /// Anchor x, rounded to whole canvas units
    pub x: i32,
    /// Anchor y, rounded to whole canvas units
    pub y: i32,
    /// Opacity as an 8-bit channel value
    pub opacity: u8,
    /// Text alignment against the anchor
    pub alignment: Alignment,
    /// Live or generated
    pub origin: PhraseOrigin,
}

impl Phrase {
    /// Snapshot for the renderer
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn view(&self, max_lines: usize) -> PhraseView {
        PhraseView {
            id: self.id,
            lines: self
                .lines
                .iter()
                .take(max_lines)
                .map(|line| line.to_lowercase())
                .collect(),
            x: self.x.round() as i32,
            y: self.y.round() as i32,
            opacity: self.opacity.clamp(0.0, FULL_OPACITY).round() as u8,
            alignment: self.origin.alignment(),
            origin: self.origin,
        }
    }
}

/// Ordered collection of visible phrases
#[derive(Debug)]
pub struct PhraseStore {
    phrases: Vec<Phrase>,
    index: SpatialIndex,
    placement: PlacementEngine,
    capacity: usize,
    next_id: u64,
}

impl PhraseStore {
    /// Create an empty store on the given canvas
    #[must_use]
    pub fn new(geometry: CanvasGeometry, max_attempts: u32, capacity: usize) -> Self {
        Self {
            phrases: Vec::new(),
            index: SpatialIndex::new(geometry.block_width, geometry.line_height),
            placement: PlacementEngine::new(geometry, max_attempts),
            capacity,
            next_id: 1,
        }
    }

    /// Place a block and, on success, append it at full opacity
    ///
    /// # Errors
    ///
    /// Propagates [`PlacementError`]; the store is unchanged on failure.
    pub fn add<R: Rng + ?Sized>(
        &mut self,
        lines: Vec<String>,
        origin: PhraseOrigin,
        rng: &mut R,
    ) -> Result<PhraseId, PlacementError> {
        let placement = self.placement.place(&mut self.index, lines.len(), rng)?;

        let id = PhraseId(self.next_id);
        self.next_id += 1;

        self.phrases.push(Phrase {
            id,
            lines,
            x: placement.x,
            y: placement.y,
            opacity: FULL_OPACITY,
            origin,
            reservation: Some(placement.reservation),
        });

        Ok(id)
    }

    /// Whether the store holds more phrases than its capacity
    #[must_use]
    pub fn is_over_capacity(&self) -> bool {
        self.phrases.len() > self.capacity
    }

    /// Capacity threshold
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Remove the oldest phrase and release its reservation
    pub fn remove_oldest(&mut self) -> Option<Phrase> {
        if self.phrases.is_empty() {
            return None;
        }
        let mut phrase = self.phrases.remove(0);
        if let Some(reservation) = phrase.reservation.take() {
            self.index.release(reservation);
        }
        Some(phrase)
    }

    /// Phrases oldest first
    #[must_use]
    pub fn phrases(&self) -> &[Phrase] {
        &self.phrases
    }

    pub(crate) fn phrases_mut(&mut self) -> &mut [Phrase] {
        &mut self.phrases
    }

    /// Iterate phrases oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Phrase> {
        self.phrases.iter()
    }

    /// Look up a phrase by id
    #[must_use]
    pub fn get(&self, id: PhraseId) -> Option<&Phrase> {
        self.phrases.iter().find(|p| p.id == id)
    }

    /// Render snapshots, oldest first
    #[must_use]
    pub fn views(&self, max_lines: usize) -> Vec<PhraseView> {
        self.phrases.iter().map(|p| p.view(max_lines)).collect()
    }

    /// Number of phrases
    #[must_use]
    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    /// Whether the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// The occupied-area index backing this store
    #[must_use]
    pub fn spatial_index(&self) -> &SpatialIndex {
        &self.index
    }

    /// The placement engine backing this store
    #[must_use]
    pub fn placement(&self) -> &PlacementEngine {
        &self.placement
    }
}
