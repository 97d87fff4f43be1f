//! Conductor Messages
//!
//! Messages sent from the Conductor to a surface. Phrase positions and
//! opacity change every frame, so they are pulled through
//! [`Conductor::phrases`](crate::Conductor::phrases) rather than pushed;
//! these messages carry the discrete changes a surface may want to react to.

use serde::{Deserialize, Serialize};

use crate::activity::ActivityState;
use crate::phrase::{PhraseId, PhraseOrigin};

/// Messages from Conductor to a surface
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ConductorMessage {
    // ============================================
    // Phrases
    // ============================================
    /// A phrase was placed
    PhraseAdded {
        /// New phrase id
        id: PhraseId,
        /// Live or generated
        origin: PhraseOrigin,
        /// Number of lines in the block
        lines: usize,
    },

    /// A phrase finished fading out and was removed
    PhraseRemoved {
        /// Removed phrase id
        id: PhraseId,
    },

    /// No free area was found; the block was dropped
    PlacementFailed {
        /// Origin of the dropped block
        origin: PhraseOrigin,
        /// Number of lines in the dropped block
        line_count: usize,
    },

    // ============================================
    // State
    // ============================================
    /// Listening / idle state changed
    ActivityChanged {
        /// New state
        state: ActivityState,
    },

    /// A recognition window opened or closed
    Recognition {
        /// Whether the speech source is listening
        listening: bool,
    },

    /// Fullscreen mode changed
    Fullscreen {
        /// New fullscreen flag
        enabled: bool,
    },

    /// The surface should shut down
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_serialization() {
        let msg = ConductorMessage::ActivityChanged {
            state: ActivityState::SilentScenario1,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("silent_scenario1"));
        let parsed: ConductorMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, msg);
    }
}
