//! Surface Events
//!
//! Events sent from a surface to the Conductor. Surfaces forward what
//! happened (a key press, a transcript from an external recogniser) and the
//! Conductor decides what it means.

use serde::{Deserialize, Serialize};

/// Events from a surface to the Conductor
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceEvent {
    // ============================================
    // Speech
    // ============================================
    /// A transcript delivered by the surface instead of the speech source
    Utterance {
        /// Recognised text, possibly empty
        text: String,
    },

    /// Restart the recognition window now
    RestartRecognition,

    // ============================================
    // Display
    // ============================================
    /// Flip fullscreen mode
    ToggleFullscreen,

    /// User asked to quit
    QuitRequested,
}

impl SurfaceEvent {
    /// Create an utterance event
    pub fn utterance(text: impl Into<String>) -> Self {
        Self::Utterance { text: text.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = SurfaceEvent::utterance("привет мир");
        let json = serde_json::to_string(&event).unwrap();
        let parsed: SurfaceEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }
}
