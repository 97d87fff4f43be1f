//! Display State
//!
//! What the status line shows, derived from [`ConductorMessage`]s. Phrase
//! positions are pulled from the conductor each frame and are not kept
//! here.

use murmur_core::{ActivityState, ConductorMessage, PhraseOrigin};

/// Surface-side view of the conductor's discrete state
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DisplayState {
    /// Current activity
    pub activity: ActivityState,
    /// Whether a recognition window is open
    pub listening: bool,
    /// Whether the frame and status line are hidden
    pub fullscreen: bool,
    /// Phrases placed since start
    pub placed: u64,
    /// Replies and idle blocks placed since start
    pub generated: u64,
    /// Phrases faded out and removed
    pub removed: u64,
    /// Blocks dropped for lack of room
    pub dropped: u64,
    /// The conductor asked the surface to exit
    pub quit: bool,
}

impl DisplayState {
    /// Create an empty display state
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a message from the conductor
    pub fn apply_message(&mut self, msg: ConductorMessage) {
        match msg {
            ConductorMessage::PhraseAdded { origin, .. } => {
                self.placed += 1;
                if origin == PhraseOrigin::Generated {
                    self.generated += 1;
                }
            }
            ConductorMessage::PhraseRemoved { .. } => self.removed += 1,
            ConductorMessage::PlacementFailed { .. } => self.dropped += 1,
            ConductorMessage::ActivityChanged { state } => self.activity = state,
            ConductorMessage::Recognition { listening } => self.listening = listening,
            ConductorMessage::Fullscreen { enabled } => self.fullscreen = enabled,
            ConductorMessage::Quit => self.quit = true,
        }
    }

    /// Short label for the activity state
    pub fn activity_label(&self) -> &'static str {
        match self.activity {
            ActivityState::Listening => "listening",
            ActivityState::SilentScenario0 => "idle: marker",
            ActivityState::SilentScenario1 => "idle: sample",
        }
    }

    /// Status line text; `visible` is the number of phrases on the canvas
    pub fn status_line(&self, visible: usize) -> String {
        let mic = if self.listening { "mic on" } else { "mic off" };
        let mut line = format!(
            " {} | {} | {} on canvas, {} placed ({} generated)",
            mic,
            self.activity_label(),
            visible,
            self.placed,
            self.generated
        );
        if self.dropped > 0 {
            line.push_str(&format!(", {} dropped", self.dropped));
        }
        line.push_str(" | m restart  f fullscreen  esc quit");
        line
    }
}
