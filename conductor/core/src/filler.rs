//! Idle filler content
//!
//! While nobody speaks the conductor alternates two kinds of generated
//! blocks: a column of idle markers, and a single line drawn from a pool of
//! code-like samples.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::wrap::wrap_text;

/// Token repeated to build marker blocks
pub const IDLE_MARKER: &str = "01)";

/// Default sample pool for the second idle scenario
pub const SAMPLE_LINES: &[&str] = &[
    "let reply = backend.send(request).await?",
    "if !response.status().is_success()",
    "prompt: template.replace(utterance)",
    "async fn compose(&self)",
    "self.speech.stop()",
    "timers.arm_once(RecognitionStop, window)",
    "rest = tail",
    "return Ok(Placement { x, y, reservation })",
    "self.phrases.push(phrase)",
    "self.state = ActivityState::SilentScenario0",
    "lines: vec![line]",
    "serde_json::to_string(&body)?",
];

const MAX_MARKER_LINES: usize = 10;
const MAX_MARKER_REPEAT: usize = 4;

/// Generates idle blocks
#[derive(Debug, Clone)]
pub struct IdleFiller {
    marker: String,
    samples: Vec<String>,
}

impl Default for IdleFiller {
    fn default() -> Self {
        Self::new(
            IDLE_MARKER,
            SAMPLE_LINES.iter().map(|s| (*s).to_string()).collect(),
        )
    }
}

impl IdleFiller {
    /// Create a filler with a custom marker and sample pool
    #[must_use]
    pub fn new(marker: impl Into<String>, samples: Vec<String>) -> Self {
        Self {
            marker: marker.into(),
            samples,
        }
    }

    /// Marker token
    #[must_use]
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Sample pool
    #[must_use]
    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    /// 1-10 lines, each the marker repeated 1-4 times
    pub fn marker_block<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<String> {
        let count = rng.gen_range(1..=MAX_MARKER_LINES);
        (0..count)
            .map(|_| {
                let repeat = rng.gen_range(1..=MAX_MARKER_REPEAT);
                vec![self.marker.as_str(); repeat].join(" ")
            })
            .collect()
    }

    /// One random sample, wrapped; empty when the pool is
    pub fn sample_block<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<String> {
        self.samples
            .choose(rng)
            .map(|line| wrap_text(line, rng))
            .unwrap_or_default()
    }
}
