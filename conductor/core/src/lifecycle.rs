//! Per-frame phrase ageing
//!
//! Every tick decays each phrase's opacity linearly with elapsed time, so
//! the visual result does not depend on the frame rate. Two regimes apply:
//!
//! - the oldest phrase, while the store is over capacity, fades to zero over
//!   the removal window and is then removed with its reservation released
//! - every other phrase fades toward a visible floor and stays there

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::phrase::{PhraseId, PhraseStore, FULL_OPACITY};

/// Opacity decay parameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FadeConfig {
    /// Time for a phrase to travel `fade_span` opacity units
    pub fade: Duration,
    /// Time for an evicted phrase to fade from full opacity to zero
    pub removal_fade: Duration,
    /// Lowest opacity a non-evicted phrase decays to
    pub floor: f32,
    /// Opacity units covered during `fade`
    pub fade_span: f32,
}

impl Default for FadeConfig {
    fn default() -> Self {
        Self {
            fade: Duration::from_secs(50),
            removal_fade: Duration::from_secs(5),
            floor: 25.0,
            fade_span: 178.0,
        }
    }
}

impl FadeConfig {
    /// Opacity lost per second in the normal regime
    #[must_use]
    pub fn fade_rate(&self) -> f32 {
        self.fade_span / self.fade.as_secs_f32()
    }

    /// Opacity lost per second while being evicted
    #[must_use]
    pub fn removal_rate(&self) -> f32 {
        FULL_OPACITY / self.removal_fade.as_secs_f32()
    }
}

/// Applies opacity decay and capacity eviction to a [`PhraseStore`]
#[derive(Debug, Clone, Default)]
pub struct LifecycleScheduler {
    fade: FadeConfig,
}

impl LifecycleScheduler {
    /// Create a scheduler with the given decay parameters
    #[must_use]
    pub fn new(fade: FadeConfig) -> Self {
        Self { fade }
    }

    /// Decay parameters in use
    #[must_use]
    pub fn fade(&self) -> &FadeConfig {
        &self.fade
    }

    /// Age every phrase by `delta` and return the ids of removed phrases
    pub fn advance(&self, store: &mut PhraseStore, delta: Duration) -> Vec<PhraseId> {
        let dt = delta.as_secs_f32();
        let culling = store.is_over_capacity();
        let fade_rate = self.fade.fade_rate();
        let removal_rate = self.fade.removal_rate();
        let floor = self.fade.floor;

        let mut cull_oldest = false;

        // Newest to oldest
        for (i, phrase) in store.phrases_mut().iter_mut().enumerate().rev() {
            if culling && i == 0 {
                phrase.opacity -= removal_rate * dt;
                if phrase.opacity <= 0.0 {
                    phrase.opacity = 0.0;
                    cull_oldest = true;
                }
            } else {
                // Never raise a phrase that is already below the floor
                let lower_bound = floor.min(phrase.opacity);
                phrase.opacity = (phrase.opacity - fade_rate * dt)
                    .min(phrase.opacity)
                    .max(lower_bound);
            }
        }

        let mut removed = Vec::new();
        if cull_oldest {
            if let Some(phrase) = store.remove_oldest() {
                tracing::debug!(phrase = %phrase.id, "Evicted oldest phrase");
                removed.push(phrase.id);
            }
        }
        removed
    }
}
