//! Listening / idle arbitration
//!
//! ```text
//!            utterance (any state)
//!     ┌───────────────────────────────────┐
//!     ▼                                   │
//! Listening ──silence deadline──▶ SilentScenario0 ◀──tick──┐
//!                                        │                │
//!                                      tick               │
//!                                        ▼                │
//!                                 SilentScenario1 ────────┘
//! ```
//!
//! The state machine owns no clock. It arms and cancels timers in a
//! [`TimerSet`] and the conductor calls back in when they fire.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::filler::IdleFiller;
use crate::timers::{TimerKind, TimerSet};

/// Current activity
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityState {
    /// Accepting live speech
    #[default]
    Listening,
    /// Idle; next tick emits a marker block
    SilentScenario0,
    /// Idle; next tick emits a sample line
    SilentScenario1,
}

impl ActivityState {
    /// Whether an idle scenario is running
    #[must_use]
    pub fn is_idle(self) -> bool {
        !matches!(self, Self::Listening)
    }
}

/// Timing for the state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityConfig {
    /// Silence needed before idle content starts
    pub silence: Duration,
    /// Cadence of idle content
    pub scenario_interval: Duration,
    /// Arm the silence deadline at start-up, before any utterance
    pub idle_on_start: bool,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            silence: Duration::from_secs(30),
            scenario_interval: Duration::from_secs(10),
            idle_on_start: true,
        }
    }
}

/// Timer-driven controller choosing between live and idle content
#[derive(Debug, Clone)]
pub struct ActivityStateMachine {
    state: ActivityState,
    config: ActivityConfig,
    filler: IdleFiller,
}

impl ActivityStateMachine {
    /// Create a machine in `Listening`
    #[must_use]
    pub fn new(config: ActivityConfig, filler: IdleFiller) -> Self {
        Self {
            state: ActivityState::Listening,
            config,
            filler,
        }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> ActivityState {
        self.state
    }

    /// Timing configuration
    #[must_use]
    pub fn config(&self) -> &ActivityConfig {
        &self.config
    }

    /// Arm the initial silence deadline if configured to
    pub fn start(&mut self, timers: &mut TimerSet) {
        if self.config.idle_on_start {
            timers.arm_once(TimerKind::SilenceDeadline, self.config.silence);
        }
    }

    /// An utterance arrived: stop idling and restart the silence window
    ///
    /// Returns `true` when the state changed.
    pub fn on_utterance(&mut self, timers: &mut TimerSet) -> bool {
        timers.cancel(TimerKind::ScenarioInterval);
        timers.cancel(TimerKind::SilenceDeadline);
        timers.arm_once(TimerKind::SilenceDeadline, self.config.silence);

        let changed = self.state != ActivityState::Listening;
        if changed {
            tracing::debug!(from = ?self.state, "Speech resumed, back to listening");
        }
        self.state = ActivityState::Listening;
        changed
    }

    /// The silence deadline expired: begin idle scenarios
    pub fn on_silence_elapsed(&mut self, timers: &mut TimerSet) {
        tracing::debug!(from = ?self.state, "Silence window elapsed, starting idle scenarios");
        self.state = ActivityState::SilentScenario0;
        timers.arm_every(TimerKind::ScenarioInterval, self.config.scenario_interval);
    }

    /// The scenario interval ticked: produce the next idle block
    ///
    /// Returns `None` while listening, which only happens when a stale tick
    /// races an utterance.
    pub fn on_scenario_tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Vec<String>> {
        match self.state {
            ActivityState::Listening => None,
            ActivityState::SilentScenario0 => {
                self.state = ActivityState::SilentScenario1;
                Some(self.filler.marker_block(rng))
            }
            ActivityState::SilentScenario1 => {
                self.state = ActivityState::SilentScenario0;
                Some(self.filler.sample_block(rng))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filler::{IDLE_MARKER, SAMPLE_LINES};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn machine() -> (ActivityStateMachine, TimerSet) {
        (
            ActivityStateMachine::new(ActivityConfig::default(), IdleFiller::default()),
            TimerSet::new(),
        )
    }

    #[test]
    fn test_initial_state_is_listening() {
        let (sm, _) = machine();
        assert_eq!(sm.state(), ActivityState::Listening);
        assert!(!sm.state().is_idle());
    }

    #[test]
    fn test_start_arms_silence_deadline() {
        let (mut sm, mut timers) = machine();
        sm.start(&mut timers);
        assert_eq!(
            timers.remaining(TimerKind::SilenceDeadline),
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn test_start_without_idle_on_start() {
        let config = ActivityConfig {
            idle_on_start: false,
            ..ActivityConfig::default()
        };
        let mut sm = ActivityStateMachine::new(config, IdleFiller::default());
        let mut timers = TimerSet::new();
        sm.start(&mut timers);
        assert!(!timers.is_armed(TimerKind::SilenceDeadline));
    }

    #[test]
    fn test_scenarios_alternate() {
        let (mut sm, mut timers) = machine();
        let mut rng = StdRng::seed_from_u64(21);

        sm.on_silence_elapsed(&mut timers);
        assert_eq!(sm.state(), ActivityState::SilentScenario0);
        assert!(timers.is_armed(TimerKind::ScenarioInterval));

        let markers = sm.on_scenario_tick(&mut rng).unwrap();
        assert!(markers.iter().all(|l| l.starts_with(IDLE_MARKER)));
        assert_eq!(sm.state(), ActivityState::SilentScenario1);

        let sample = sm.on_scenario_tick(&mut rng).unwrap().join(" ");
        assert!(SAMPLE_LINES.contains(&sample.as_str()));
        assert_eq!(sm.state(), ActivityState::SilentScenario0);
    }

    #[test]
    fn test_utterance_interrupts_idle() {
        let (mut sm, mut timers) = machine();
        sm.on_silence_elapsed(&mut timers);

        assert!(sm.on_utterance(&mut timers));
        assert_eq!(sm.state(), ActivityState::Listening);
        assert!(!timers.is_armed(TimerKind::ScenarioInterval));
        assert_eq!(
            timers.remaining(TimerKind::SilenceDeadline),
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn test_utterance_while_listening_restarts_deadline() {
        let (mut sm, mut timers) = machine();
        sm.start(&mut timers);
        timers.advance(Duration::from_secs(20));

        assert!(!sm.on_utterance(&mut timers));
        assert_eq!(
            timers.remaining(TimerKind::SilenceDeadline),
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn test_tick_while_listening_is_ignored() {
        let (mut sm, _) = machine();
        let mut rng = StdRng::seed_from_u64(2);
        assert!(sm.on_scenario_tick(&mut rng).is_none());
        assert_eq!(sm.state(), ActivityState::Listening);
    }
}
