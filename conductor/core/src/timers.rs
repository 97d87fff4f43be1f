//! Cancellable one-shot and periodic timers on a virtual clock
//!
//! The conductor never sleeps. Elapsed time arrives with each frame tick and
//! is fed into [`TimerSet::fire_next`], which yields due timers one at a
//! time in deadline order. Handlers may arm or cancel timers between
//! firings, and the next call sees the change.

use std::collections::HashMap;
use std::time::Duration;

/// Shortest period a recurring timer may have
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// The timers the conductor uses
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerKind {
    /// No utterance for the silence window
    SilenceDeadline,
    /// Idle scenario cadence
    ScenarioInterval,
    /// End of the current recognition window
    RecognitionStop,
}

#[derive(Clone, Copy, Debug)]
struct Timer {
    deadline: Duration,
    period: Option<Duration>,
}

/// A set of named timers driven by explicit time advancement
#[derive(Debug, Default, Clone)]
pub struct TimerSet {
    now: Duration,
    timers: HashMap<TimerKind, Timer>,
}

impl TimerSet {
    /// Create an empty timer set at time zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Arm `kind` to fire once after `after`, replacing any pending arming
    pub fn arm_once(&mut self, kind: TimerKind, after: Duration) {
        self.timers.insert(
            kind,
            Timer {
                deadline: self.now + after,
                period: None,
            },
        );
    }

    /// Arm `kind` to fire every `period`, first firing one period from now
    pub fn arm_every(&mut self, kind: TimerKind, period: Duration) {
        let period = period.max(MIN_PERIOD);
        self.timers.insert(
            kind,
            Timer {
                deadline: self.now + period,
                period: Some(period),
            },
        );
    }

    /// Disarm `kind`; returns whether it was armed
    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        self.timers.remove(&kind).is_some()
    }

    /// Whether `kind` is armed
    #[must_use]
    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.timers.contains_key(&kind)
    }

    /// Time until `kind` fires
    #[must_use]
    pub fn remaining(&self, kind: TimerKind) -> Option<Duration> {
        self.timers
            .get(&kind)
            .map(|t| t.deadline.saturating_sub(self.now))
    }

    /// Fire the earliest timer due at or before `horizon`
    ///
    /// The clock moves to that timer's deadline. One-shot timers are
    /// disarmed; periodic ones are rescheduled one period later.
    pub fn fire_next(&mut self, horizon: Duration) -> Option<TimerKind> {
        let (kind, timer) = self
            .timers
            .iter()
            .filter(|(_, t)| t.deadline <= horizon)
            .min_by_key(|(kind, t)| (t.deadline, **kind))
            .map(|(kind, t)| (*kind, *t))?;

        self.now = self.now.max(timer.deadline);
        match timer.period {
            Some(period) => {
                self.timers.insert(
                    kind,
                    Timer {
                        deadline: timer.deadline + period,
                        period: Some(period),
                    },
                );
            }
            None => {
                self.timers.remove(&kind);
            }
        }
        Some(kind)
    }

    /// Move the clock forward to `horizon` once all due timers have fired
    pub fn settle(&mut self, horizon: Duration) {
        self.now = self.now.max(horizon);
    }

    /// Advance by `delta`, returning every timer that fired in order
    ///
    /// Handlers cannot react between firings here; use
    /// [`fire_next`](Self::fire_next) when they need to.
    pub fn advance(&mut self, delta: Duration) -> Vec<TimerKind> {
        let horizon = self.now + delta;
        let mut fired = Vec::new();
        while let Some(kind) = self.fire_next(horizon) {
            fired.push(kind);
        }
        self.settle(horizon);
        fired
    }
}
