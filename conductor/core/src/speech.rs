//! Speech source interface
//!
//! A speech source turns audio into text somewhere outside this crate. The
//! conductor only starts and stops recognition windows and polls for
//! results; it never blocks on the source.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

/// Something a speech source reports
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpeechEvent {
    /// A recognised utterance, possibly empty
    Result(String),
    /// The current recognition window closed
    WindowEnded,
}

/// A recogniser the conductor can drive
pub trait SpeechSource: Send {
    /// Open a recognition window
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying recogniser cannot start.
    fn start(&mut self) -> anyhow::Result<()>;

    /// Close the current recognition window
    ///
    /// The source reports [`SpeechEvent::WindowEnded`] once it has closed.
    fn stop(&mut self);

    /// Next pending event, without blocking
    fn try_next(&mut self) -> Option<SpeechEvent>;
}

#[derive(Debug, Default)]
struct ScriptedState {
    pending: VecDeque<String>,
    events: VecDeque<SpeechEvent>,
    active: bool,
    starts: usize,
    stops: usize,
}

/// In-memory speech source fed by [`push_result`](Self::push_result)
///
/// Clones share state, so a test or headless driver can keep one handle
/// while the conductor owns another. Results pushed while no window is open
/// are held until the next [`start`](SpeechSource::start).
#[derive(Debug, Clone, Default)]
pub struct ScriptedSpeechSource {
    state: Arc<Mutex<ScriptedState>>,
}

impl ScriptedSpeechSource {
    /// Create an idle source
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a recognition result
    pub fn push_result(&self, text: impl Into<String>) {
        let mut state = self.state.lock();
        let text = text.into();
        if state.active {
            state.events.push_back(SpeechEvent::Result(text));
        } else {
            state.pending.push_back(text);
        }
    }

    /// Report that the recogniser closed the window on its own
    pub fn end_window(&self) {
        let mut state = self.state.lock();
        if state.active {
            state.active = false;
            state.events.push_back(SpeechEvent::WindowEnded);
        }
    }

    /// Whether a recognition window is open
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state.lock().active
    }

    /// Number of `start` calls so far
    #[must_use]
    pub fn start_count(&self) -> usize {
        self.state.lock().starts
    }

    /// Number of `stop` calls so far
    #[must_use]
    pub fn stop_count(&self) -> usize {
        self.state.lock().stops
    }
}

impl SpeechSource for ScriptedSpeechSource {
    fn start(&mut self) -> anyhow::Result<()> {
        let mut state = self.state.lock();
        state.active = true;
        state.starts += 1;
        while let Some(text) = state.pending.pop_front() {
            state.events.push_back(SpeechEvent::Result(text));
        }
        Ok(())
    }

    fn stop(&mut self) {
        let mut state = self.state.lock();
        state.stops += 1;
        if state.active {
            state.active = false;
            state.events.push_back(SpeechEvent::WindowEnded);
        }
    }

    fn try_next(&mut self) -> Option<SpeechEvent> {
        self.state.lock().events.pop_front()
    }
}
