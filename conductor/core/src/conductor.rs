//! Conductor - The Orchestration Core
//!
//! The Conductor owns every piece of mutable state: the phrase store, the
//! activity state machine, the timers, the speech source and the RNG. A
//! surface drives it with two calls:
//!
//! - [`Conductor::handle_event`] for discrete user actions
//! - [`Conductor::tick`] once per frame with the elapsed time
//!
//! Everything runs on the caller's thread. The only asynchronous work is the
//! reply request, which is spawned onto the current Tokio runtime and comes
//! back through an internal channel drained on the next tick. The live phrase
//! never waits for it.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;

use crate::activity::{ActivityState, ActivityStateMachine};
use crate::backend::LlmBackend;
use crate::canvas::PlacementError;
use crate::config::ConductorConfig;
use crate::events::SurfaceEvent;
use crate::lifecycle::LifecycleScheduler;
use crate::messages::ConductorMessage;
use crate::phrase::{PhraseId, PhraseOrigin, PhraseStore, PhraseView};
use crate::reply::ReplyComposer;
use crate::speech::{SpeechEvent, SpeechSource};
use crate::timers::{TimerKind, TimerSet};
use crate::wrap::wrap_text;

/// Capacity of the internal reply channel
const REPLY_CHANNEL_CAPACITY: usize = 32;

/// A resolved reply request
#[derive(Debug)]
struct ReplyReady {
    utterance: String,
    reply: Option<String>,
}

/// The Conductor - phrase placement and idle orchestration
pub struct Conductor<B: LlmBackend + ?Sized + 'static, S: SpeechSource> {
    /// Visible phrases and their reservations
    store: PhraseStore,
    /// Per-frame decay and eviction
    lifecycle: LifecycleScheduler,
    /// Listening / idle arbitration
    activity: ActivityStateMachine,
    /// Silence, scenario and recognition timers
    timers: TimerSet,
    /// Speech recogniser
    speech: S,
    /// Whether a recognition window is open
    listening: bool,
    /// Length of one recognition window
    recognition_window: Duration,
    /// Reply generation
    composer: ReplyComposer<B>,
    /// Reply results from spawned tasks
    reply_tx: mpsc::Sender<ReplyReady>,
    reply_rx: mpsc::Receiver<ReplyReady>,
    /// Reply tasks not yet drained
    pending_replies: usize,
    /// Placement, wrapping and filler randomness
    rng: StdRng,
    /// Lines handed to the renderer per phrase
    max_lines: usize,
    /// Fullscreen flag, owned here so every surface agrees
    fullscreen: bool,
    /// Channel to send messages to the surface
    tx: mpsc::Sender<ConductorMessage>,
}

impl<B: LlmBackend + ?Sized + 'static, S: SpeechSource> Conductor<B, S> {
    /// Create a new Conductor
    pub fn new(
        backend: Arc<B>,
        speech: S,
        config: &ConductorConfig,
        tx: mpsc::Sender<ConductorMessage>,
    ) -> Self {
        let (reply_tx, reply_rx) = mpsc::channel(REPLY_CHANNEL_CAPACITY);
        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

        Self {
            store: PhraseStore::new(config.canvas, config.placement_attempts, config.capacity),
            lifecycle: LifecycleScheduler::new(config.fade),
            activity: ActivityStateMachine::new(config.activity, config.idle.clone()),
            timers: TimerSet::new(),
            speech,
            listening: false,
            recognition_window: config.recognition_window,
            composer: ReplyComposer::new(backend, config.reply.clone()),
            reply_tx,
            reply_rx,
            pending_replies: 0,
            rng,
            max_lines: config.max_lines,
            fullscreen: false,
            tx,
        }
    }

    /// Render snapshots of every visible phrase, oldest first
    #[must_use]
    pub fn phrases(&self) -> Vec<PhraseView> {
        self.store.views(self.max_lines)
    }

    /// The phrase store
    #[must_use]
    pub fn store(&self) -> &PhraseStore {
        &self.store
    }

    /// Current activity state
    #[must_use]
    pub fn activity_state(&self) -> ActivityState {
        self.activity.state()
    }

    /// The timer set, for inspection
    #[must_use]
    pub fn timers(&self) -> &TimerSet {
        &self.timers
    }

    /// Whether a recognition window is open
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Whether fullscreen is on
    #[must_use]
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Reply requests still in flight
    #[must_use]
    pub fn pending_replies(&self) -> usize {
        self.pending_replies
    }

    /// The speech source
    pub fn speech(&self) -> &S {
        &self.speech
    }

    /// Arm the silence deadline and open the first recognition window
    pub fn start(&mut self) {
        tracing::info!("Conductor starting");
        self.check_backend();
        self.activity.start(&mut self.timers);
        self.send(ConductorMessage::ActivityChanged {
            state: self.activity.state(),
        });
        self.start_recognition();
    }

    /// Handle an event from the surface
    pub fn handle_event(&mut self, event: SurfaceEvent) {
        match event {
            SurfaceEvent::Utterance { text } => self.handle_utterance(&text),
            SurfaceEvent::RestartRecognition => {
                tracing::debug!("Recognition restart requested");
                self.start_recognition();
            }
            SurfaceEvent::ToggleFullscreen => {
                self.fullscreen = !self.fullscreen;
                self.send(ConductorMessage::Fullscreen {
                    enabled: self.fullscreen,
                });
            }
            SurfaceEvent::QuitRequested => self.shutdown(),
        }
    }

    /// Advance by one frame
    ///
    /// Order: speech events, finished replies, due timers, then opacity
    /// decay. Timers fire one at a time so a handler can re-arm or cancel
    /// the others before they are checked.
    pub fn tick(&mut self, delta: Duration) {
        self.poll_speech();
        self.poll_replies();

        let horizon = self.timers.now() + delta;
        while let Some(kind) = self.timers.fire_next(horizon) {
            self.on_timer(kind);
        }
        self.timers.settle(horizon);

        for id in self.lifecycle.advance(&mut self.store, delta) {
            self.send(ConductorMessage::PhraseRemoved { id });
        }
    }

    /// Stop recognition, disarm timers and tell the surface to quit
    pub fn shutdown(&mut self) {
        tracing::info!("Conductor shutting down");
        self.speech.stop();
        self.listening = false;
        for kind in [
            TimerKind::SilenceDeadline,
            TimerKind::ScenarioInterval,
            TimerKind::RecognitionStop,
        ] {
            self.timers.cancel(kind);
        }
        self.send(ConductorMessage::Quit);
    }

    // ========================================================================
    // Speech
    // ========================================================================

    fn poll_speech(&mut self) {
        while let Some(event) = self.speech.try_next() {
            match event {
                SpeechEvent::Result(text) => self.handle_utterance(&text),
                SpeechEvent::WindowEnded => {
                    tracing::debug!("Recognition window ended");
                    self.listening = false;
                    self.send(ConductorMessage::Recognition { listening: false });
                    self.start_recognition();
                }
            }
        }
    }

    fn start_recognition(&mut self) {
        self.timers.cancel(TimerKind::RecognitionStop);
        match self.speech.start() {
            Ok(()) => {
                self.listening = true;
                self.timers
                    .arm_once(TimerKind::RecognitionStop, self.recognition_window);
                tracing::debug!(window = ?self.recognition_window, "Recognition window opened");
                self.send(ConductorMessage::Recognition { listening: true });
            }
            Err(e) => {
                self.listening = false;
                tracing::warn!(error = %e, "Speech source failed to start");
            }
        }
    }

    fn handle_utterance(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            tracing::trace!("Ignoring empty recognition result");
            return;
        }

        if self.activity.on_utterance(&mut self.timers) {
            self.send(ConductorMessage::ActivityChanged {
                state: self.activity.state(),
            });
        }

        let lines = wrap_text(text, &mut self.rng);
        self.place(lines, PhraseOrigin::Live);
        self.request_reply(text.to_string());
    }

    // ========================================================================
    // Replies
    // ========================================================================

    fn request_reply(&mut self, utterance: String) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No async runtime available, skipping reply");
            return;
        };

        let composer = self.composer.clone();
        let tx = self.reply_tx.clone();
        self.pending_replies += 1;

        handle.spawn(async move {
            let reply = composer.compose(&utterance).await;
            // Receiver gone means the conductor was dropped
            let _ = tx.send(ReplyReady { utterance, reply }).await;
        });
    }

    fn check_backend(&self) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("No async runtime available, skipping backend health check");
            return;
        };
        let composer = self.composer.clone();
        handle.spawn(async move {
            composer.check_backend().await;
        });
    }

    fn poll_replies(&mut self) {
        while let Ok(ready) = self.reply_rx.try_recv() {
            self.pending_replies = self.pending_replies.saturating_sub(1);
            match ready.reply {
                Some(reply) => {
                    tracing::debug!(utterance = %ready.utterance, reply = %reply, "Reply received");
                    let lines = wrap_text(&reply, &mut self.rng);
                    self.place(lines, PhraseOrigin::Generated);
                }
                None => {
                    tracing::debug!(utterance = %ready.utterance, "No reply for utterance");
                }
            }
        }
    }

    // ========================================================================
    // Timers
    // ========================================================================

    fn on_timer(&mut self, kind: TimerKind) {
        match kind {
            TimerKind::SilenceDeadline => {
                self.activity.on_silence_elapsed(&mut self.timers);
                self.send(ConductorMessage::ActivityChanged {
                    state: self.activity.state(),
                });
            }
            TimerKind::ScenarioInterval => {
                if let Some(lines) = self.activity.on_scenario_tick(&mut self.rng) {
                    self.place(lines, PhraseOrigin::Generated);
                    self.send(ConductorMessage::ActivityChanged {
                        state: self.activity.state(),
                    });
                }
            }
            TimerKind::RecognitionStop => {
                tracing::debug!("Recognition window elapsed, stopping");
                self.speech.stop();
            }
        }
    }

    // ========================================================================
    // Placement
    // ========================================================================

    fn place(&mut self, lines: Vec<String>, origin: PhraseOrigin) -> Option<PhraseId> {
        let line_count = lines.len();
        match self.store.add(lines, origin, &mut self.rng) {
            Ok(id) => {
                tracing::trace!(phrase = %id, origin = ?origin, lines = line_count, "Phrase placed");
                self.send(ConductorMessage::PhraseAdded {
                    id,
                    origin,
                    lines: line_count,
                });
                Some(id)
            }
            Err(PlacementError::EmptyBlock) => {
                tracing::debug!(origin = ?origin, "Skipping empty block");
                None
            }
            Err(e) => {
                tracing::warn!(origin = ?origin, lines = line_count, error = %e, "Phrase dropped");
                self.send(ConductorMessage::PlacementFailed { origin, line_count });
                None
            }
        }
    }

    /// Send a message to the surface without blocking the frame
    fn send(&self, msg: ConductorMessage) {
        if let Err(e) = self.tx.try_send(msg) {
            tracing::warn!("Failed to send message to surface: {}", e);
        }
    }
}
