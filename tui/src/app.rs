//! Main Application
//!
//! The App is a thin client over the embedded [`Conductor`]:
//! 1. Converts key presses to [`SurfaceEvent`]s
//! 2. Ticks the conductor once per frame with the real elapsed time
//! 3. Folds [`ConductorMessage`]s into [`DisplayState`]
//! 4. Draws the conductor's phrase views on the canvas widget

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use ratatui::{Frame, Terminal};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use murmur_core::{
    backend, CanvasGeometry, Conductor, ConductorConfig, ConductorMessage, LlmBackend,
    SurfaceEvent,
};

use crate::canvas::CanvasWidget;
use crate::display::DisplayState;
use crate::speech::FifoSpeechSource;
use crate::theme::{FRAME, IDLE, LISTENING, NOT_LISTENING, STATUS_TEXT};

/// Conductor → surface channel size
const MESSAGE_CHANNEL_CAPACITY: usize = 256;

/// Map a key press to a surface event
pub fn key_to_event(key: KeyEvent) -> Option<SurfaceEvent> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(SurfaceEvent::QuitRequested);
    }
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => Some(SurfaceEvent::QuitRequested),
        KeyCode::Char('m' | 'M') => Some(SurfaceEvent::RestartRecognition),
        KeyCode::Char('f' | 'F') => Some(SurfaceEvent::ToggleFullscreen),
        _ => None,
    }
}

/// Main application state
pub struct App {
    /// The engine
    conductor: Conductor<dyn LlmBackend, FifoSpeechSource>,
    /// Messages from the conductor
    rx: mpsc::Receiver<ConductorMessage>,
    /// Display state derived from ConductorMessages
    display: DisplayState,
    /// Canvas units the conductor places in
    geometry: CanvasGeometry,
    /// Target frame duration
    frame_interval: Duration,
}

impl App {
    /// Create the app and its conductor from configuration
    pub fn new(config: &ConductorConfig) -> Self {
        let (tx, rx) = mpsc::channel(MESSAGE_CHANNEL_CAPACITY);
        let llm = backend::from_config(&config.backend, config.reply.request_timeout);
        tracing::info!(backend = llm.name(), model = %config.reply.model, "Reply backend ready");

        let speech = FifoSpeechSource::new(config.speech_fifo.clone());
        match speech.path() {
            Some(path) => tracing::info!(fifo = %path.display(), "Speech FIFO configured"),
            None => tracing::warn!("No speech FIFO path available; only idle content will appear"),
        }
        let conductor = Conductor::new(llm, speech, config, tx);

        Self {
            conductor,
            rx,
            display: DisplayState::new(),
            geometry: config.canvas,
            frame_interval: config.frame_interval(),
        }
    }

    /// Run until the conductor says quit
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        let mut events = EventStream::new();
        let mut frames = tokio::time::interval(self.frame_interval);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last_frame = Instant::now();

        self.conductor.start();
        self.drain_messages();
        terminal.draw(|frame| self.render(frame))?;

        while !self.display.quit {
            tokio::select! {
                biased;

                // Terminal events - highest priority
                maybe_event = events.next() => match maybe_event {
                    // Only handle Press events (not Release or Repeat)
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        if let Some(event) = key_to_event(key) {
                            self.conductor.handle_event(event);
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => tracing::warn!(error = %e, "Terminal event error"),
                    None => {
                        tracing::info!("Terminal event stream closed");
                        self.conductor.shutdown();
                    }
                },

                // Frame tick
                _ = frames.tick() => {
                    let now = Instant::now();
                    self.conductor.tick(now.duration_since(last_frame));
                    last_frame = now;
                }
            }

            self.drain_messages();
            terminal.draw(|frame| self.render(frame))?;
        }

        Ok(())
    }

    /// Display state, for the entry point's exit summary
    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    fn drain_messages(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            tracing::trace!(?msg, "Conductor message");
            self.display.apply_message(msg);
        }
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let phrases = self.conductor.phrases();

        if self.display.fullscreen {
            frame.render_widget(CanvasWidget::new(&phrases, &self.geometry), area);
            return;
        }

        let [canvas_area, status_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);

        let block = Block::bordered()
            .title(" murmur ")
            .border_style(Style::default().fg(FRAME));
        let inner = block.inner(canvas_area);
        frame.render_widget(block, canvas_area);
        frame.render_widget(CanvasWidget::new(&phrases, &self.geometry), inner);

        let accent = if self.display.activity.is_idle() {
            IDLE
        } else if self.display.listening {
            LISTENING
        } else {
            NOT_LISTENING
        };
        let status = Line::from(vec![
            Span::styled("●", Style::default().fg(accent)),
            Span::styled(
                self.display.status_line(phrases.len()),
                Style::default().fg(STATUS_TEXT),
            ),
        ]);
        frame.render_widget(Paragraph::new(status), status_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(
            key_to_event(press(KeyCode::Char('m'), KeyModifiers::NONE)),
            Some(SurfaceEvent::RestartRecognition)
        );
        assert_eq!(
            key_to_event(press(KeyCode::Char('F'), KeyModifiers::SHIFT)),
            Some(SurfaceEvent::ToggleFullscreen)
        );
        assert_eq!(
            key_to_event(press(KeyCode::Esc, KeyModifiers::NONE)),
            Some(SurfaceEvent::QuitRequested)
        );
        assert_eq!(
            key_to_event(press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(SurfaceEvent::QuitRequested)
        );
    }

    #[test]
    fn test_unbound_keys_ignored() {
        assert_eq!(key_to_event(press(KeyCode::Char('c'), KeyModifiers::NONE)), None);
        assert_eq!(key_to_event(press(KeyCode::Enter, KeyModifiers::NONE)), None);
    }
}
