//! murmur core - headless phrase placement and fading engine
//!
//! This crate owns everything that decides *where* a spoken phrase lands on
//! the canvas, *how long* it stays visible, and *what* appears when nobody is
//! talking. It has no rendering dependencies: a surface (the terminal canvas
//! in `murmur-tui`, or a test harness) feeds it events and draws the
//! [`PhraseView`]s it hands back.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       Surfaces                               │
//! │   ┌──────────────┐   ┌──────────────┐   ┌────────────────┐   │
//! │   │ TUI canvas   │   │ FIFO speech  │   │ Headless/tests │   │
//! │   └──────┬───────┘   └──────┬───────┘   └───────┬────────┘   │
//! │          │  SurfaceEvent (up) / ConductorMessage (down)      │
//! └──────────┼──────────────────────────────────────────────────┘
//!            │
//! ┌──────────┼───────────────────────────────────────────────────┐
//! │          ▼              Conductor                            │
//! │  ┌──────────────┐  ┌────────────────┐  ┌──────────────────┐  │
//! │  │ Activity     │  │ PhraseStore    │  │ ReplyComposer    │  │
//! │  │ StateMachine │  │  ├ Placement   │  │  └ LlmBackend    │  │
//! │  │ + TimerSet   │  │  └ SpatialIndex│  │    (async task)  │  │
//! │  └──────────────┘  └────────────────┘  └──────────────────┘  │
//! │            LifecycleScheduler (per-frame fade/evict)         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Module Overview
//!
//! - [`canvas`]: geometry, occupied-area index and random placement
//! - [`phrase`]: phrase entity and the ordered phrase store
//! - [`lifecycle`]: per-tick opacity decay and capacity eviction
//! - [`timers`]: virtual-clock one-shot and periodic timers
//! - [`activity`]: listening / idle scenario state machine
//! - [`filler`]: idle content synthesis
//! - [`wrap`]: random word-group line wrapping
//! - [`speech`]: speech source interface
//! - [`backend`]: text-completion backends (Ollama, chat completions)
//! - [`reply`]: poetic reply prompt and sanitisation
//! - [`conductor`]: the top-level controller tying it all together
//! - [`config`]: TOML + environment configuration

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod activity;
pub mod backend;
pub mod canvas;
pub mod conductor;
pub mod config;
pub mod events;
pub mod filler;
pub mod lifecycle;
pub mod messages;
pub mod phrase;
pub mod reply;
pub mod speech;
pub mod timers;
pub mod wrap;

// Re-exports for convenience
pub use activity::{ActivityConfig, ActivityState, ActivityStateMachine};
pub use backend::{BackendConfig, ChatBackend, LlmBackend, LlmRequest, LlmResponse, OllamaBackend};
pub use canvas::{
    CanvasGeometry, Placement, PlacementEngine, PlacementError, Reservation, ReservationId,
    SpatialIndex,
};
pub use conductor::Conductor;
pub use config::{
    default_config_path, load_config, load_config_from_path, ConductorConfig, ConfigError,
    ConfigSource, MurmurToml,
};
pub use events::SurfaceEvent;
pub use filler::IdleFiller;
pub use lifecycle::{FadeConfig, LifecycleScheduler};
pub use messages::ConductorMessage;
pub use phrase::{Alignment, Phrase, PhraseId, PhraseOrigin, PhraseStore, PhraseView};
pub use reply::{sanitize_reply, ReplyComposer, ReplyConfig};
pub use speech::{ScriptedSpeechSource, SpeechEvent, SpeechSource};
pub use timers::{TimerKind, TimerSet};
pub use wrap::{wrap_into_lines, wrap_text};
