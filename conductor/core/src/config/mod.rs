//! TOML Configuration File Support
//!
//! Configuration is read from `~/.config/murmur/murmur.toml` and then
//! overridden by environment variables.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. Environment variables
//! 2. TOML configuration file
//! 3. Default values
//!
//! # XDG Base Directory Compliance
//!
//! - `$XDG_CONFIG_HOME/murmur/murmur.toml` (typically `~/.config/murmur/murmur.toml`)
//! - `MURMUR_CONFIG` points somewhere else entirely
//!
//! # Example Configuration
//!
//! ```toml
//! seed = 42
//!
//! [canvas]
//! width = 1920
//! height = 1080
//! margin = 100
//!
//! [lifecycle]
//! capacity = 30
//! fade_secs = 50
//! removal_fade_secs = 5
//!
//! [activity]
//! silence_secs = 30
//! scenario_interval_secs = 10
//!
//! [reply]
//! backend = "chat"
//! base_url = "https://api.mistral.ai/v1"
//! model = "open-mistral-nemo"
//!
//! [render]
//! frame_rate = 30
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::activity::ActivityConfig;
use crate::backend::{BackendConfig, DEFAULT_CHAT_BASE_URL, DEFAULT_CHAT_MODEL};
use crate::canvas::{CanvasGeometry, DEFAULT_MAX_ATTEMPTS};
use crate::filler::IdleFiller;
use crate::lifecycle::FadeConfig;
use crate::phrase::DEFAULT_CAPACITY;
use crate::reply::{ReplyConfig, DEFAULT_MODEL};

/// Default recognition window length
pub const DEFAULT_RECOGNITION_WINDOW: Duration = Duration::from_secs(7);

/// Default render frame rate
pub const DEFAULT_FRAME_RATE: u32 = 30;

/// Default number of lines drawn per phrase
pub const DEFAULT_MAX_LINES: usize = 7;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Canvas section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasToml {
    /// Canvas width
    pub width: Option<f32>,

    /// Canvas height
    pub height: Option<f32>,

    /// Keep-out border
    pub margin: Option<f32>,

    /// Width of every block
    pub block_width: Option<f32>,

    /// Height of one line
    pub line_height: Option<f32>,
}

/// Placement section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementToml {
    /// Samples tried before a block is dropped
    pub max_attempts: Option<u32>,
}

/// Lifecycle section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleToml {
    /// Phrases kept before the oldest is culled
    pub capacity: Option<usize>,

    /// Normal fade duration in seconds
    pub fade_secs: Option<u64>,

    /// Culling fade duration in seconds
    pub removal_fade_secs: Option<u64>,

    /// Lowest opacity of a normally fading phrase
    pub opacity_floor: Option<f32>,

    /// Opacity covered during `fade_secs`
    pub fade_span: Option<f32>,
}

/// Activity section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityToml {
    /// Silence before idle content starts
    pub silence_secs: Option<u64>,

    /// Idle content cadence
    pub scenario_interval_secs: Option<u64>,

    /// Arm the silence deadline at start-up
    pub idle_on_start: Option<bool>,
}

/// Recognition section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionToml {
    /// Recognition window length
    pub window_secs: Option<u64>,

    /// Named pipe the terminal surface reads transcripts from
    pub fifo_path: Option<PathBuf>,
}

/// Reply section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyToml {
    /// `"ollama"` or `"chat"`
    pub backend: Option<String>,

    /// Model identifier
    pub model: Option<String>,

    /// Ollama host
    pub host: Option<String>,

    /// Ollama port
    pub port: Option<u16>,

    /// Chat completions API root
    pub base_url: Option<String>,

    /// Chat completions bearer token
    pub api_key: Option<String>,

    /// Prompt template containing `{utterance}`
    pub prompt: Option<String>,

    /// Sampling temperature
    pub temperature: Option<f32>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// Idle section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleToml {
    /// Marker token
    pub marker: Option<String>,

    /// Sample line pool
    pub samples: Option<Vec<String>>,
}

/// Render section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderToml {
    /// Frames per second
    pub frame_rate: Option<u32>,

    /// Lines drawn per phrase
    pub max_lines: Option<usize>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MurmurToml {
    /// Fixed RNG seed
    pub seed: Option<u64>,

    /// Canvas configuration section
    pub canvas: CanvasToml,

    /// Placement configuration section
    pub placement: PlacementToml,

    /// Lifecycle configuration section
    pub lifecycle: LifecycleToml,

    /// Activity configuration section
    pub activity: ActivityToml,

    /// Recognition configuration section
    pub recognition: RecognitionToml,

    /// Reply configuration section
    pub reply: ReplyToml,

    /// Idle configuration section
    pub idle: IdleToml,

    /// Render configuration section
    pub render: RenderToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved configuration for the Conductor and its surface
///
/// Use [`load_config`] to load configuration with proper priority handling.
#[derive(Clone, Debug)]
pub struct ConductorConfig {
    /// Canvas geometry
    pub canvas: CanvasGeometry,

    /// Placement attempt budget
    pub placement_attempts: u32,

    /// Phrase capacity before culling
    pub capacity: usize,

    /// Opacity decay parameters
    pub fade: FadeConfig,

    /// Silence and idle cadence
    pub activity: ActivityConfig,

    /// Length of one recognition window
    pub recognition_window: Duration,

    /// Named pipe for transcripts, if any
    pub speech_fifo: Option<PathBuf>,

    /// Reply prompt and request parameters
    pub reply: ReplyConfig,

    /// Reply transport
    pub backend: BackendConfig,

    /// Idle content generator
    pub idle: IdleFiller,

    /// Frames per second
    pub frame_rate: u32,

    /// Lines drawn per phrase
    pub max_lines: usize,

    /// Fixed RNG seed
    pub seed: Option<u64>,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    pub source: ConfigSource,
}

impl Default for ConductorConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasGeometry::default(),
            placement_attempts: DEFAULT_MAX_ATTEMPTS,
            capacity: DEFAULT_CAPACITY,
            fade: FadeConfig::default(),
            activity: ActivityConfig::default(),
            recognition_window: DEFAULT_RECOGNITION_WINDOW,
            speech_fifo: default_fifo_path(),
            reply: ReplyConfig::default(),
            backend: BackendConfig::default(),
            idle: IdleFiller::default(),
            frame_rate: DEFAULT_FRAME_RATE,
            max_lines: DEFAULT_MAX_LINES,
            seed: None,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl ConductorConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Duration of one frame
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.frame_rate.max(1)
    }

    /// Check that every value is usable
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::ValidationError(msg.to_string()));

        let canvas = &self.canvas;
        let dimensions = [
            canvas.width,
            canvas.height,
            canvas.margin,
            canvas.block_width,
            canvas.line_height,
        ];
        if !dimensions.iter().all(|v| v.is_finite()) {
            return invalid("canvas dimensions must be finite numbers");
        }
        if canvas.width <= 2.0 * canvas.margin || canvas.height <= 2.0 * canvas.margin {
            return invalid("canvas must be larger than twice the margin in both directions");
        }
        if canvas.margin < 0.0 {
            return invalid("canvas margin must not be negative");
        }
        if canvas.block_width <= 0.0 || canvas.line_height <= 0.0 {
            return invalid("block width and line height must be positive");
        }
        if self.placement_attempts == 0 {
            return invalid("placement max_attempts must be positive");
        }
        if self.capacity == 0 {
            return invalid("lifecycle capacity must be positive");
        }
        if self.fade.fade.is_zero() || self.fade.removal_fade.is_zero() {
            return invalid("fade durations must be positive");
        }
        if !(0.0..=255.0).contains(&self.fade.floor) {
            return invalid("opacity floor must be within 0..=255");
        }
        if !(0.0..=255.0).contains(&self.fade.fade_span) {
            return invalid("fade span must be within 0..=255");
        }
        if self.activity.scenario_interval.is_zero() {
            return invalid("scenario interval must be positive");
        }
        if self.recognition_window.is_zero() {
            return invalid("recognition window must be positive");
        }
        if self.frame_rate == 0 {
            return invalid("frame rate must be positive");
        }
        if self.max_lines == 0 {
            return invalid("max_lines must be positive");
        }
        if self.idle.marker().is_empty() {
            return invalid("idle marker must not be empty");
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/murmur/murmur.toml` or
/// `~/.config/murmur/murmur.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("murmur").join("murmur.toml"))
}

/// Default location of the transcript pipe
///
/// Lives under `$XDG_RUNTIME_DIR/murmur/`, falling back to the temp dir.
#[must_use]
pub fn default_fifo_path() -> Option<PathBuf> {
    let base = dirs::runtime_dir().unwrap_or_else(std::env::temp_dir);
    Some(base.join("murmur").join("speech.fifo"))
}

/// Load configuration from all sources with proper priority
///
/// `MURMUR_CONFIG` replaces the default file location.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or the
/// result fails validation. A missing config file is not an error.
pub fn load_config() -> Result<ConductorConfig, ConfigError> {
    let path = std::env::var_os("MURMUR_CONFIG")
        .map(PathBuf::from)
        .or_else(default_config_path);
    load_config_from_path(path)
}

/// Load configuration from a specific path
///
/// # Arguments
///
/// * `path` - Optional path to the configuration file. If `None`, only defaults
///   and environment variables are used.
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read, parsed or
/// validated.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<ConductorConfig, ConfigError> {
    load_with_env(path, |key| std::env::var(key).ok())
}

fn load_with_env<F>(path: Option<PathBuf>, env: F) -> Result<ConductorConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    // Start with defaults
    let mut config = ConductorConfig::default();

    // Try to load from file
    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: MurmurToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config)?;
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    // Apply environment variables (overrides file values)
    apply_env_config(&mut config, env);

    config.validate()?;
    Ok(config)
}

/// Switch the reply transport, keeping the model sensible for it
fn select_backend(config: &mut ConductorConfig, kind: &str) -> Result<(), String> {
    match kind.to_lowercase().as_str() {
        "ollama" => {
            if !matches!(config.backend, BackendConfig::Ollama { .. }) {
                config.backend = BackendConfig::default();
                if config.reply.model == DEFAULT_CHAT_MODEL {
                    config.reply.model = DEFAULT_MODEL.to_string();
                }
            }
            Ok(())
        }
        "chat" => {
            if !matches!(config.backend, BackendConfig::Chat { .. }) {
                config.backend = BackendConfig::chat(DEFAULT_CHAT_BASE_URL, None);
                if config.reply.model == DEFAULT_MODEL {
                    config.reply.model = DEFAULT_CHAT_MODEL.to_string();
                }
            }
            Ok(())
        }
        other => Err(format!("unknown reply backend '{other}' (expected 'ollama' or 'chat')")),
    }
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut ConductorConfig, toml: &MurmurToml) -> Result<(), ConfigError> {
    if toml.seed.is_some() {
        config.seed = toml.seed;
    }

    // Canvas settings
    if let Some(width) = toml.canvas.width {
        config.canvas.width = width;
    }
    if let Some(height) = toml.canvas.height {
        config.canvas.height = height;
    }
    if let Some(margin) = toml.canvas.margin {
        config.canvas.margin = margin;
    }
    if let Some(block_width) = toml.canvas.block_width {
        config.canvas.block_width = block_width;
    }
    if let Some(line_height) = toml.canvas.line_height {
        config.canvas.line_height = line_height;
    }

    if let Some(attempts) = toml.placement.max_attempts {
        config.placement_attempts = attempts;
    }

    // Lifecycle settings
    if let Some(capacity) = toml.lifecycle.capacity {
        config.capacity = capacity;
    }
    if let Some(secs) = toml.lifecycle.fade_secs {
        config.fade.fade = Duration::from_secs(secs);
    }
    if let Some(secs) = toml.lifecycle.removal_fade_secs {
        config.fade.removal_fade = Duration::from_secs(secs);
    }
    if let Some(floor) = toml.lifecycle.opacity_floor {
        config.fade.floor = floor;
    }
    if let Some(span) = toml.lifecycle.fade_span {
        config.fade.fade_span = span;
    }

    // Activity settings
    if let Some(secs) = toml.activity.silence_secs {
        config.activity.silence = Duration::from_secs(secs);
    }
    if let Some(secs) = toml.activity.scenario_interval_secs {
        config.activity.scenario_interval = Duration::from_secs(secs);
    }
    if let Some(idle_on_start) = toml.activity.idle_on_start {
        config.activity.idle_on_start = idle_on_start;
    }

    // Recognition settings
    if let Some(secs) = toml.recognition.window_secs {
        config.recognition_window = Duration::from_secs(secs);
    }
    if toml.recognition.fifo_path.is_some() {
        config.speech_fifo = toml.recognition.fifo_path.clone();
    }

    // Reply settings; backend kind first so host/url land in the right variant
    if let Some(ref kind) = toml.reply.backend {
        select_backend(config, kind).map_err(ConfigError::ValidationError)?;
    }
    if let Some(ref model) = toml.reply.model {
        config.reply.model = model.clone();
    }
    if let Some(ref prompt) = toml.reply.prompt {
        config.reply.prompt = prompt.clone();
    }
    if let Some(temperature) = toml.reply.temperature {
        config.reply.temperature = temperature;
    }
    if let Some(secs) = toml.reply.timeout_secs {
        config.reply.request_timeout = Duration::from_secs(secs);
    }
    match config.backend {
        BackendConfig::Ollama {
            ref mut host,
            ref mut port,
        } => {
            if let Some(ref h) = toml.reply.host {
                host.clone_from(h);
            }
            if let Some(p) = toml.reply.port {
                *port = p;
            }
        }
        BackendConfig::Chat {
            ref mut base_url,
            ref mut api_key,
        } => {
            if let Some(ref url) = toml.reply.base_url {
                base_url.clone_from(url);
            }
            if toml.reply.api_key.is_some() {
                api_key.clone_from(&toml.reply.api_key);
            }
        }
    }

    // Idle settings
    if toml.idle.marker.is_some() || toml.idle.samples.is_some() {
        let marker = toml
            .idle
            .marker
            .clone()
            .unwrap_or_else(|| config.idle.marker().to_string());
        let samples = toml
            .idle
            .samples
            .clone()
            .unwrap_or_else(|| config.idle.samples().to_vec());
        config.idle = IdleFiller::new(marker, samples);
    }

    // Render settings
    if let Some(rate) = toml.render.frame_rate {
        config.frame_rate = rate;
    }
    if let Some(lines) = toml.render.max_lines {
        config.max_lines = lines;
    }

    Ok(())
}

/// Apply environment variable overrides to the config
fn apply_env_config<F>(config: &mut ConductorConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    // Reply transport from environment
    if let Some(kind) = env("MURMUR_BACKEND") {
        match select_backend(config, &kind) {
            Ok(()) => config.source = ConfigSource::Env,
            Err(e) => tracing::warn!(error = %e, "Ignoring MURMUR_BACKEND"),
        }
    }
    if let Some(model) = env("MURMUR_MODEL") {
        config.reply.model = model;
        config.source = ConfigSource::Env;
    }
    match config.backend {
        BackendConfig::Ollama {
            ref mut host,
            ref mut port,
        } => {
            if let Some(h) = env("OLLAMA_HOST") {
                *host = h;
                config.source = ConfigSource::Env;
            }
            if let Some(p) = env("OLLAMA_PORT").and_then(|p| p.parse::<u16>().ok()) {
                *port = p;
                config.source = ConfigSource::Env;
            }
        }
        BackendConfig::Chat {
            ref mut base_url,
            ref mut api_key,
        } => {
            if let Some(url) = env("MURMUR_API_URL") {
                *base_url = url;
                config.source = ConfigSource::Env;
            }
            if let Some(key) = env("MURMUR_API_KEY") {
                *api_key = Some(key);
                config.source = ConfigSource::Env;
            }
        }
    }

    // Runtime settings from environment
    if let Some(seed) = env("MURMUR_SEED").and_then(|s| s.parse::<u64>().ok()) {
        config.seed = Some(seed);
        config.source = ConfigSource::Env;
    }
    if let Some(path) = env("MURMUR_SPEECH_FIFO") {
        config.speech_fifo = Some(PathBuf::from(path));
        config.source = ConfigSource::Env;
    }
    if let Some(secs) = env("MURMUR_SILENCE_SECS").and_then(|s| s.parse::<u64>().ok()) {
        config.activity.silence = Duration::from_secs(secs);
        config.source = ConfigSource::Env;
    }
    if let Some(rate) = env("MURMUR_FRAME_RATE").and_then(|s| s.parse::<u32>().ok()) {
        config.frame_rate = rate;
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// Tests
// =============================================================================
