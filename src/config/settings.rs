//! Settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::AppPaths;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors from loading or saving `settings.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read/write settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ---------------------------------------------------------------------------
// AudioConfig
// ---------------------------------------------------------------------------

/// Settings for voice capture and chunked audio delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Packet size in bytes used when splitting a recorded buffer for
    /// chunked feeding or network send.  Larger packets finish faster.
    pub packet_size: usize,
    /// Stream captured audio to the recognizer/server while recording is
    /// active, instead of only on finish.
    pub stream_while_recording: bool,
    /// Maximum recording length in seconds; older audio is discarded.
    pub max_recording_secs: f32,
    /// Audio input device name — `None` means the system default.
    pub input_device: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            packet_size: 4_096,
            stream_while_recording: true,
            max_recording_secs: 60.0,
            input_device: None,
        }
    }
}

// ---------------------------------------------------------------------------
// RecognizerConfig
// ---------------------------------------------------------------------------

/// Settings for the local Vosk recognizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizerConfig {
    /// Name of the model directory under the models dir
    /// (e.g. `"vosk-model-small-en-us-0.15"`).
    pub model: String,
    /// Number of alternative transcripts to produce.  `0` gives a single
    /// best result, which is what the event decoding expects.
    pub max_alternatives: u16,
    /// Include word-level timing in results.
    pub words: bool,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            model: "vosk-model-small-en-us-0.15".into(),
            max_alternatives: 0,
            words: false,
        }
    }
}

impl RecognizerConfig {
    /// Resolve the on-disk model directory via [`AppPaths`].
    pub fn model_path(&self, paths: &AppPaths) -> PathBuf {
        paths.model_dir(&self.model)
    }
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

/// Connection and launch parameters for a remote Vosk recognition server.
///
/// Doubles as the source for the server's command line — see
/// [`crate::remote::build_server_args`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind/connect address.  `"localhost"` is normalized to
    /// `127.0.0.1` when connecting.
    pub address: String,
    /// Server port.
    pub port: u16,
    /// Worker threads the server should use.
    pub threads: u32,
    /// Sample rate the server expects, in Hz.
    pub sample_rate: u32,
    /// Ask the server for word-level timing in results.
    pub show_words: bool,
    /// Path to the model directory the server should load.
    pub model_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".into(),
            port: 2_700,
            threads: 4,
            sample_rate: 16_000,
            show_words: false,
            model_path: PathBuf::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level configuration, serialized as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use vosk_voice::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Voice capture settings.
    pub audio: AudioConfig,
    /// Local recognizer settings.
    pub recognizer: RecognizerConfig,
    /// Remote recognition-server settings.
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
