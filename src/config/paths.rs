//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\vosk-voice\
//!   macOS:   ~/Library/Application Support/vosk-voice/
//!   Linux:   ~/.config/vosk-voice/
//!
//! Data dir (language models):
//!   Windows: %LOCALAPPDATA%\vosk-voice\
//!   macOS:   ~/Library/Application Support/vosk-voice/
//!   Linux:   ~/.local/share/vosk-voice/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Directory for unpacked Vosk language models (one sub-directory per
    /// model, as distributed by the Vosk project).
    pub models_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "vosk-voice";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path (should be extremely rare in practice).
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");
        let models_dir = data_dir.join("models");

        Self {
            config_dir,
            settings_file,
            models_dir,
        }
    }

    /// Full path to a named model directory under [`AppPaths::models_dir`].
    pub fn model_dir(&self, model_name: &str) -> PathBuf {
        self.models_dir.join(model_name)
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_non_empty() {
        let paths = AppPaths::new();
        assert!(paths.config_dir.to_str().is_some_and(|s| !s.is_empty()));
        assert!(paths.models_dir.to_str().is_some_and(|s| !s.is_empty()));
        assert!(paths
            .settings_file
            .file_name()
            .is_some_and(|n| n == "settings.toml"));
    }

    #[test]
    fn model_dir_joins_under_models() {
        let paths = AppPaths::new();
        let dir = paths.model_dir("vosk-model-small-en-us-0.15");
        assert!(dir.starts_with(&paths.models_dir));
        assert!(dir.ends_with("vosk-model-small-en-us-0.15"));
    }
}
