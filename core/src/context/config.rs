//! Application configuration
//!
//! This module re-exports shared types from narrator-types and provides
//! persistence for AppConfig.

use std::path::{Path, PathBuf};

pub use narrator_types::{AppConfig, AudioSettings, EngineSettings, OverlapPolicy, ResumePolicy};

use super::ConfigError;

const APP_NAME: &str = "narrator";
const CONFIG_NAME: &str = "config";

// ─────────────────────────────────────────────────────────────────────────────
// AppConfig Extensions
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for AppConfig persistence
pub trait AppConfigExt: Sized {
    /// Load from the platform config dir, falling back to defaults
    fn load() -> Self;
    fn load_from(path: &Path) -> Result<Self, ConfigError>;
    fn save(&self) -> Result<(), ConfigError>;
    fn save_to(&self, path: &Path) -> Result<(), ConfigError>;
    fn config_path() -> Result<PathBuf, ConfigError>;
}

impl AppConfigExt for AppConfig {
    fn load() -> Self {
        match confy::load(APP_NAME, CONFIG_NAME) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load configuration, using defaults");
                Self::default()
            }
        }
    }

    fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Ok(confy::load_path(path)?)
    }

    fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        confy::store_path(path, self).map_err(|source| ConfigError::Save {
            path: path.to_path_buf(),
            source,
        })
    }

    fn config_path() -> Result<PathBuf, ConfigError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME).map_err(ConfigError::Locate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("narrator.toml");

        let mut config = AppConfig::default();
        config.engine.poll_interval_ms = 40;
        config.engine.resume_policy = ResumePolicy::FixedDelay;
        config.audio.voice = Some("en-us".to_string());
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.toml");

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded, AppConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "[engine]\ntrigger_window_secs = 0.5\n").unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.engine.trigger_window_secs, 0.5);
        assert_eq!(loaded.engine.poll_interval_ms, 100);
        assert_eq!(loaded.audio, AudioSettings::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[engine\npoll_interval_ms = ").unwrap();

        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::Load(_))
        ));
    }
}
