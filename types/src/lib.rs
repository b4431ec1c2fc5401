//! Shared configuration types for narrator
//!
//! This crate contains serializable configuration types that are shared between
//! the synchronization core (narrator-core) and the command line front end.

use serde::{Deserialize, Serialize};
use std::time::Duration;

// ─────────────────────────────────────────────────────────────────────────────
// Engine Settings
// ─────────────────────────────────────────────────────────────────────────────

/// When the engine resumes playback after speaking a cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumePolicy {
    /// Wait for the speech backend's completion signal and the cue's pause,
    /// whichever ends last. Falls back to `FixedDelay` when the backend
    /// reports no completion.
    #[default]
    AfterSpeech,
    /// Resume once the cue's pause duration has elapsed, ignoring speech.
    FixedDelay,
}

/// How cues that match while another cue is still being narrated are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Queue them and narrate back-to-back before a single resume.
    #[default]
    Queue,
    /// Pause and speak immediately; the newest narration owns the resume.
    Concurrent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Delay between two poll ticks
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Width of the open interval after a cue's trigger time in which it fires
    #[serde(default = "default_trigger_window_secs")]
    pub trigger_window_secs: f64,

    #[serde(default)]
    pub resume_policy: ResumePolicy,

    #[serde(default)]
    pub overlap_policy: OverlapPolicy,
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_trigger_window_secs() -> f64 {
    0.2
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            trigger_window_secs: default_trigger_window_secs(),
            resume_policy: ResumePolicy::default(),
            overlap_policy: OverlapPolicy::default(),
        }
    }
}

impl EngineSettings {
    /// Poll interval as a `Duration`, never shorter than one millisecond
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Trigger window in seconds, falling back to the default for
    /// non-positive or non-finite values
    pub fn trigger_window(&self) -> f64 {
        if self.trigger_window_secs.is_finite() && self.trigger_window_secs > 0.0 {
            self.trigger_window_secs
        } else {
            default_trigger_window_secs()
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Audio Settings
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioSettings {
    /// Master enable for speech output
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Preferred voice name (backend default when unset)
    #[serde(default)]
    pub voice: Option<String>,

    /// Speaking speed at rate 1.0, for backends that take words per minute
    #[serde(default = "default_words_per_minute")]
    pub base_words_per_minute: u32,
}

fn default_true() -> bool {
    true
}

fn default_words_per_minute() -> u32 {
    175
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            voice: None,
            base_words_per_minute: default_words_per_minute(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// App Config
// ─────────────────────────────────────────────────────────────────────────────

///
/// Note: Persistence methods (load/save) are provided by narrator-core via the
/// `AppConfigExt` trait.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub audio: AudioSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.engine.poll_interval_ms, 100);
        assert_eq!(config.engine.trigger_window_secs, 0.2);
        assert!(config.audio.enabled);
    }

    #[test]
    fn policies_use_snake_case() {
        let config: AppConfig = toml::from_str(
            "[engine]\nresume_policy = \"fixed_delay\"\noverlap_policy = \"concurrent\"\n",
        )
        .unwrap();
        assert_eq!(config.engine.resume_policy, ResumePolicy::FixedDelay);
        assert_eq!(config.engine.overlap_policy, OverlapPolicy::Concurrent);
        assert_eq!(config.engine.poll_interval_ms, 100);
    }

    #[test]
    fn degenerate_values_are_clamped() {
        let settings = EngineSettings {
            poll_interval_ms: 0,
            trigger_window_secs: -1.0,
            ..Default::default()
        };
        assert_eq!(settings.poll_interval(), Duration::from_millis(1));
        assert_eq!(settings.trigger_window(), 0.2);
    }
}
