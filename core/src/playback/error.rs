//! Error types for player and speech collaborators

use thiserror::Error;

/// Errors reported by a video player
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("player is not ready")]
    NotReady,

    #[error("player command '{command}' failed: {reason}")]
    Command { command: &'static str, reason: String },

    #[error("player is gone")]
    Disconnected,
}

impl PlayerError {
    /// Whether polling again later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, PlayerError::NotReady | PlayerError::Command { .. })
    }
}

/// Errors reported by a speech backend
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("speech backend is unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("failed to start speech process")]
    Spawn(#[source] std::io::Error),
}

impl SpeechError {
    /// Whether a later utterance may succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, SpeechError::Spawn(_))
    }
}
