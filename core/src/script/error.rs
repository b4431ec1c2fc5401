//! Error types for script sources

use std::path::PathBuf;
use thiserror::Error;

/// Errors while fetching script text. Cue lines themselves never fail to
/// parse; malformed fields fall back to defaults.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read script file {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("script source is closed")]
    Closed,
}
