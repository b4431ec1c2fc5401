//! Error types for context operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors during configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration")]
    Load(#[from] confy::ConfyError),

    #[error("failed to save configuration to {path}")]
    Save {
        path: PathBuf,
        #[source]
        source: confy::ConfyError,
    },

    #[error("failed to locate configuration file")]
    Locate(#[source] confy::ConfyError),
}
