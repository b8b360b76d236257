//! Error types

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for resolving the sender's configuration
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{} does not seem to contain a valid github_secret", path.display())]
    MissingSecret { path: PathBuf },

    #[error("Failed to read config file {}: {reason}", path.display())]
    ConfigFile { path: PathBuf, reason: String },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
