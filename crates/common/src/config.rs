//! Sender configuration
//!
//! The signing secret comes either straight from the command line or from the
//! `github_secret` field of a YAML config file. The config file is the one the
//! receiving bot reads, so any other keys in it are ignored.

use figment::{
    providers::{Format, Yaml},
    Figment,
};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};

/// Default endpoint of a locally running webhook receiver
pub const DEFAULT_WEBHOOK_URL: &str = "http://127.0.0.1:1234/api/webhooks/github";

/// Contents of the YAML config file that the sender cares about
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Shared secret used to sign GitHub webhook payloads
    #[serde(default)]
    pub github_secret: Option<String>,
}

impl Config {
    /// Load configuration from a YAML file.
    ///
    /// Unlike a plain `Yaml::file` merge, a missing file is an error here: the
    /// caller asked for this exact file.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ConfigFile {
                path: path.to_path_buf(),
                reason: "no such file".to_string(),
            });
        }

        debug!("Loading config from {}", path.display());
        Figment::new()
            .merge(Yaml::file(path))
            .extract()
            .map_err(|e| Error::ConfigFile {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }
}

/// Shared HMAC key. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(Error::Config("GitHub secret must not be empty".to_string()));
        }
        Ok(Self(value))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Where the signing secret should be read from
#[derive(Clone)]
pub enum SecretSource {
    /// Passed directly on the command line
    Inline(String),
    /// Read from the `github_secret` field of a YAML file
    ConfigFile(PathBuf),
}

impl SecretSource {
    /// Resolve the source into a usable secret
    pub fn resolve(&self) -> Result<Secret> {
        match self {
            SecretSource::Inline(value) => Secret::new(value.as_str()),
            SecretSource::ConfigFile(path) => {
                let config = Config::from_file(path)?;
                match config.github_secret {
                    Some(secret) if !secret.is_empty() => {
                        debug!("Using github_secret from {}", path.display());
                        Secret::new(secret)
                    }
                    _ => Err(Error::MissingSecret { path: path.clone() }),
                }
            }
        }
    }
}
