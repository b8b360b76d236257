//! Common types and utilities for the webhook sender

pub mod config;
pub mod error;

pub use config::{Config, Secret, SecretSource, DEFAULT_WEBHOOK_URL};
pub use error::{Error, Result};
