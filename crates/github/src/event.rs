//! Signed webhook events built from payload files

use common::Secret;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::signing::{sign, signature_header};

#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("Failed to read payload {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid JSON in payload {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Event names GitHub documents for the `X-GitHub-Event` header
pub const KNOWN_EVENTS: &[&str] = &[
    "branch_protection_rule",
    "check_run",
    "check_suite",
    "commit_comment",
    "create",
    "delete",
    "deployment",
    "deployment_status",
    "discussion",
    "discussion_comment",
    "fork",
    "gollum",
    "issue_comment",
    "issues",
    "label",
    "member",
    "membership",
    "merge_group",
    "meta",
    "milestone",
    "organization",
    "package",
    "page_build",
    "ping",
    "project",
    "public",
    "pull_request",
    "pull_request_review",
    "pull_request_review_comment",
    "pull_request_review_thread",
    "push",
    "release",
    "repository",
    "repository_dispatch",
    "star",
    "status",
    "team",
    "team_add",
    "watch",
    "workflow_dispatch",
    "workflow_job",
    "workflow_run",
];

/// One webhook delivery: event type, canonical body and its signature
#[derive(Debug, Clone)]
pub struct Event {
    pub event_type: String,
    pub payload: String,
    pub signature: String,
}

impl Event {
    pub fn new(event_type: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            payload: payload.into(),
            signature: String::new(),
        }
    }

    /// Load a payload file and build an unsigned event from it.
    ///
    /// The event type comes from the file name, see [`event_type_from_path`].
    pub fn from_file(path: &Path) -> Result<Self, PayloadError> {
        let raw = fs::read_to_string(path).map_err(|source| PayloadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let payload = canonicalize(&raw).map_err(|source| PayloadError::Json {
            path: path.to_path_buf(),
            source,
        })?;

        let event_type = event_type_from_path(path);
        if !KNOWN_EVENTS.contains(&event_type.as_str()) {
            warn!(
                "{} maps to unknown GitHub event type `{}`",
                path.display(),
                event_type
            );
        }

        debug!("Loaded {} event from {}", event_type, path.display());
        Ok(Self::new(event_type, payload))
    }

    /// Sign the payload. The body sent later must be `self.payload` unchanged.
    pub fn sign(&mut self, secret: &Secret) {
        self.signature = sign(secret.as_bytes(), self.payload.as_bytes());
    }

    pub fn is_signed(&self) -> bool {
        !self.signature.is_empty()
    }

    /// Value for the `X-Hub-Signature-256` header
    pub fn signature_header(&self) -> String {
        signature_header(&self.signature)
    }
}

/// Re-encode JSON compactly: no indentation, `,` and `:` without spaces.
/// Object keys keep their source order.
pub fn canonicalize(raw: &str) -> Result<String, serde_json::Error> {
    let value: Value = serde_json::from_str(raw)?;
    serde_json::to_string(&value)
}

/// `push-01.json` -> `push`: the file stem up to the first `-`
pub fn event_type_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    stem.split('-').next().unwrap_or_default().to_string()
}
