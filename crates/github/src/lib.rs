//! GitHub-style webhook events: canonical payloads, signing and delivery

pub mod client;
pub mod event;
pub mod replay;
pub mod signing;

pub use client::{ClientError, Delivery, WebhookClient};
pub use event::{canonicalize, event_type_from_path, Event, PayloadError};
pub use replay::{replay, ReplayError, ReplaySummary};
pub use signing::{sign, verify_signature};
