//! HTTP client that delivers signed events to a webhook receiver

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::Url;
use std::error::Error as StdError;
use std::io;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::event::Event;

pub const X_GITHUB_EVENT: &str = "x-github-event";
pub const X_HUB_SIGNATURE_256: &str = "x-hub-signature-256";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid header value for {name}: {value:?}")]
    InvalidHeader { name: &'static str, value: String },
    #[error("Refusing to send unsigned {0} event")]
    Unsigned(String),
}

/// Outcome of a single delivery attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The receiver answered. The status is not interpreted.
    Delivered { status: u16 },
    /// No connection could be made to the receiver
    Unreachable,
    /// Dry run: the request was printed instead of sent
    Printed,
}

/// Webhook delivery client
pub struct WebhookClient {
    client: reqwest::Client,
    url: Url,
    dry_run: bool,
}

impl WebhookClient {
    pub fn new(url: Url) -> Self {
        let client = reqwest::Client::new();
        Self {
            client,
            url,
            dry_run: false,
        }
    }

    /// Print requests to stdout instead of sending them
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    fn headers(&self, event: &Event) -> Result<HeaderMap, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("webhook-sender/0.1"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static(X_GITHUB_EVENT),
            header_value(X_GITHUB_EVENT, &event.event_type)?,
        );
        headers.insert(
            HeaderName::from_static(X_HUB_SIGNATURE_256),
            header_value(X_HUB_SIGNATURE_256, &event.signature_header())?,
        );
        Ok(headers)
    }

    /// POST a signed event to the receiver.
    ///
    /// A refused, reset or dropped connection is reported and turned into
    /// [`Delivery::Unreachable`]. TLS failures, bad URLs and every other
    /// transport error are returned.
    pub async fn send(&self, event: &Event) -> Result<Delivery, ClientError> {
        if !event.is_signed() {
            return Err(ClientError::Unsigned(event.event_type.clone()));
        }
        let headers = self.headers(event)?;

        if self.dry_run {
            println!("POST {}", self.url);
            for (name, value) in &headers {
                println!("{}: {}", name, value.to_str().unwrap_or_default());
            }
            println!();
            println!("{}", event.payload);
            return Ok(Delivery::Printed);
        }

        debug!("POST {} ({} event)", self.url, event.event_type);
        let result = self
            .client
            .post(self.url.clone())
            .headers(headers)
            .body(event.payload.clone())
            .send()
            .await;

        match result {
            Ok(resp) => {
                let status = resp.status();
                debug!("Receiver answered {}", status);
                info!("Sent {} event to {}", event.event_type, self.url);
                Ok(Delivery::Delivered {
                    status: status.as_u16(),
                })
            }
            Err(e) if is_connection_failure(&e) => {
                warn!("Unable to send event to {}", self.url);
                debug!("Connection error: {}", e);
                Ok(Delivery::Unreachable)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Whether a send error means the receiver could not be reached or hung up,
/// as opposed to a TLS or request-building problem.
fn is_connection_failure(err: &reqwest::Error) -> bool {
    (err.is_connect() || err.is_request()) && !is_tls_error(err)
}

/// Walk the source chain looking for a rustls error. tokio-rustls reports
/// handshake failures as an `io::Error` wrapping it, and `io::Error::source`
/// skips the wrapped error, so those are unwrapped by hand.
fn is_tls_error(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<rustls::Error>() {
            return true;
        }
        let wrapped = e.downcast_ref::<io::Error>().and_then(|io_err| io_err.get_ref());
        if wrapped.is_some_and(|inner| inner.is::<rustls::Error>()) {
            return true;
        }
        current = e.source();
    }
    false
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, ClientError> {
    HeaderValue::from_str(value).map_err(|_| ClientError::InvalidHeader {
        name,
        value: value.to_string(),
    })
}
