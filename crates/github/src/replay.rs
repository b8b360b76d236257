//! Replay payload files against a webhook receiver, one at a time

use common::Secret;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

use crate::client::{ClientError, Delivery, WebhookClient};
use crate::event::{Event, PayloadError};
use crate::signing::verify_signature;

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Counters for a finished replay run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub sent: usize,
    pub unreachable: usize,
    pub skipped: usize,
    pub printed: usize,
}

/// Sign and send every payload file in order.
///
/// Missing files are skipped. The first unreadable or malformed payload, or
/// any transport error other than a failed connection, stops the run.
pub async fn replay(
    client: &WebhookClient,
    secret: &Secret,
    files: &[PathBuf],
) -> Result<ReplaySummary, ReplayError> {
    let mut summary = ReplaySummary::default();

    for path in files {
        if !path.exists() {
            warn!("Skipping {}: no such file", path.display());
            summary.skipped += 1;
            continue;
        }

        let mut event = Event::from_file(path)?;
        event.sign(secret);
        debug_assert!(verify_signature(
            &event.signature_header(),
            secret.as_bytes(),
            event.payload.as_bytes()
        ));
        debug!("{} signed as {} event", path.display(), event.event_type);

        match client.send(&event).await? {
            Delivery::Delivered { .. } => summary.sent += 1,
            Delivery::Unreachable => summary.unreachable += 1,
            Delivery::Printed => summary.printed += 1,
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Url;
    use std::fs;
    use std::path::Path;
    use wiremock::matchers::{body_string, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn secret() -> Secret {
        Secret::new("s3cr3t").unwrap()
    }

    fn write_payload(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn client_for(server: &MockServer) -> WebhookClient {
        let url = Url::parse(&format!("{}/api/webhooks/github", server.uri())).unwrap();
        WebhookClient::new(url)
    }

    #[tokio::test]
    async fn test_replay_sends_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let push = write_payload(dir.path(), "push-1.json", r#"{"a": 1, "b": 2}"#);
        let ping = write_payload(dir.path(), "ping-1.json", "{\n  \"zen\": \"hi\"\n}");

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("x-github-event", "push"))
            .and(body_string(r#"{"a":1,"b":2}"#))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(header("x-github-event", "ping"))
            .and(body_string(r#"{"zen":"hi"}"#))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let summary = replay(&client, &secret(), &[push, ping]).await.unwrap();
        assert_eq!(summary.sent, 2);

        let received = server.received_requests().await.unwrap();
        let events: Vec<_> = received
            .iter()
            .map(|r| r.headers.get("x-github-event").unwrap().to_str().unwrap())
            .collect();
        assert_eq!(events, vec!["push", "ping"]);

        for request in &received {
            let signature = request
                .headers
                .get("x-hub-signature-256")
                .unwrap()
                .to_str()
                .unwrap();
            assert!(verify_signature(signature, b"s3cr3t", &request.body));
        }
    }

    #[tokio::test]
    async fn test_malformed_payload_stops_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let broken = write_payload(dir.path(), "push-1.json", "{\"a\": ");
        let valid = write_payload(dir.path(), "push-2.json", "{}");

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = replay(&client, &secret(), &[broken, valid])
            .await
            .unwrap_err();
        assert!(matches!(err, ReplayError::Payload(PayloadError::Json { .. })));
    }

    #[tokio::test]
    async fn test_missing_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("push-missing.json");
        let valid = write_payload(dir.path(), "issues-1.json", r#"{"action": "opened"}"#);

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("x-github-event", "issues"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let summary = replay(&client, &secret(), &[missing, valid]).await.unwrap();
        assert_eq!(
            summary,
            ReplaySummary {
                sent: 1,
                skipped: 1,
                ..Default::default()
            }
        );
    }

    #[tokio::test]
    async fn test_unreachable_receiver_continues() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_payload(dir.path(), "push-1.json", "{}");
        let second = write_payload(dir.path(), "push-2.json", "[]");

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let url = Url::parse(&format!("http://127.0.0.1:{}/", port)).unwrap();

        let summary = replay(&WebhookClient::new(url), &secret(), &[first, second])
            .await
            .unwrap();
        assert_eq!(summary.unreachable, 2);
        assert_eq!(summary.sent, 0);
    }
}
