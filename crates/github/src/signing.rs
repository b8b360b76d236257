//! Webhook payload signing

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Prefix GitHub puts in front of the hex digest in `X-Hub-Signature-256`
pub const SIGNATURE_PREFIX: &str = "sha256=";

fn mac_for(secret: &[u8]) -> HmacSha256 {
    // HMAC pads or hashes the key, so every length is valid
    HmacSha256::new_from_slice(secret).expect("HMAC accepts keys of any length")
}

/// Compute the lowercase hex HMAC-SHA256 of `body` keyed with `secret`
pub fn sign(secret: &[u8], body: &[u8]) -> String {
    let mut mac = mac_for(secret);
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Format a hex digest as an `X-Hub-Signature-256` header value
pub fn signature_header(signature: &str) -> String {
    format!("{}{}", SIGNATURE_PREFIX, signature)
}

/// Verify a webhook signature the way GitHub receivers do
///
/// `signature` is the value of the `X-Hub-Signature-256` header
/// `secret` is the webhook secret
/// `body` is the raw request body
pub fn verify_signature(signature: &str, secret: &[u8], body: &[u8]) -> bool {
    let signature = match signature.strip_prefix(SIGNATURE_PREFIX) {
        Some(s) => s,
        None => return false,
    };

    let signature_bytes = match hex::decode(signature) {
        Ok(b) => b,
        Err(_) => return false,
    };

    let mut mac = mac_for(secret);
    mac.update(body);
    mac.verify_slice(&signature_bytes).is_ok()
}
