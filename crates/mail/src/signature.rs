//! HMAC-SHA256 verification of raw webhook bodies.
//!
//! The provider signs the exact request body with the shared webhook secret
//! and sends the lowercase hex digest in a header. Verification must run on
//! the raw bytes before any JSON parsing.

use std::fmt::Write as _;

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Hex HMAC-SHA256 of `body` under `secret`.
pub fn sign_body(secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("hmac accepts keys of any length");
    mac.update(body);
    let digest = mac.finalize().into_bytes();

    let mut encoded = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(encoded, "{byte:02x}");
    }
    encoded
}

/// Constant-time check of a claimed signature against the raw body.
pub fn verify_signature(secret: &str, body: &[u8], claimed_hex: &str) -> bool {
    let Some(claimed) = decode_hex(claimed_hex.trim()) else {
        return false;
    };

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("hmac accepts keys of any length");
    mac.update(body);
    mac.verify_slice(&claimed).is_ok()
}

fn decode_hex(input: &str) -> Option<Vec<u8>> {
    if input.len() % 2 != 0 {
        return None;
    }
    (0..input.len())
        .step_by(2)
        .map(|index| u8::from_str_radix(input.get(index..index + 2)?, 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{sign_body, verify_signature};

    #[test]
    fn signature_round_trips() {
        let body = br#"{"event_type":"message_received","event_id":"evt-1"}"#;
        let signature = sign_body("topsecret", body);
        assert!(verify_signature("topsecret", body, &signature));
    }

    #[test]
    fn tampered_body_is_rejected() {
        let signature = sign_body("topsecret", b"original");
        assert!(!verify_signature("topsecret", b"tampered", &signature));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let signature = sign_body("topsecret", b"payload");
        assert!(!verify_signature("othersecret", b"payload", &signature));
    }

    #[test]
    fn malformed_hex_is_rejected_not_panicked() {
        assert!(!verify_signature("topsecret", b"payload", "not-hex"));
        assert!(!verify_signature("topsecret", b"payload", "abc"));
        assert!(!verify_signature("topsecret", b"payload", ""));
    }
}
