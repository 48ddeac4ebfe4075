//! HMAC-SHA256 webhook signatures in the svix / Standard Webhooks format.
//!
//! The signed content is `"{msg_id}.{timestamp}.{body}"`. The signature header
//! carries one or more space-separated `v1,<base64>` entries; any one matching
//! entry authenticates the request.

use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error as ThisError;
use tracing::debug;

use crate::config::WEBHOOK_TOLERANCE_SECS;
use crate::webhook::headers::WebhookHeaders;

type HmacSha256 = Hmac<Sha256>;

const SECRET_PREFIX: &str = "whsec_";
const SIGNATURE_VERSION: &str = "v1";

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum VerifyError {
    #[error("timestamp header is not an integer")]
    InvalidTimestamp,

    #[error("timestamp is too old")]
    TimestampTooOld,

    #[error("timestamp is in the future")]
    TimestampTooNew,

    #[error("no matching signature found")]
    NoMatchingSignature,
}

#[derive(Debug, ThisError)]
pub enum SecretError {
    #[error("secret is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("secret decodes to an empty key")]
    Empty,
}

/// Verifies inbound webhooks against a shared signing secret.
#[derive(Clone)]
pub struct WebhookVerifier {
    key: Vec<u8>,
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier").finish_non_exhaustive()
    }
}

impl WebhookVerifier {
    /// Build from a `whsec_<base64>` secret. The prefix is optional.
    pub fn new(secret: &str) -> Result<Self, SecretError> {
        let encoded = secret.strip_prefix(SECRET_PREFIX).unwrap_or(secret);
        let key = STANDARD.decode(encoded.trim())?;
        if key.is_empty() {
            return Err(SecretError::Empty);
        }
        Ok(Self { key })
    }

    pub fn verify(&self, headers: &WebhookHeaders, payload: &[u8]) -> Result<(), VerifyError> {
        self.verify_at(headers, payload, chrono::Utc::now().timestamp())
    }

    /// Verify against an explicit clock, `now` in unix seconds.
    pub fn verify_at(
        &self,
        headers: &WebhookHeaders,
        payload: &[u8],
        now: i64,
    ) -> Result<(), VerifyError> {
        let timestamp: i64 = headers
            .timestamp
            .trim()
            .parse()
            .map_err(|_| VerifyError::InvalidTimestamp)?;

        // The header is caller-controlled; saturate instead of overflowing.
        if now.saturating_sub(timestamp) > WEBHOOK_TOLERANCE_SECS {
            return Err(VerifyError::TimestampTooOld);
        }
        if timestamp.saturating_sub(now) > WEBHOOK_TOLERANCE_SECS {
            return Err(VerifyError::TimestampTooNew);
        }

        let expected = self.compute(&headers.id, &headers.timestamp, payload);

        let matched = headers
            .signature
            .split_whitespace()
            .filter_map(|entry| entry.split_once(','))
            .filter(|(version, _)| *version == SIGNATURE_VERSION)
            .filter_map(|(_, sig)| STANDARD.decode(sig).ok())
            .any(|candidate| bool::from(candidate.as_slice().ct_eq(expected.as_slice())));

        if !matched {
            return Err(VerifyError::NoMatchingSignature);
        }
        debug!(msg_id = %headers.id, "webhook signature verified");
        Ok(())
    }

    /// Produce a `v1,<base64>` signature entry for the given message.
    pub fn sign(&self, msg_id: &str, timestamp: i64, payload: &[u8]) -> String {
        let mac = self.compute(msg_id, &timestamp.to_string(), payload);
        format!("{SIGNATURE_VERSION},{}", STANDARD.encode(mac))
    }

    fn compute(&self, msg_id: &str, timestamp: &str, payload: &[u8]) -> Vec<u8> {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC can take key of any size");
        mac.update(msg_id.as_bytes());
        mac.update(b".");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SECRET: &str = "whsec_MfKQ9r8GKYqrTwjUPD8ILPZIo2LaLaSw";
    const NOW: i64 = 1_700_000_000;
    const BODY: &[u8] = br#"{"type":"user.created","data":{"id":"u_1"}}"#;

    fn verifier() -> WebhookVerifier {
        WebhookVerifier::new(SECRET).unwrap()
    }

    fn headers(signature: String, timestamp: i64) -> WebhookHeaders {
        WebhookHeaders {
            id: "msg_1".to_string(),
            timestamp: timestamp.to_string(),
            signature,
        }
    }

    #[test]
    fn valid_signature_verifies() {
        let v = verifier();
        let sig = v.sign("msg_1", NOW, BODY);
        assert_eq!(v.verify_at(&headers(sig, NOW), BODY, NOW), Ok(()));
    }

    #[test]
    fn prefix_is_optional() {
        let bare = WebhookVerifier::new(SECRET.trim_start_matches("whsec_")).unwrap();
        let sig = verifier().sign("msg_1", NOW, BODY);
        assert!(bare.verify_at(&headers(sig, NOW), BODY, NOW).is_ok());
    }

    #[test]
    fn secret_must_be_base64() {
        assert!(matches!(
            WebhookVerifier::new("whsec_not base64!"),
            Err(SecretError::Decode(_))
        ));
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert!(matches!(WebhookVerifier::new("whsec_"), Err(SecretError::Empty)));
        assert!(matches!(WebhookVerifier::new("  "), Err(SecretError::Empty)));
    }

    #[test]
    fn extreme_timestamps_are_rejected_without_overflow() {
        let v = verifier();
        let sig = v.sign("msg_1", NOW, BODY);
        assert_eq!(
            v.verify_at(&headers(sig.clone(), i64::MIN), BODY, NOW),
            Err(VerifyError::TimestampTooOld)
        );
        assert_eq!(
            v.verify_at(&headers(sig.clone(), i64::MAX), BODY, NOW),
            Err(VerifyError::TimestampTooNew)
        );
        // and with the clock itself at the extremes
        assert_eq!(
            v.verify_at(&headers(sig.clone(), NOW), BODY, i64::MAX),
            Err(VerifyError::TimestampTooOld)
        );
        assert_eq!(
            v.verify_at(&headers(sig, NOW), BODY, i64::MIN),
            Err(VerifyError::TimestampTooNew)
        );
    }

    #[test]
    fn any_matching_entry_is_accepted() {
        let v = verifier();
        let good = v.sign("msg_1", NOW, BODY);
        let sig = format!("v1,AAAA v2,whatever {good}");
        assert!(v.verify_at(&headers(sig, NOW), BODY, NOW).is_ok());
    }

    #[test]
    fn unknown_version_is_ignored() {
        let v = verifier();
        let good = v.sign("msg_1", NOW, BODY);
        let sig = good.replacen("v1,", "v1a,", 1);
        assert_eq!(
            v.verify_at(&headers(sig, NOW), BODY, NOW),
            Err(VerifyError::NoMatchingSignature)
        );
    }

    #[test]
    fn wrong_secret_fails() {
        let other = WebhookVerifier::new("whsec_c2VjcmV0LW51bWJlci10d28=").unwrap();
        let sig = other.sign("msg_1", NOW, BODY);
        assert_eq!(
            verifier().verify_at(&headers(sig, NOW), BODY, NOW),
            Err(VerifyError::NoMatchingSignature)
        );
    }

    #[test]
    fn message_id_is_covered() {
        let v = verifier();
        let sig = v.sign("msg_2", NOW, BODY);
        assert!(v.verify_at(&headers(sig, NOW), BODY, NOW).is_err());
    }

    #[test]
    fn stale_and_future_timestamps_fail() {
        let v = verifier();
        let old = NOW - WEBHOOK_TOLERANCE_SECS - 1;
        let sig = v.sign("msg_1", old, BODY);
        assert_eq!(
            v.verify_at(&headers(sig, old), BODY, NOW),
            Err(VerifyError::TimestampTooOld)
        );

        let future = NOW + WEBHOOK_TOLERANCE_SECS + 1;
        let sig = v.sign("msg_1", future, BODY);
        assert_eq!(
            v.verify_at(&headers(sig, future), BODY, NOW),
            Err(VerifyError::TimestampTooNew)
        );
    }

    #[test]
    fn edge_of_tolerance_is_accepted() {
        let v = verifier();
        let ts = NOW - WEBHOOK_TOLERANCE_SECS;
        let sig = v.sign("msg_1", ts, BODY);
        assert!(v.verify_at(&headers(sig, ts), BODY, NOW).is_ok());
    }

    #[test]
    fn non_numeric_timestamp_fails() {
        let v = verifier();
        let h = WebhookHeaders {
            id: "msg_1".to_string(),
            timestamp: "yesterday".to_string(),
            signature: v.sign("msg_1", NOW, BODY),
        };
        assert_eq!(
            v.verify_at(&h, BODY, NOW),
            Err(VerifyError::InvalidTimestamp)
        );
    }

    proptest! {
        #[test]
        fn prop_tampered_body_fails(
            body in proptest::collection::vec(proptest::num::u8::ANY, 1..512),
            index in 0usize..512,
            delta in 1u8..=255,
        ) {
            let v = verifier();
            let sig = v.sign("msg_1", NOW, &body);
            let mut tampered = body.clone();
            let idx = index % tampered.len();
            tampered[idx] = tampered[idx].wrapping_add(delta);
            prop_assert_eq!(
                v.verify_at(&headers(sig, NOW), &tampered, NOW),
                Err(VerifyError::NoMatchingSignature)
            );
        }

        #[test]
        fn prop_signed_body_verifies(
            body in proptest::collection::vec(proptest::num::u8::ANY, 0..512),
        ) {
            let v = verifier();
            let sig = v.sign("msg_1", NOW, &body);
            prop_assert!(v.verify_at(&headers(sig, NOW), &body, NOW).is_ok());
        }
    }
}
