//! Authenticity checks for inbound identity-provider webhooks.
//!
//! Layout:
//! - `headers.rs`: extraction of the id / timestamp / signature headers
//! - `signature.rs`: HMAC-SHA256 verification and signing

pub mod headers;
pub mod signature;

pub use headers::WebhookHeaders;
pub use signature::{SecretError, VerifyError, WebhookVerifier};
