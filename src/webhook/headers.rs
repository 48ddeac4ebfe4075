use axum::http::HeaderMap;

use crate::error::SyncError;

/// `(svix name, Standard Webhooks name)` for each authenticity header.
const ID_HEADERS: (&str, &str) = ("svix-id", "webhook-id");
const TIMESTAMP_HEADERS: (&str, &str) = ("svix-timestamp", "webhook-timestamp");
const SIGNATURE_HEADERS: (&str, &str) = ("svix-signature", "webhook-signature");

/// The three authenticity headers every webhook delivery must carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookHeaders {
    pub id: String,
    pub timestamp: String,
    pub signature: String,
}

impl WebhookHeaders {
    /// Extract all three headers. `HeaderMap` lookups are case-insensitive.
    pub fn from_header_map(headers: &HeaderMap) -> Result<Self, SyncError> {
        Ok(Self {
            id: lookup(headers, ID_HEADERS)?,
            timestamp: lookup(headers, TIMESTAMP_HEADERS)?,
            signature: lookup(headers, SIGNATURE_HEADERS)?,
        })
    }
}

fn lookup(
    headers: &HeaderMap,
    (primary, fallback): (&'static str, &'static str),
) -> Result<String, SyncError> {
    [primary, fallback]
        .into_iter()
        .filter_map(|name| headers.get(name))
        .filter_map(|v| v.to_str().ok())
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(SyncError::MissingHeader(primary))
}
