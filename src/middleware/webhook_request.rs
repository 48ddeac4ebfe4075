use axum::{
    body::Bytes,
    extract::{FromRef, FromRequest, Request},
    http::StatusCode,
};
use serde_json::Value;
use tracing::debug;

use crate::error::SyncError;
use crate::router::SyncState;
use crate::webhook::{WebhookHeaders, WebhookVerifier};

/// A webhook body that has passed the secret, header, JSON and signature checks,
/// in that order. Nothing downstream of this extractor sees unauthenticated input.
pub struct VerifiedWebhook(pub Value);

impl<S> FromRequest<S> for VerifiedWebhook
where
    S: Send + Sync,
    SyncState: FromRef<S>,
{
    type Rejection = SyncError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let state = SyncState::from_ref(state);

        let secret = state
            .webhook_secret
            .as_deref()
            .ok_or(SyncError::MissingWebhookSecret)?;
        let verifier =
            WebhookVerifier::new(secret).map_err(|_| SyncError::InvalidWebhookSecret)?;

        let headers = WebhookHeaders::from_header_map(req.headers())?;

        let body = match Bytes::from_request(req, &()).await {
            Ok(b) => b,
            Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                return Err(SyncError::PayloadTooLarge);
            }
            Err(rejection) => return Err(SyncError::InvalidBody(rejection.body_text())),
        };

        let value: Value =
            serde_json::from_slice(&body).map_err(|e| SyncError::InvalidBody(e.to_string()))?;
        if !value.is_object() {
            return Err(SyncError::InvalidBody("expected a JSON object".to_string()));
        }

        verifier.verify(&headers, &body)?;
        debug!(msg_id = %headers.id, "webhook accepted");

        Ok(VerifiedWebhook(value))
    }
}
