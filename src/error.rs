use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::{error, warn};

use crate::types::event::EventError;
use crate::webhook::signature::VerifyError;

#[derive(Debug, ThisError)]
pub enum SyncError {
    #[error("webhook signing secret is not configured")]
    MissingWebhookSecret,

    #[error("webhook signing secret is not valid base64")]
    InvalidWebhookSecret,

    #[error("database connection string is not configured")]
    MissingDatabaseUrl,

    #[error("missing webhook header: {0}")]
    MissingHeader(&'static str),

    #[error("request body is not a JSON object: {0}")]
    InvalidBody(String),

    #[error("request body too large")]
    PayloadTooLarge,

    #[error("webhook verification failed: {0}")]
    Verification(#[from] VerifyError),

    #[error("invalid event payload: {0}")]
    Event(#[from] EventError),

    #[error("database connection is unavailable")]
    DatabaseUnavailable,

    #[error("database error: {0}")]
    Database(#[from] SqlxError),

    #[error("user not found")]
    UserNotFound,
}

impl SyncError {
    pub fn status(&self) -> StatusCode {
        match self {
            SyncError::MissingWebhookSecret
            | SyncError::InvalidWebhookSecret
            | SyncError::MissingDatabaseUrl
            | SyncError::DatabaseUnavailable
            | SyncError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SyncError::MissingHeader(_)
            | SyncError::InvalidBody(_)
            | SyncError::Verification(_)
            | SyncError::Event(_) => StatusCode::BAD_REQUEST,
            SyncError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            SyncError::UserNotFound => StatusCode::NOT_FOUND,
        }
    }

    /// Message safe to hand back to the caller.
    fn public_message(&self) -> String {
        match self {
            SyncError::MissingWebhookSecret | SyncError::InvalidWebhookSecret => {
                "Webhook secret is not configured".to_string()
            }
            SyncError::MissingDatabaseUrl
            | SyncError::DatabaseUnavailable
            | SyncError::Database(_) => "Database operation failed".to_string(),
            SyncError::MissingHeader(_) => "Missing webhook headers".to_string(),
            SyncError::InvalidBody(_) => "Invalid request body".to_string(),
            SyncError::PayloadTooLarge => "Request body too large".to_string(),
            SyncError::Verification(_) => "Webhook verification failed".to_string(),
            SyncError::Event(EventError::Unhandled(kind)) => {
                format!("Unhandled event type: {kind}")
            }
            SyncError::Event(EventError::MissingId) => "Missing user id".to_string(),
            SyncError::Event(EventError::MissingEmail) => "Missing email address".to_string(),
            SyncError::Event(EventError::Malformed(_)) => "Invalid event payload".to_string(),
            SyncError::UserNotFound => "User not found".to_string(),
        }
    }
}

impl IntoResponse for SyncError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            warn!(error = %self, "request rejected");
        }
        (status, Json(MessageBody::new(self.public_message()))).into_response()
    }
}

/// Every response body this service produces.
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
