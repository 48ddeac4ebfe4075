use axum::{Json, extract::State};
use tracing::info;

use crate::error::{MessageBody, SyncError};
use crate::middleware::webhook_request::VerifiedWebhook;
use crate::router::SyncState;
use crate::service::user_sync::UserSync;
use crate::types::event::{EventError, UserEvent};

/// POST /api/webhooks/user -> applies one verified user lifecycle event.
pub async fn user_webhook_handler(
    State(state): State<SyncState>,
    VerifiedWebhook(body): VerifiedWebhook,
) -> Result<Json<MessageBody>, SyncError> {
    let event = UserEvent::from_value(body)?;

    // Rejected before the store is touched.
    if let UserEvent::Unhandled(kind) = event {
        return Err(EventError::Unhandled(kind).into());
    }

    let storage = state
        .cache
        .get()
        .await?
        .ok_or(SyncError::DatabaseUnavailable)?;

    let kind = event.kind().to_string();
    let outcome = UserSync::new(storage).apply(event).await?;
    info!(event = %kind, ?outcome, "webhook processed");

    Ok(Json(MessageBody::new(outcome.message())))
}
