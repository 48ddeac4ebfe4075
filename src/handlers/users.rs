use axum::{
    Json,
    extract::{Path, State},
};

use crate::db::models::UserRecord;
use crate::error::SyncError;
use crate::router::SyncState;

/// GET /api/users/{id} -> the synchronized record, or 404 when absent.
pub async fn get_user_handler(
    State(state): State<SyncState>,
    Path(id): Path<String>,
) -> Result<Json<UserRecord>, SyncError> {
    let storage = state
        .cache
        .get()
        .await?
        .ok_or(SyncError::DatabaseUnavailable)?;

    storage
        .find_by_id(&id)
        .await?
        .map(Json)
        .ok_or(SyncError::UserNotFound)
}
