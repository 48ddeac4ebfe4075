use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;

use crate::config::{BODY_LIMIT_BYTES, Config};
use crate::db::ConnectionCache;
use crate::error::MessageBody;
use crate::handlers::{users::get_user_handler, webhook::user_webhook_handler};

/// Shared by every request handler.
#[derive(Clone)]
pub struct SyncState {
    pub cache: Arc<ConnectionCache>,
    pub webhook_secret: Option<Arc<str>>,
}

impl SyncState {
    pub fn new(cache: Arc<ConnectionCache>, webhook_secret: Option<&str>) -> Self {
        Self {
            cache,
            webhook_secret: webhook_secret.map(Arc::from),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        let cache = ConnectionCache::new(cfg.database_url().map(str::to_string));
        Self::new(Arc::new(cache), cfg.webhook_secret())
    }
}

pub fn sync_router(state: SyncState) -> Router {
    Router::new()
        .route("/api/webhooks/user", post(user_webhook_handler))
        .route("/api/users/{id}", get(get_user_handler))
        .route("/healthz", get(health_handler))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .with_state(state)
}

async fn health_handler() -> Json<MessageBody> {
    Json(MessageBody::new("ok"))
}
