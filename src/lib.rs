pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod service;
pub mod types;
pub mod webhook;

pub use error::SyncError;
pub use webhook::WebhookVerifier;
