//! Database module: user records, schema, and the shared connection cache.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows and conversions
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: the user store and its single-row mutations
//! - `cache.rs`: lazily established, process-wide storage handle

pub mod cache;
pub mod models;
pub mod schema;
pub mod sqlite;

pub use cache::ConnectionCache;
pub use models::UserRecord;
pub use schema::SQLITE_INIT;
pub use sqlite::{InsertOutcome, SqlitePool, UserStorage};
