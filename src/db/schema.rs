//! SQL DDL for initializing the user store.

/// SQLite schema with:
/// - `id` TEXT PRIMARY KEY, assigned by the identity provider
/// - `email`, `name`, `image` stored as plain text, empty when unknown
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY NOT NULL,
    email TEXT NOT NULL DEFAULT '',
    name TEXT NOT NULL DEFAULT '',
    image TEXT NOT NULL DEFAULT ''
);
"#;
