use crate::db::models::UserRecord;
use crate::db::schema::SQLITE_INIT;
use crate::error::SyncError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use tracing::debug;

pub type SqlitePool = Pool<Sqlite>;

/// Result of an insert that tolerates re-delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A record with this id already exists; nothing was written.
    Duplicate,
}

#[derive(Clone)]
pub struct UserStorage {
    pool: SqlitePool,
}

impl UserStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool for `database_url` and make sure the schema exists.
    pub async fn connect(database_url: &str) -> Result<Self, SyncError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
        let storage = Self::new(pool);
        storage.init_schema().await?;
        debug!("user storage ready");
        Ok(storage)
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), SyncError> {
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Insert a new record. A primary-key collision is reported as
    /// `InsertOutcome::Duplicate` rather than an error.
    pub async fn insert(&self, user: &UserRecord) -> Result<InsertOutcome, SyncError> {
        let result = sqlx::query("INSERT INTO users (id, email, name, image) VALUES (?, ?, ?, ?)")
            .bind(&user.id)
            .bind(&user.email)
            .bind(&user.name)
            .bind(&user.image)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(sqlx::Error::Database(ref db_err)) if db_err.is_unique_violation() => {
                Ok(InsertOutcome::Duplicate)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Replace every mutable field of the record with `user.id`.
    /// Returns `false` when no such record exists.
    pub async fn find_and_replace(&self, user: &UserRecord) -> Result<bool, SyncError> {
        let result = sqlx::query("UPDATE users SET email = ?, name = ?, image = ? WHERE id = ?")
            .bind(&user.email)
            .bind(&user.name)
            .bind(&user.image)
            .bind(&user.id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove the record with `id`. Returns `false` when it was already gone.
    pub async fn find_and_remove(&self, id: &str) -> Result<bool, SyncError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, SyncError> {
        let row = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, name, image FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn count(&self) -> Result<i64, SyncError> {
        let rec: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn storage() -> UserStorage {
        UserStorage::connect("sqlite::memory:").await.unwrap()
    }

    fn user(id: &str, email: &str) -> UserRecord {
        UserRecord {
            id: id.to_string(),
            email: email.to_string(),
            name: "A B".to_string(),
            image: "http://img/a.png".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_then_duplicate() {
        let s = storage().await;
        assert_eq!(s.insert(&user("u_1", "a@x.com")).await.unwrap(), InsertOutcome::Inserted);
        assert_eq!(
            s.insert(&user("u_1", "other@x.com")).await.unwrap(),
            InsertOutcome::Duplicate
        );
        assert_eq!(s.count().await.unwrap(), 1);
        let stored = s.find_by_id("u_1").await.unwrap().unwrap();
        assert_eq!(stored.email, "a@x.com");
    }

    #[tokio::test]
    async fn replace_reports_whether_a_row_matched() {
        let s = storage().await;
        assert!(!s.find_and_replace(&user("u_1", "a@x.com")).await.unwrap());
        s.insert(&user("u_1", "a@x.com")).await.unwrap();

        let mut changed = user("u_1", "b@x.com");
        changed.name = "Renamed".to_string();
        assert!(s.find_and_replace(&changed).await.unwrap());
        assert_eq!(s.find_by_id("u_1").await.unwrap(), Some(changed));
    }

    #[tokio::test]
    async fn remove_reports_whether_a_row_matched() {
        let s = storage().await;
        s.insert(&user("u_1", "a@x.com")).await.unwrap();
        assert!(s.find_and_remove("u_1").await.unwrap());
        assert!(!s.find_and_remove("u_1").await.unwrap());
        assert_eq!(s.find_by_id("u_1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn schema_init_is_idempotent() {
        let s = storage().await;
        s.init_schema().await.unwrap();
        s.init_schema().await.unwrap();
        assert_eq!(s.count().await.unwrap(), 0);
    }
}
