use crate::db::sqlite::UserStorage;
use crate::error::SyncError;
use tokio::sync::OnceCell;
use tracing::{error, info};

/// Lazily connected, process-wide storage handle.
///
/// The first caller starts the connection attempt; callers arriving while it is
/// in flight wait on it and never open a second pool. A successful attempt is
/// shared by every waiter. A failed attempt is not: the cache stays empty and
/// the next waiter in line starts its own attempt, so during an outage queued
/// callers retry one after another rather than all failing on the first error.
pub struct ConnectionCache {
    database_url: Option<String>,
    cell: OnceCell<UserStorage>,
}

impl ConnectionCache {
    pub fn new(database_url: Option<String>) -> Self {
        Self {
            database_url: database_url
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty()),
            cell: OnceCell::new(),
        }
    }

    /// A cache that is already connected.
    pub fn with_storage(storage: UserStorage) -> Self {
        Self {
            database_url: None,
            cell: OnceCell::new_with(Some(storage)),
        }
    }

    /// Fetch the shared storage, connecting on first use.
    ///
    /// Missing configuration is an error; a failed connection attempt is logged
    /// and reported as `Ok(None)`.
    pub async fn get(&self) -> Result<Option<UserStorage>, SyncError> {
        if let Some(storage) = self.cell.get() {
            return Ok(Some(storage.clone()));
        }

        let url = self
            .database_url
            .as_deref()
            .ok_or(SyncError::MissingDatabaseUrl)?;

        let attempt = self
            .cell
            .get_or_try_init(|| async {
                info!("opening database connection");
                UserStorage::connect(url).await
            })
            .await;

        match attempt {
            Ok(storage) => Ok(Some(storage.clone())),
            Err(e) => {
                error!(error = %e, "database connection failed");
                Ok(None)
            }
        }
    }

    #[cfg(test)]
    pub fn is_connected(&self) -> bool {
        self.cell.initialized()
    }
}
