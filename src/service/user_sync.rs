use crate::db::models::UserRecord;
use crate::db::sqlite::{InsertOutcome, UserStorage};
use crate::error::SyncError;
use crate::types::event::{EventError, UserEvent};
use tracing::{info, warn};

/// What a dispatched event did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Created,
    /// Creation re-delivered for an id that already exists.
    AlreadyExists,
    Updated,
    /// Update for an unseen id, inserted instead.
    CreatedFromUpdate,
    Deleted,
    /// Delete for an id that was already gone.
    AlreadyDeleted,
}

impl SyncOutcome {
    pub fn message(self) -> &'static str {
        match self {
            SyncOutcome::Created => "User created",
            SyncOutcome::AlreadyExists => "User already exists",
            SyncOutcome::Updated => "User updated",
            SyncOutcome::CreatedFromUpdate => "User created from update",
            SyncOutcome::Deleted => "User deleted",
            SyncOutcome::AlreadyDeleted => "User already deleted",
        }
    }
}

/// Applies user lifecycle events to the store, one row per event.
#[derive(Clone)]
pub struct UserSync {
    storage: UserStorage,
}

impl UserSync {
    pub fn new(storage: UserStorage) -> Self {
        Self { storage }
    }

    pub async fn apply(&self, event: UserEvent) -> Result<SyncOutcome, SyncError> {
        match event {
            UserEvent::Created(fields) => self.create(fields.into()).await,
            UserEvent::Updated(fields) => self.update(fields.into()).await,
            UserEvent::Deleted { id } => self.delete(&id).await,
            UserEvent::Unhandled(kind) => Err(EventError::Unhandled(kind).into()),
        }
    }

    async fn create(&self, user: UserRecord) -> Result<SyncOutcome, SyncError> {
        match self.storage.insert(&user).await? {
            InsertOutcome::Inserted => {
                info!(user_id = %user.id, "user created");
                Ok(SyncOutcome::Created)
            }
            InsertOutcome::Duplicate => {
                warn!(user_id = %user.id, "user already exists; treating create as delivered");
                Ok(SyncOutcome::AlreadyExists)
            }
        }
    }

    async fn update(&self, user: UserRecord) -> Result<SyncOutcome, SyncError> {
        if self.storage.find_and_replace(&user).await? {
            info!(user_id = %user.id, "user updated");
            return Ok(SyncOutcome::Updated);
        }

        warn!(user_id = %user.id, "update for unknown user; inserting instead");
        self.insert_from_update(&user).await
    }

    /// Fallback half of an update. A concurrent create may land between the
    /// missed replace and this insert; the replace is then applied once more.
    async fn insert_from_update(&self, user: &UserRecord) -> Result<SyncOutcome, SyncError> {
        match self.storage.insert(user).await? {
            InsertOutcome::Inserted => Ok(SyncOutcome::CreatedFromUpdate),
            InsertOutcome::Duplicate => {
                self.storage.find_and_replace(user).await?;
                Ok(SyncOutcome::Updated)
            }
        }
    }

    async fn delete(&self, id: &str) -> Result<SyncOutcome, SyncError> {
        if self.storage.find_and_remove(id).await? {
            info!(user_id = %id, "user deleted");
            Ok(SyncOutcome::Deleted)
        } else {
            info!(user_id = %id, "user already absent; nothing to delete");
            Ok(SyncOutcome::AlreadyDeleted)
        }
    }
}
