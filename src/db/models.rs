use crate::types::event::UserFields;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A synchronized user. Serialized with `_id` to match the document layout
/// consumers of this data already expect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct UserRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub name: String,
    pub image: String,
}

impl From<UserFields> for UserRecord {
    fn from(f: UserFields) -> Self {
        Self {
            id: f.id,
            email: f.email,
            name: f.name,
            image: f.image,
        }
    }
}
