use serde::Deserialize;
use serde_json::Value;
use thiserror::Error as ThisError;

pub const USER_CREATED: &str = "user.created";
pub const USER_UPDATED: &str = "user.updated";
pub const USER_DELETED: &str = "user.deleted";

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum EventError {
    #[error("event payload is malformed: {0}")]
    Malformed(String),

    #[error("event payload has no user id")]
    MissingId,

    #[error("created user has no email address")]
    MissingEmail,

    #[error("unhandled event type: {0}")]
    Unhandled(String),
}

/// Raw envelope as delivered by the identity provider.
#[derive(Debug, Deserialize)]
pub struct RawEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawEmailAddress {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
}

/// Subset of the provider's user object that this service stores.
#[derive(Debug, Default, Deserialize)]
pub struct RawUserData {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email_addresses: Option<Vec<RawEmailAddress>>,
    #[serde(default)]
    pub primary_email_address_id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Validated user fields carried by create and update events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFields {
    pub id: String,
    pub email: String,
    pub name: String,
    pub image: String,
}

/// A verified webhook, narrowed to the events this service understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserEvent {
    Created(UserFields),
    Updated(UserFields),
    Deleted { id: String },
    Unhandled(String),
}

impl UserEvent {
    /// Parse a verified envelope into a typed event.
    ///
    /// The user id is required for every event kind, recognized or not.
    pub fn from_value(value: Value) -> Result<Self, EventError> {
        let envelope: RawEnvelope =
            serde_json::from_value(value).map_err(|e| EventError::Malformed(e.to_string()))?;

        let data: RawUserData = if envelope.data.is_null() {
            RawUserData::default()
        } else {
            serde_json::from_value(envelope.data)
                .map_err(|e| EventError::Malformed(e.to_string()))?
        };

        let id = data
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(EventError::MissingId)?
            .to_string();

        match envelope.kind.as_str() {
            USER_DELETED => Ok(UserEvent::Deleted { id }),
            USER_CREATED => {
                let fields = UserFields::from_raw(id, &data);
                if fields.email.is_empty() {
                    return Err(EventError::MissingEmail);
                }
                Ok(UserEvent::Created(fields))
            }
            USER_UPDATED => Ok(UserEvent::Updated(UserFields::from_raw(id, &data))),
            other => Ok(UserEvent::Unhandled(other.to_string())),
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            UserEvent::Created(_) => USER_CREATED,
            UserEvent::Updated(_) => USER_UPDATED,
            UserEvent::Deleted { .. } => USER_DELETED,
            UserEvent::Unhandled(kind) => kind,
        }
    }
}

impl UserFields {
    fn from_raw(id: String, data: &RawUserData) -> Self {
        Self {
            id,
            email: resolve_email(data),
            name: display_name(data.first_name.as_deref(), data.last_name.as_deref()),
            image: data.image_url.clone().unwrap_or_default(),
        }
    }
}

/// Prefer the address flagged as primary, else the first listed.
fn resolve_email(data: &RawUserData) -> String {
    let Some(addresses) = data.email_addresses.as_deref() else {
        return String::new();
    };
    let primary = data.primary_email_address_id.as_deref().and_then(|pid| {
        addresses
            .iter()
            .find(|addr| addr.id.as_deref() == Some(pid))
    });
    primary
        .or_else(|| addresses.first())
        .and_then(|addr| addr.email_address.as_deref())
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}

fn display_name(first: Option<&str>, last: Option<&str>) -> String {
    format!("{} {}", first.unwrap_or_default(), last.unwrap_or_default())
        .trim()
        .to_string()
}
