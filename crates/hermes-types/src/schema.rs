//! Write-time shape validation for stored records.
//!
//! A write arrives as a [`Draft`]: every field optional, exactly as the caller
//! supplied it. [`Draft::validate`] rejects drafts missing a required field and
//! fills defaults for absent optional ones.
//!
//! Rules shared by every schema:
//! - an absent key and a JSON `null` are both absent
//! - a required text field holding `""` is absent
//! - keys the schema does not declare (including `id`) are dropped
//! - a present field of the wrong JSON type is rejected, never coerced

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{Channel, DEFAULT_CHANNEL_NAME, DEFAULT_CHANNEL_PRIVATE, RecordId, User};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{collection}: document must be a JSON object, got {found}")]
    NotAnObject {
        collection: &'static str,
        found: &'static str,
    },

    #[error("{collection}: required field `{field}` is missing")]
    MissingField {
        collection: &'static str,
        field: &'static str,
    },

    #[error("{collection}: field `{field}` is invalid: {reason}")]
    InvalidField {
        collection: &'static str,
        field: &'static str,
        reason: String,
    },
}

/// A stored record shape.
pub trait Schema: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection (table) the records live in.
    const COLLECTION: &'static str;

    type Draft: Draft<Record = Self>;

    fn id(&self) -> &RecordId;
}

/// An unvalidated write for a [`Schema`].
pub trait Draft: Sized + Send {
    type Record: Schema<Draft = Self>;

    /// Extract a draft from a raw document, field by field.
    fn from_document(doc: &Value) -> Result<Self, ValidationError>;

    /// Check required fields and apply defaults, binding the record to `id`.
    fn validate(self, id: RecordId) -> Result<Self::Record, ValidationError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChannelDraft {
    pub name: Option<String>,
    pub private: Option<bool>,
    pub users: Option<Vec<RecordId>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserDraft {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub channels: Option<Vec<RecordId>>,
}

impl Schema for Channel {
    const COLLECTION: &'static str = "channels";
    type Draft = ChannelDraft;

    fn id(&self) -> &RecordId {
        &self.id
    }
}

impl Schema for User {
    const COLLECTION: &'static str = "users";
    type Draft = UserDraft;

    fn id(&self) -> &RecordId {
        &self.id
    }
}

impl Draft for ChannelDraft {
    type Record = Channel;

    fn from_document(doc: &Value) -> Result<Self, ValidationError> {
        let obj = as_object(Channel::COLLECTION, doc)?;
        Ok(Self {
            name: field(Channel::COLLECTION, obj, "name")?,
            private: field(Channel::COLLECTION, obj, "private")?,
            users: field(Channel::COLLECTION, obj, "users")?,
        })
    }

    fn validate(self, id: RecordId) -> Result<Channel, ValidationError> {
        // An explicit empty list is present; only omission is rejected.
        let users = self.users.ok_or(ValidationError::MissingField {
            collection: Channel::COLLECTION,
            field: "users",
        })?;

        Ok(Channel {
            id,
            name: self.name.unwrap_or_else(|| DEFAULT_CHANNEL_NAME.to_string()),
            private: self.private.unwrap_or(DEFAULT_CHANNEL_PRIVATE),
            users,
        })
    }
}

impl Draft for UserDraft {
    type Record = User;

    fn from_document(doc: &Value) -> Result<Self, ValidationError> {
        let obj = as_object(User::COLLECTION, doc)?;
        Ok(Self {
            email: field(User::COLLECTION, obj, "email")?,
            display_name: field(User::COLLECTION, obj, "displayName")?,
            channels: field(User::COLLECTION, obj, "channels")?,
        })
    }

    fn validate(self, id: RecordId) -> Result<User, ValidationError> {
        Ok(User {
            id,
            email: required_text(User::COLLECTION, "email", self.email)?,
            display_name: required_text(User::COLLECTION, "displayName", self.display_name)?,
            channels: self.channels.unwrap_or_default(),
        })
    }
}

impl From<Channel> for ChannelDraft {
    fn from(channel: Channel) -> Self {
        Self {
            name: Some(channel.name),
            private: Some(channel.private),
            users: Some(channel.users),
        }
    }
}

impl From<User> for UserDraft {
    fn from(user: User) -> Self {
        Self {
            email: Some(user.email),
            display_name: Some(user.display_name),
            channels: Some(user.channels),
        }
    }
}

fn as_object<'a>(
    collection: &'static str,
    doc: &'a Value,
) -> Result<&'a Map<String, Value>, ValidationError> {
    doc.as_object().ok_or(ValidationError::NotAnObject {
        collection,
        found: json_type_name(doc),
    })
}

fn field<T: DeserializeOwned>(
    collection: &'static str,
    obj: &Map<String, Value>,
    key: &'static str,
) -> Result<Option<T>, ValidationError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => T::deserialize(value)
            .map(Some)
            .map_err(|e| ValidationError::InvalidField {
                collection,
                field: key,
                reason: e.to_string(),
            }),
    }
}

fn required_text(
    collection: &'static str,
    field: &'static str,
    value: Option<String>,
) -> Result<String, ValidationError> {
    match value {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(ValidationError::MissingField { collection, field }),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
