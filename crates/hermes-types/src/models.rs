use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_CHANNEL_NAME: &str = "New Channel";
pub const DEFAULT_CHANNEL_PRIVATE: bool = true;

/// Opaque record identifier. Generated by the storage layer on create and
/// never reassigned. References held in member lists are not required to
/// look like generated ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: RecordId,
    pub name: String,
    pub private: bool,
    /// Member user ids. Not checked against stored users.
    pub users: Vec<RecordId>,
}

impl Channel {
    pub fn has_member(&self, user_id: &RecordId) -> bool {
        self.users.contains(user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: RecordId,
    pub email: String,
    pub display_name: String,
    /// Joined channel ids. Kept independently of `Channel::users`.
    pub channels: Vec<RecordId>,
}

impl User {
    pub fn has_joined(&self, channel_id: &RecordId) -> bool {
        self.channels.contains(channel_id)
    }
}
