use serde::{Deserialize, Serialize};

/// Sender label reserved for system-generated log entries.
pub const APP_SENDER: &str = "App";

/// A chat participant as seen by this client.
///
/// `user_id` and `session_id` are assigned by the server. `username` is chosen
/// locally and may be set before any session exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub username: String,
}

impl User {
    pub fn with_username(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Self::default()
        }
    }

    /// `user_id` when the server assigned one, otherwise `session_id`.
    pub fn identity(&self) -> &str {
        if self.user_id.is_empty() {
            &self.session_id
        } else {
            &self.user_id
        }
    }

    pub fn same_identity(&self, other: &User) -> bool {
        !self.identity().is_empty() && self.identity() == other.identity()
    }

    pub fn has_session(&self) -> bool {
        !self.session_id.is_empty()
    }

    pub fn has_nickname(&self) -> bool {
        !self.username.is_empty()
    }
}

pub type Users = Vec<User>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub user: String,
    pub value: String,
}

impl Message {
    pub fn is_notification(&self) -> bool {
        self.user == APP_SENDER
    }
}
