use serde::{Deserialize, Serialize};

use crate::{
    domain::{Message, User, Users},
    error::{ChatErrorKind, ProtocolError},
};

/// Credentials presented when opening a channel. Exactly one variant is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectAuth {
    Session { session_id: String },
    Nickname { nickname: String },
}

impl ConnectAuth {
    pub fn session(session_id: impl Into<String>) -> Self {
        Self::Session {
            session_id: session_id.into(),
        }
    }

    pub fn nickname(nickname: impl Into<String>) -> Self {
        Self::Nickname {
            nickname: nickname.into(),
        }
    }

    /// Query parameter carrying this credential on the socket URL.
    pub fn query_pair(&self) -> (&'static str, &str) {
        match self {
            Self::Session { session_id } => ("session_id", session_id),
            Self::Nickname { nickname } => ("nickname", nickname),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum ClientRequest {
    Join { user: User },
    Message(Message),
}

impl ClientRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::Message(_) => "message",
        }
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Everything the server can push to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum ServerEvent {
    Session { user: User },
    Users { users: Users },
    PeerJoined { user: User },
    PeerLeft { user: User },
    Message(Message),
    Error { kind: ChatErrorKind },
}

impl ServerEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Session { .. } => "session",
            Self::Users { .. } => "users",
            Self::PeerJoined { .. } => "peer-joined",
            Self::PeerLeft { .. } => "peer-left",
            Self::Message(_) => "message",
            Self::Error { .. } => "error",
        }
    }

    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}
