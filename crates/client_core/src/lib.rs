//! Client-side session and message synchronization for the chat.
//!
//! [`SessionController`] owns the client's view of the chat (who we are, who
//! is present, the message log) and drives the connection to the server.
//! Persistence and navigation are reached only through [`SessionStore`] and
//! [`Navigator`].

use anyhow::Result;
use async_trait::async_trait;
use shared::domain::User;

pub mod connection;
mod controller;
pub mod error;
pub mod message_factory;
pub mod reducer;
mod session_store;
pub mod state;
pub mod transport;

pub use connection::{ConnectionManager, Transport, TransportChannel};
pub use controller::SessionController;
pub use error::{ControllerError, TransportError};
pub use message_factory::{Clock, MessageFactory, SystemClock};
pub use session_store::MemorySessionStore;
pub use state::{ChatErrors, ChatState, SessionPhase};
pub use transport::WebSocketTransport;

/// Where the last granted session is kept between runs.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn stored_session_id(&self) -> Result<Option<String>>;
    async fn save_user(&self, user: &User) -> Result<()>;
}

/// Moves the front end into the chat view once a session is granted.
pub trait Navigator: Send + Sync {
    fn navigate_to_chat(&self);
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
