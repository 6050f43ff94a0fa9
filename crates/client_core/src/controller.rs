use std::sync::Arc;

use shared::{
    domain::{Message, User},
    protocol::{ClientRequest, ConnectAuth, ServerEvent},
};
use tracing::{info, warn};

use crate::{
    connection::{ConnectionManager, Transport},
    error::ControllerError,
    message_factory::MessageFactory,
    reducer::{self, Effect},
    state::{ChatState, SessionPhase},
    Navigator, SessionStore,
};

/// Owns the chat state and keeps it in sync with the server.
///
/// Every operation finishes its state change before anything is awaited, so a
/// reader never sees a half-applied update.
pub struct SessionController {
    state: ChatState,
    factory: MessageFactory,
    connection: ConnectionManager,
    store: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl SessionController {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self::new_with_message_factory(transport, store, navigator, MessageFactory::default())
    }

    pub fn new_with_message_factory(
        transport: Arc<dyn Transport>,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
        factory: MessageFactory,
    ) -> Self {
        Self {
            state: ChatState::default(),
            factory,
            connection: ConnectionManager::new(transport),
            store,
            navigator,
        }
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }

    pub fn has_session(&self) -> bool {
        self.state.has_session()
    }

    pub fn has_nickname(&self) -> bool {
        self.state.has_nickname()
    }

    /// Resumes the stored session, if any. Returns whether a resume was started.
    pub async fn restore_session(&mut self) -> bool {
        let session_id = match self.store.stored_session_id().await {
            Ok(Some(session_id)) => session_id,
            Ok(None) => return false,
            Err(err) => {
                warn!("session: failed to read stored session: {err:#}");
                return false;
            }
        };
        info!(%session_id, "session: restoring stored session");
        self.state.phase = SessionPhase::Restoring;
        self.connection.connect(ConnectAuth::session(session_id));
        true
    }

    pub fn connect_with_nickname(&mut self) -> Result<(), ControllerError> {
        if !self.state.has_nickname() {
            return Err(ControllerError::NicknameRequired);
        }
        let nickname = self.state.user.username.clone();
        info!(%nickname, "session: connecting with nickname");
        self.state.phase = SessionPhase::Authenticating;
        self.connection.connect(ConnectAuth::nickname(nickname));
        Ok(())
    }

    pub fn join_chat(&mut self) {
        self.connection.send(ClientRequest::Join {
            user: self.state.user.clone(),
        });
    }

    /// Sets the nickname locally without telling the server.
    pub fn set_nickname(&mut self, username: impl Into<String>) {
        let user = User {
            username: username.into(),
            ..self.state.user.clone()
        };
        self.state.replace_user(user);
    }

    /// Sets the nickname and re-announces the user under it.
    pub fn update_nickname(&mut self, username: impl Into<String>) {
        self.set_nickname(username);
        self.join_chat();
    }

    /// Appends the message to the log right away, then hands it to the
    /// connection. A failed send is not rolled back.
    pub fn send_message(&mut self, text: impl Into<String>) -> Message {
        let message = self.factory.create_user_message(&self.state.user, text);
        self.state.push_message(message.clone());
        self.connection.send(ClientRequest::Message(message.clone()));
        message
    }

    pub async fn next_event(&mut self) -> Option<ServerEvent> {
        self.connection.next_event().await
    }

    pub async fn handle_event(&mut self, event: ServerEvent) {
        let effects = reducer::apply(&mut self.state, &mut self.factory, event);
        self.run_effects(effects).await;
    }

    async fn run_effects(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::PersistUser(user) => {
                    if let Err(err) = self.store.save_user(&user).await {
                        warn!(session_id = %user.session_id, "session: failed to persist user: {err:#}");
                    }
                }
                Effect::NavigateToChat => self.navigator.navigate_to_chat(),
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
