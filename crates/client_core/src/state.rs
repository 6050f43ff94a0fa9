use shared::domain::{Message, User, Users};

/// Where the client is in establishing its identity with the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Unauthenticated,
    /// Resuming a stored session.
    Restoring,
    /// Asking for a fresh session under a nickname.
    Authenticating,
    Authenticated,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChatErrors {
    pub nickname_in_use: bool,
}

/// Client view of the chat. Only the session controller mutates it.
#[derive(Debug, Clone, Default)]
pub struct ChatState {
    pub(crate) user: User,
    pub(crate) users: Users,
    pub(crate) messages: Vec<Message>,
    pub(crate) errors: ChatErrors,
    pub(crate) phase: SessionPhase,
}

impl ChatState {
    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn errors(&self) -> ChatErrors {
        self.errors
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn has_session(&self) -> bool {
        self.user.has_session()
    }

    pub fn has_nickname(&self) -> bool {
        self.user.has_nickname()
    }

    pub(crate) fn replace_user(&mut self, user: User) {
        self.user = user;
    }

    pub(crate) fn push_message(&mut self, message: Message) {
        self.messages.push(message);
    }
}
