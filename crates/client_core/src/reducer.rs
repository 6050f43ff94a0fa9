//! State transitions for inbound server events.
//!
//! `apply` only touches [`ChatState`]. Anything observable outside the state is
//! returned as an [`Effect`] for the caller to run once the transition is done.

use shared::{domain::User, error::ChatErrorKind, protocol::ServerEvent};
use tracing::{debug, warn};

use crate::{
    message_factory::MessageFactory,
    state::{ChatState, SessionPhase},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    PersistUser(User),
    NavigateToChat,
}

pub fn apply(state: &mut ChatState, factory: &mut MessageFactory, event: ServerEvent) -> Vec<Effect> {
    match event {
        ServerEvent::Session { user } => {
            debug!(session_id = %user.session_id, phase = ?state.phase, "reducer: session established");
            state.replace_user(user.clone());
            state.phase = SessionPhase::Authenticated;
            vec![Effect::PersistUser(user), Effect::NavigateToChat]
        }
        ServerEvent::Users { users } => {
            state.users = users;
            Vec::new()
        }
        ServerEvent::PeerJoined { user } => {
            let notification = factory.joined_notification(&user);
            state.push_message(notification);
            Vec::new()
        }
        ServerEvent::PeerLeft { user } => {
            let notification = factory.left_notification(&user);
            state.push_message(notification);
            Vec::new()
        }
        ServerEvent::Message(message) => {
            state.push_message(message);
            Vec::new()
        }
        ServerEvent::Error { kind } => {
            match kind {
                ChatErrorKind::NicknameInUse => state.errors.nickname_in_use = true,
                ChatErrorKind::Unknown => warn!("reducer: ignoring unknown chat error kind"),
            }
            Vec::new()
        }
    }
}

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod tests;
