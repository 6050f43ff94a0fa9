//! Construction of log entries.
//!
//! Ids come from a millisecond clock reading, clamped so that every id handed
//! out by one factory is strictly greater than the previous one. Bursts within
//! a single clock tick therefore still get distinct ids.

use std::sync::Arc;

use chrono::Utc;
use shared::domain::{Message, User, APP_SENDER};

pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

pub struct MessageFactory {
    clock: Arc<dyn Clock>,
    last_id: i64,
}

impl Default for MessageFactory {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl MessageFactory {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock, last_id: 0 }
    }

    fn next_id(&mut self) -> i64 {
        let id = self.clock.now_millis().max(self.last_id + 1);
        self.last_id = id;
        id
    }

    pub fn create_user_message(&mut self, user: &User, value: impl Into<String>) -> Message {
        Message {
            id: self.next_id(),
            user: user.username.clone(),
            value: value.into(),
        }
    }

    pub fn create_notification(&mut self, value: impl Into<String>) -> Message {
        Message {
            id: self.next_id(),
            user: APP_SENDER.to_string(),
            value: value.into(),
        }
    }

    pub fn joined_notification(&mut self, user: &User) -> Message {
        self.create_notification(format!("\"{}\" joined", user.username))
    }

    pub fn left_notification(&mut self, user: &User) -> Message {
        self.create_notification(format!("\"{}\" left", user.username))
    }
}

#[cfg(test)]
#[path = "tests/message_factory_tests.rs"]
mod tests;
