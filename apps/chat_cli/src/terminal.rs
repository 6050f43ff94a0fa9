//! Terminal side of the chat: the navigation hook and log rendering.

use std::sync::atomic::{AtomicBool, Ordering};

use client_core::{ChatState, Navigator};
use shared::domain::Message;

/// Records that the chat view should be entered; the event loop picks it up.
#[derive(Default)]
pub struct TerminalNavigator {
    pending: AtomicBool,
}

impl TerminalNavigator {
    pub fn take_pending(&self) -> bool {
        self.pending.swap(false, Ordering::SeqCst)
    }
}

impl Navigator for TerminalNavigator {
    fn navigate_to_chat(&self) {
        self.pending.store(true, Ordering::SeqCst);
    }
}

pub fn format_entry(message: &Message) -> String {
    if message.is_notification() {
        format!("* {}", message.value)
    } else {
        format!("{}: {}", message.user, message.value)
    }
}

pub fn format_roster(state: &ChatState) -> String {
    if state.users().is_empty() {
        return "nobody else is here".to_string();
    }
    let names: Vec<&str> = state
        .users()
        .iter()
        .map(|user| {
            if user.same_identity(state.user()) {
                "you"
            } else {
                user.username.as_str()
            }
        })
        .collect();
    format!("present: {}", names.join(", "))
}

/// Prints whatever changed in the state since the last call.
#[derive(Default)]
pub struct Renderer {
    rendered: usize,
    nickname_error_shown: bool,
}

impl Renderer {
    pub fn pending_lines(&mut self, state: &ChatState) -> Vec<String> {
        let mut lines: Vec<String> = state.messages()[self.rendered..]
            .iter()
            .map(format_entry)
            .collect();
        self.rendered = state.messages().len();

        if state.errors().nickname_in_use && !self.nickname_error_shown {
            self.nickname_error_shown = true;
            lines.push("! that nickname is taken, pick another with /nick <name>".to_string());
        }
        lines
    }

    pub fn flush(&mut self, state: &ChatState) {
        for line in self.pending_lines(state) {
            println!("{line}");
        }
    }
}

#[cfg(test)]
#[path = "tests/terminal_tests.rs"]
mod tests;
