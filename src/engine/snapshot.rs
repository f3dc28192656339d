//! Immutable views of a conversation for the rendering layer

use crate::state_machine::{ChatPhase, Message};
use serde::Serialize;
use std::fmt::Write;

/// Everything a renderer needs after a transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationSnapshot {
    pub phase: ChatPhase,
    pub messages: Vec<Message>,
    pub qualified: bool,
    /// An exchange is in flight
    pub pending: bool,
    pub last_error: Option<String>,
    /// Whether the input box should accept typing
    pub input_enabled: bool,
}

impl ConversationSnapshot {
    pub(crate) fn new(phase: &ChatPhase, messages: &[Message], last_error: Option<&str>) -> Self {
        let qualified = phase.is_terminal();
        let pending = phase.is_pending();
        Self {
            phase: phase.clone(),
            messages: messages.to_vec(),
            qualified,
            pending,
            last_error: last_error.map(String::from),
            input_enabled: !pending && !qualified && !matches!(phase, ChatPhase::Greeting),
        }
    }

    /// Log as `role: content` lines, the format handed to sales staff
    pub fn transcript(&self) -> String {
        let mut out = String::new();
        for (i, message) in self.messages.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let _ = write!(out, "{}: {}", message.role.as_str(), message.content);
        }
        out
    }
}
