//! Effects produced by state transitions

use super::state::Message;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append a message to the conversation log
    AppendMessage(Message),

    /// Send the user's text to the assistant gateway
    RequestReply { text: String },

    /// Replace the error shown to the caller (`None` clears it)
    SetError(Option<String>),

    /// Push a fresh snapshot to subscribers
    PublishSnapshot,
}

impl Effect {
    pub fn append_user(content: impl Into<String>) -> Self {
        Effect::AppendMessage(Message::user(content))
    }

    pub fn append_assistant(content: impl Into<String>) -> Self {
        Effect::AppendMessage(Message::assistant(content))
    }

    pub fn surface_error(message: impl Into<String>) -> Self {
        Effect::SetError(Some(message.into()))
    }
}
