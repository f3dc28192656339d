//! Conversation state types

use serde::{Deserialize, Serialize};

// ============================================================================
// Messages
// ============================================================================

/// Who authored a message in the log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One entry in the append-only conversation log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// ============================================================================
// Conversation Phase
// ============================================================================

/// Where the conversation is in the qualification protocol
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatPhase {
    /// Session just began, greeting not yet seeded
    #[default]
    Greeting,

    /// Ready for the next user message
    AwaitingInput,

    /// One exchange with the assistant is in flight
    Exchanging,

    /// The last exchange failed; surfaced to the caller, then back to `AwaitingInput`
    Errored { message: String },

    /// Lead qualified - conversation is read-only
    Qualified,
}

impl ChatPhase {
    /// Terminal phases never transition out
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChatPhase::Qualified)
    }

    /// An exchange is in flight
    pub fn is_pending(&self) -> bool {
        matches!(self, ChatPhase::Exchanging)
    }

    /// Whether a submit would pass the phase guard (text validation aside)
    pub fn accepts_input(&self) -> bool {
        matches!(self, ChatPhase::AwaitingInput | ChatPhase::Errored { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChatPhase::Greeting => "greeting",
            ChatPhase::AwaitingInput => "awaiting_input",
            ChatPhase::Exchanging => "exchanging",
            ChatPhase::Errored { .. } => "errored",
            ChatPhase::Qualified => "qualified",
        }
    }
}

// ============================================================================
// Context
// ============================================================================

/// Surfaced when the assistant cannot be reached or answers garbage
pub const CONNECTION_ERROR_MESSAGE: &str =
    "Connection issue. Please ensure the backend server is running.";

/// Context for a conversation (immutable for the session's lifetime)
#[derive(Debug, Clone)]
pub struct ChatContext {
    pub session_id: String,
    /// Visitor's name, used for the greeting
    pub visitor_name: String,
}

impl ChatContext {
    pub fn new(session_id: impl Into<String>, visitor_name: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            visitor_name: visitor_name.into(),
        }
    }

    /// Opening assistant message seeded without a network call
    pub fn greeting(&self) -> String {
        format!(
            "Hello {}! I'm your HVAC service assistant. How can I help you today? \
             Are you looking for a repair, installation, or routine maintenance?",
            self.visitor_name
        )
    }
}
