//! Events that can occur in a conversation

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // Session events
    SessionStarted,

    // User events
    UserSubmit { text: String },

    // Gateway events
    AssistantReplied { reply: String, qualified: bool },
    GatewayFailed { message: String },

    /// The caller has been shown the failure; leave `Errored`
    ErrorSurfaced,
}

impl Event {
    pub fn user_submit(text: impl Into<String>) -> Self {
        Event::UserSubmit { text: text.into() }
    }

    pub fn replied(reply: impl Into<String>, qualified: bool) -> Self {
        Event::AssistantReplied {
            reply: reply.into(),
            qualified,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Event::SessionStarted => "session_started",
            Event::UserSubmit { .. } => "user_submit",
            Event::AssistantReplied { .. } => "assistant_replied",
            Event::GatewayFailed { .. } => "gateway_failed",
            Event::ErrorSurfaced => "error_surfaced",
        }
    }
}
