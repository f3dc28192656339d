//! Pure state transition function
//!
//! Greeting seeding, user submissions, assistant replies and gateway failures
//! all flow through [`transition`]. The engine executes the returned effects.

use super::{ChatContext, ChatPhase, Effect, Event};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ChatPhase,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ChatPhase) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Message is empty")]
    EmptyMessage,
    #[error("A reply is still pending, wait for it before sending another message")]
    ExchangeInFlight,
    #[error("Lead is already qualified, the conversation is closed")]
    AlreadyQualified,
    #[error("Conversation has not started yet")]
    NotStarted,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs, with no I/O.
pub fn transition(
    state: &ChatPhase,
    context: &ChatContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Session start
        // ============================================================

        // Greeting + SessionStarted -> AwaitingInput (seeded locally, no exchange)
        (ChatPhase::Greeting, Event::SessionStarted) => {
            Ok(TransitionResult::new(ChatPhase::AwaitingInput)
                .with_effect(Effect::append_assistant(context.greeting()))
                .with_effect(Effect::PublishSnapshot))
        }

        // ============================================================
        // User submissions
        // ============================================================

        // Guards come before text validation so a closed conversation
        // rejects every input the same way.
        (ChatPhase::Qualified, Event::UserSubmit { .. }) => Err(TransitionError::AlreadyQualified),
        (ChatPhase::Exchanging, Event::UserSubmit { .. }) => Err(TransitionError::ExchangeInFlight),
        (ChatPhase::Greeting, Event::UserSubmit { .. }) => Err(TransitionError::NotStarted),

        // AwaitingInput | Errored + UserSubmit -> Exchanging
        (ChatPhase::AwaitingInput | ChatPhase::Errored { .. }, Event::UserSubmit { text }) => {
            let text = text.trim();
            if text.is_empty() {
                return Err(TransitionError::EmptyMessage);
            }

            // The user message lands before the reply and stays on failure
            Ok(TransitionResult::new(ChatPhase::Exchanging)
                .with_effect(Effect::SetError(None))
                .with_effect(Effect::append_user(text))
                .with_effect(Effect::PublishSnapshot)
                .with_effect(Effect::RequestReply {
                    text: text.to_string(),
                }))
        }

        // ============================================================
        // Exchange outcomes
        // ============================================================

        // Exchanging + AssistantReplied -> Qualified | AwaitingInput
        (ChatPhase::Exchanging, Event::AssistantReplied { reply, qualified }) => {
            let next = if qualified {
                ChatPhase::Qualified
            } else {
                ChatPhase::AwaitingInput
            };
            Ok(TransitionResult::new(next)
                .with_effect(Effect::append_assistant(reply))
                .with_effect(Effect::PublishSnapshot))
        }

        // Exchanging + GatewayFailed -> Errored (no assistant message)
        (ChatPhase::Exchanging, Event::GatewayFailed { message }) => {
            Ok(TransitionResult::new(ChatPhase::Errored {
                message: message.clone(),
            })
            .with_effect(Effect::surface_error(message))
            .with_effect(Effect::PublishSnapshot))
        }

        // Errored + ErrorSurfaced -> AwaitingInput (error stays visible until next submit)
        (ChatPhase::Errored { .. }, Event::ErrorSurfaced) => {
            Ok(TransitionResult::new(ChatPhase::AwaitingInput).with_effect(Effect::PublishSnapshot))
        }

        // ============================================================
        // Invalid Transitions
        // ============================================================
        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {} with event {}",
            state.name(),
            event.name()
        ))),
    }
}
