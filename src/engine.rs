//! Conversation engine
//!
//! Runs the pure state machine against the assistant gateway. The phase guard
//! in [`transition`] is the only concurrency control: the mutex below is held
//! just long enough to apply a transition and is never held across the
//! gateway call.

mod snapshot;

#[cfg(test)]
pub mod testing;

pub use snapshot::ConversationSnapshot;

use crate::gateway::{AssistantGateway, ExchangeRequest};
use crate::session::Session;
use crate::state_machine::{
    transition, ChatContext, ChatPhase, Effect, Event, Message, TransitionError,
    CONNECTION_ERROR_MESSAGE,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::watch;

/// How an accepted submit ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// The assistant answered; `qualified` is the flag it returned
    Replied { qualified: bool },
    /// The exchange failed; `error` is what the caller should show
    Failed { error: String },
    /// The session was reset while the exchange was in flight
    Discarded,
}

/// Why a submit was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Rejected(#[from] TransitionError),
    #[error("Session was reset")]
    SessionReset,
}

/// Mutable conversation state, only touched under the lock
#[derive(Debug, Default)]
struct Conversation {
    phase: ChatPhase,
    messages: Vec<Message>,
    last_error: Option<String>,
    discarded: bool,
}

impl Conversation {
    fn snapshot(&self) -> ConversationSnapshot {
        ConversationSnapshot::new(&self.phase, &self.messages, self.last_error.as_deref())
    }
}

/// Owns the message log and qualification state for one session
pub struct ConversationEngine<G> {
    context: ChatContext,
    session: Session,
    gateway: Arc<G>,
    conversation: Mutex<Conversation>,
    snapshot_tx: watch::Sender<ConversationSnapshot>,
}

impl<G: AssistantGateway> ConversationEngine<G> {
    /// Create the engine and seed the greeting (no network call)
    pub fn start(session: Session, gateway: Arc<G>) -> Self {
        let context = ChatContext::new(&session.session_id, &session.profile.name);
        let conversation = Conversation::default();
        let (snapshot_tx, _) = watch::channel(conversation.snapshot());

        let engine = Self {
            context,
            session,
            gateway,
            conversation: Mutex::new(conversation),
            snapshot_tx,
        };

        if let Err(e) = engine.dispatch(Event::SessionStarted) {
            // Greeting is the initial phase, so this only fires on a logic bug
            tracing::error!(error = %e, "Failed to seed greeting");
        }
        engine
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Current state of the conversation
    pub fn snapshot(&self) -> ConversationSnapshot {
        self.lock().snapshot()
    }

    /// Receive a snapshot after every transition
    pub fn subscribe(&self) -> watch::Receiver<ConversationSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Send one user message and wait for the assistant.
    ///
    /// Rejections (blank text, an exchange already in flight, a qualified
    /// lead) return an error and change nothing. Gateway failures are not
    /// errors: the user message stays in the log and the outcome carries the
    /// text to show; resubmitting retries. Dropping the future before the
    /// gateway answers counts as a failure.
    pub async fn submit(&self, text: &str) -> Result<ExchangeOutcome, SubmitError> {
        let Some(message) = self.dispatch(Event::user_submit(text))? else {
            return Err(TransitionError::InvalidTransition(
                "Submit accepted without a gateway request".to_string(),
            )
            .into());
        };
        let pending = PendingExchange::new(self);

        let request = ExchangeRequest {
            session_id: self.session.session_id.clone(),
            profile: self.session.profile.clone(),
            message,
        };

        let (event, outcome) = match self.gateway.exchange(&request).await {
            Ok(reply) => {
                let qualified = reply.qualified;
                (
                    Event::replied(reply.reply, qualified),
                    ExchangeOutcome::Replied { qualified },
                )
            }
            Err(e) => {
                tracing::warn!(
                    session_id = %self.session.session_id,
                    error = %e,
                    "Assistant exchange failed"
                );
                (
                    Event::GatewayFailed {
                        message: CONNECTION_ERROR_MESSAGE.to_string(),
                    },
                    ExchangeOutcome::Failed {
                        error: CONNECTION_ERROR_MESSAGE.to_string(),
                    },
                )
            }
        };
        pending.disarm();

        // The discard check and the transition share one lock
        match self.dispatch(event) {
            Ok(_) => {}
            Err(SubmitError::SessionReset) => {
                tracing::debug!(
                    session_id = %self.session.session_id,
                    "Dropping assistant outcome for a reset session"
                );
                return Ok(ExchangeOutcome::Discarded);
            }
            Err(e) => return Err(e),
        }
        if matches!(outcome, ExchangeOutcome::Failed { .. }) {
            self.dispatch(Event::ErrorSurfaced)?;
        }

        if matches!(outcome, ExchangeOutcome::Replied { qualified: true }) {
            tracing::info!(session_id = %self.session.session_id, "Lead qualified");
        }
        Ok(outcome)
    }

    /// Resolve an exchange whose caller went away as a failure
    fn abandon_exchange(&self) {
        tracing::warn!(
            session_id = %self.session.session_id,
            "Exchange abandoned before the assistant answered"
        );
        let failed = self
            .dispatch(Event::GatewayFailed {
                message: CONNECTION_ERROR_MESSAGE.to_string(),
            })
            .and_then(|_| self.dispatch(Event::ErrorSurfaced));
        if let Err(e) = failed {
            tracing::debug!(error = %e, "Abandoned exchange left as is");
        }
    }

    /// Stop accepting input and drop any reply still in flight
    pub(crate) fn discard(&self) {
        self.lock().discarded = true;
    }

    pub fn is_discarded(&self) -> bool {
        self.lock().discarded
    }

    /// Apply one event and run its local effects.
    ///
    /// Returns the text to send when the transition asks for a reply.
    fn dispatch(&self, event: Event) -> Result<Option<String>, SubmitError> {
        let mut conv = self.lock();
        if conv.discarded {
            return Err(SubmitError::SessionReset);
        }

        let event_name = event.name();
        let result = transition(&conv.phase, &self.context, event)?;
        tracing::debug!(
            session_id = %self.context.session_id,
            event = event_name,
            from = conv.phase.name(),
            to = result.new_state.name(),
            "Conversation transition"
        );
        conv.phase = result.new_state;

        let mut request = None;
        for effect in result.effects {
            match effect {
                Effect::AppendMessage(message) => conv.messages.push(message),
                Effect::SetError(error) => conv.last_error = error,
                Effect::PublishSnapshot => {
                    self.snapshot_tx.send_replace(conv.snapshot());
                }
                Effect::RequestReply { text } => request = Some(text),
            }
        }
        Ok(request)
    }

    fn lock(&self) -> MutexGuard<'_, Conversation> {
        self.conversation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Fails the exchange if `submit` is dropped while awaiting the gateway
struct PendingExchange<'a, G: AssistantGateway> {
    engine: &'a ConversationEngine<G>,
    resolved: bool,
}

impl<'a, G: AssistantGateway> PendingExchange<'a, G> {
    fn new(engine: &'a ConversationEngine<G>) -> Self {
        Self {
            engine,
            resolved: false,
        }
    }

    fn disarm(mut self) {
        self.resolved = true;
    }
}

impl<G: AssistantGateway> Drop for PendingExchange<'_, G> {
    fn drop(&mut self) {
        if !self.resolved {
            self.engine.abandon_exchange();
        }
    }
}
