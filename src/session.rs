//! Session lifecycle: start, resume, reset
//!
//! A session pairs the visitor's profile with an opaque id. The two are
//! persisted together and the conversation engine lives exactly as long as
//! the session does.

mod identity;

pub use identity::{IdentityStore, PROFILE_KEY, SESSION_ID_KEY};

use crate::engine::ConversationEngine;
use crate::gateway::AssistantGateway;
use crate::store::{KeyValueStore, StoreError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Contact details collected by the lead form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("Name is required")]
    MissingName,
    #[error("Email is required")]
    MissingEmail,
    #[error("Phone is required")]
    MissingPhone,
}

impl Profile {
    pub fn new(name: impl Into<String>, email: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }

    /// Presence check only; email and phone formats are not inspected
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.name.is_empty() {
            return Err(ProfileError::MissingName);
        }
        if self.email.is_empty() {
            return Err(ProfileError::MissingEmail);
        }
        if self.phone.is_empty() {
            return Err(ProfileError::MissingPhone);
        }
        Ok(())
    }
}

/// One chat engagement tied to one profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub profile: Profile,
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Invalid profile: {0}")]
    InvalidProfile(#[from] ProfileError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Failed to encode profile: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Owns the current session and its conversation engine
pub struct SessionController<S, G> {
    identity: IdentityStore<S>,
    gateway: Arc<G>,
    current: Option<Arc<ConversationEngine<G>>>,
}

impl<S, G> SessionController<S, G>
where
    S: KeyValueStore,
    G: AssistantGateway + 'static,
{
    pub fn new(store: S, gateway: Arc<G>) -> Self {
        Self {
            identity: IdentityStore::new(store),
            gateway,
            current: None,
        }
    }

    /// Begin a new session for `profile`, replacing any saved one
    pub fn start(&mut self, profile: Profile) -> SessionResult<Session> {
        profile.validate()?;

        let session = Session {
            session_id: uuid::Uuid::new_v4().to_string(),
            profile,
        };
        // Persist first so a storage failure leaves nothing half-created
        self.identity.save(&session)?;

        tracing::info!(session_id = %session.session_id, "Session started");
        self.replace_engine(Some(session.clone()));
        Ok(session)
    }

    /// Restore the saved session, if there is a complete one.
    ///
    /// Local-only: the assistant is not asked whether it still knows the id.
    pub fn resume(&mut self) -> SessionResult<Option<Session>> {
        let restored = self.identity.load()?;
        match &restored {
            Some(session) => {
                tracing::info!(session_id = %session.session_id, "Session resumed");
            }
            None => tracing::debug!("No session to resume"),
        }
        self.replace_engine(restored.clone());
        Ok(restored)
    }

    /// Forget the saved session and discard its conversation
    pub fn reset(&mut self) -> SessionResult<()> {
        self.identity.clear()?;
        if let Some(engine) = self.current.take() {
            tracing::info!(session_id = %engine.session().session_id, "Session reset");
            engine.discard();
        }
        Ok(())
    }

    pub fn session(&self) -> Option<&Session> {
        self.current.as_ref().map(|engine| engine.session())
    }

    /// The live conversation, if a session is active
    pub fn conversation(&self) -> Option<Arc<ConversationEngine<G>>> {
        self.current.clone()
    }

    fn replace_engine(&mut self, session: Option<Session>) {
        if let Some(old) = self.current.take() {
            old.discard();
        }
        self.current = session
            .map(|session| Arc::new(ConversationEngine::start(session, Arc::clone(&self.gateway))));
    }
}
