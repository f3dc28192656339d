//! Persisted visitor identity

use super::{Profile, Session, SessionResult};
use crate::store::KeyValueStore;

/// Storage key holding the JSON-encoded profile
pub const PROFILE_KEY: &str = "profile";
/// Storage key holding the opaque session id
pub const SESSION_ID_KEY: &str = "sessionId";

/// Reads and writes the `{profile, sessionId}` pair.
///
/// Both keys are always written together and cleared together.
pub struct IdentityStore<S> {
    store: S,
}

impl<S: KeyValueStore> IdentityStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn save(&self, session: &Session) -> SessionResult<()> {
        let profile = serde_json::to_string(&session.profile)?;
        self.store.set_all(&[
            (PROFILE_KEY, profile.as_str()),
            (SESSION_ID_KEY, session.session_id.as_str()),
        ])?;
        Ok(())
    }

    /// Restore the saved session. Anything missing or malformed means there
    /// is no session to resume.
    pub fn load(&self) -> SessionResult<Option<Session>> {
        let profile = self.store.get(PROFILE_KEY)?;
        let session_id = self.store.get(SESSION_ID_KEY)?;

        let (Some(profile), Some(session_id)) = (profile, session_id) else {
            tracing::debug!("No complete saved session");
            return Ok(None);
        };

        if session_id.trim().is_empty() {
            tracing::debug!("Saved session id is blank, ignoring");
            return Ok(None);
        }

        let profile: Profile = match serde_json::from_str(&profile) {
            Ok(p) => p,
            Err(e) => {
                tracing::debug!(error = %e, "Saved profile is not valid JSON, ignoring");
                return Ok(None);
            }
        };

        if let Err(e) = profile.validate() {
            tracing::debug!(error = %e, "Saved profile is incomplete, ignoring");
            return Ok(None);
        }

        Ok(Some(Session {
            session_id,
            profile,
        }))
    }

    pub fn clear(&self) -> SessionResult<()> {
        self.store.remove_all(&[PROFILE_KEY, SESSION_ID_KEY])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn session() -> Session {
        Session {
            session_id: "sess-1".to_string(),
            profile: Profile::new("Ana", "a@x.com", "555"),
        }
    }

    #[test]
    fn test_save_writes_both_keys() {
        let store = Arc::new(MemoryStore::new());
        let identity = IdentityStore::new(Arc::clone(&store));

        identity.save(&session()).unwrap();

        assert_eq!(store.get(SESSION_ID_KEY).unwrap().as_deref(), Some("sess-1"));
        let raw = store.get(PROFILE_KEY).unwrap().unwrap();
        let profile: Profile = serde_json::from_str(&raw).unwrap();
        assert_eq!(profile, session().profile);
        assert_eq!(identity.load().unwrap(), Some(session()));
    }

    #[test]
    fn test_partial_state_is_no_session() {
        let store = Arc::new(MemoryStore::new());
        let identity = IdentityStore::new(Arc::clone(&store));

        store.set_all(&[(SESSION_ID_KEY, "sess-1")]).unwrap();
        assert_eq!(identity.load().unwrap(), None);

        store.remove_all(&[SESSION_ID_KEY]).unwrap();
        store
            .set_all(&[(PROFILE_KEY, r#"{"name":"Ana","email":"a@x.com","phone":"555"}"#)])
            .unwrap();
        assert_eq!(identity.load().unwrap(), None);
    }

    #[test]
    fn test_malformed_state_is_no_session() {
        let store = Arc::new(MemoryStore::new());
        let identity = IdentityStore::new(Arc::clone(&store));

        for (profile, id) in [
            ("not json", "sess-1"),
            (r#"{"name":"Ana"}"#, "sess-1"),
            (r#"{"name":"","email":"a@x.com","phone":"555"}"#, "sess-1"),
            (r#"{"name":"Ana","email":"a@x.com","phone":"555"}"#, "  "),
        ] {
            store
                .set_all(&[(PROFILE_KEY, profile), (SESSION_ID_KEY, id)])
                .unwrap();
            assert_eq!(identity.load().unwrap(), None, "{profile} / {id:?}");
        }
    }

    #[test]
    fn test_clear_is_idempotent() {
        let identity = IdentityStore::new(MemoryStore::new());
        identity.save(&session()).unwrap();

        identity.clear().unwrap();
        identity.clear().unwrap();
        assert_eq!(identity.load().unwrap(), None);
    }
}
