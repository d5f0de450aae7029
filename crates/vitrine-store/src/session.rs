//! Session persistence.

use crate::StoreError;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use vitrine_auth::{Session, SessionId};

/// Server-side session store.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load a session by id. Expired sessions are removed and reported
    /// as absent.
    async fn load(&self, id: &SessionId) -> Result<Option<Session>, StoreError>;

    /// Persist a session under its current id.
    async fn save(&self, session: Session) -> Result<(), StoreError>;

    /// Remove a session (logout).
    async fn destroy(&self, id: &SessionId) -> Result<(), StoreError>;
}

/// In-memory session store.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<SessionId, Session>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: &SessionId) -> Result<Option<Session>, StoreError> {
        let mut sessions = self.sessions.lock().await;
        match sessions.get(id) {
            Some(session) if session.is_expired() => {
                sessions.remove(id);
                Ok(None)
            }
            Some(session) => Ok(Some(session.clone())),
            None => Ok(None),
        }
    }

    async fn save(&self, session: Session) -> Result<(), StoreError> {
        let mut sessions = self.sessions.lock().await;
        sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn destroy(&self, id: &SessionId) -> Result<(), StoreError> {
        self.sessions.lock().await.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_load_destroy() {
        let store = MemorySessionStore::new();
        let session = Session::anonymous();
        let id = session.id.clone();

        store.save(session).await.unwrap();
        assert!(store.load(&id).await.unwrap().is_some());

        store.destroy(&id).await.unwrap();
        assert!(store.load(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_session_dropped_on_load() {
        let store = MemorySessionStore::new();
        let mut session = Session::anonymous();
        session.expires_at = 0;
        let id = session.id.clone();

        store.save(session).await.unwrap();
        assert!(store.load(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rekeyed_session_is_a_new_entry() {
        use vitrine_commerce::ids::UserId;

        let store = MemorySessionStore::new();
        let mut session = Session::anonymous();
        let old_id = session.id.clone();
        store.save(session.clone()).await.unwrap();

        // Login rotates the id; the caller destroys the old entry and
        // saves under the new one.
        session.authenticate(UserId::new("u1"));
        store.destroy(&old_id).await.unwrap();
        store.save(session.clone()).await.unwrap();

        assert!(store.load(&old_id).await.unwrap().is_none());
        assert!(store.load(&session.id).await.unwrap().is_some());
    }
}
