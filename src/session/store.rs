//! Keyed storage of sessions for hosts that serve many callers.

use crate::session::orchestrator::InsightSession;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

/// A session shared between threads.
pub type SharedSession = Arc<Mutex<InsightSession>>;

/// Storage of sessions by identifier.
pub trait SessionStore: Send + Sync {
    /// Store `session` under its own identifier, replacing any previous entry.
    fn put(&self, session: InsightSession) -> SharedSession;

    fn get(&self, id: &str) -> Option<SharedSession>;

    /// Remove a session; returns whether it existed.
    fn delete(&self, id: &str) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local [`SessionStore`].
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, SharedSession>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifiers of all stored sessions, in no particular order.
    pub fn ids(&self) -> Vec<String> {
        self.sessions.read().keys().cloned().collect()
    }
}

impl SessionStore for InMemorySessionStore {
    fn put(&self, session: InsightSession) -> SharedSession {
        let id = session.id().to_string();
        let shared = Arc::new(Mutex::new(session));
        self.sessions.write().insert(id, Arc::clone(&shared));
        shared
    }

    fn get(&self, id: &str) -> Option<SharedSession> {
        self.sessions.read().get(id).cloned()
    }

    fn delete(&self, id: &str) -> bool {
        self.sessions.write().remove(id).is_some()
    }

    fn len(&self) -> usize {
        self.sessions.read().len()
    }
}
