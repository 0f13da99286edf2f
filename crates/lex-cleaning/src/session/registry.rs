//! Registry of live sessions keyed by id.
//!
//! The map itself sits behind a `RwLock`; each session has its own `Mutex`,
//! so operations on one session never wait for another and at most one
//! operation runs on a given session at a time.

use super::SessionState;
use crate::error::{CleaningError, Result};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

pub type SessionId = u64;

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Arc<Mutex<SessionState>>>>,
    next_id: AtomicU64,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session and return its id.
    pub fn insert(&self, state: SessionState) -> SessionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.sessions.write().insert(id, Arc::new(Mutex::new(state)));
        debug!("Registered session {}", id);
        id
    }

    pub fn get(&self, id: SessionId) -> Result<Arc<Mutex<SessionState>>> {
        self.sessions
            .read()
            .get(&id)
            .cloned()
            .ok_or(CleaningError::SessionNotFound(id))
    }

    /// Run `f` with exclusive access to one session.
    pub fn with_session<T>(
        &self,
        id: SessionId,
        f: impl FnOnce(&mut SessionState) -> Result<T>,
    ) -> Result<T> {
        let session = self.get(id)?;
        let mut guard = session.lock();
        f(&mut guard)
    }

    /// End a session, dropping its tables.
    pub fn remove(&self, id: SessionId) -> Result<()> {
        self.sessions
            .write()
            .remove(&id)
            .map(|_| debug!("Removed session {}", id))
            .ok_or(CleaningError::SessionNotFound(id))
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}
