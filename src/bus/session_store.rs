use super::{BusConnection, BusError, PullRequest};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub const SESSION_KEY_PREFIX: &str = "slashvibeprs:";
pub const SESSION_TTL: Duration = Duration::from_secs(60 * 60);

/// Pull requests offered by one selection dialog, keyed on the bus by view id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DialogSession {
    pub repo: String,
    pub prs: Vec<PullRequest>,
}

impl DialogSession {
    pub fn find(&self, key: &str) -> Option<&PullRequest> {
        let key = key.trim();
        self.prs.iter().find(|pr| pr.number.to_string() == key)
    }
}

/// Absence is an expected state on `get` and a no-op on `delete`.
pub trait SessionStore {
    fn put(&self, view_id: &str, session: &DialogSession, ttl: Duration) -> Result<(), BusError>;
    fn get(&self, view_id: &str) -> Result<Option<DialogSession>, BusError>;
    fn delete(&self, view_id: &str) -> Result<(), BusError>;
}

pub fn session_key(view_id: &str) -> String {
    format!("{SESSION_KEY_PREFIX}{view_id}")
}

pub struct RedisSessionStore {
    conn: Arc<BusConnection>,
}

impl RedisSessionStore {
    pub fn new(conn: Arc<BusConnection>) -> Self {
        Self { conn }
    }
}

impl SessionStore for RedisSessionStore {
    fn put(&self, view_id: &str, session: &DialogSession, ttl: Duration) -> Result<(), BusError> {
        let encoded = serde_json::to_string(session).map_err(|source| BusError::Encode {
            what: "dialog session",
            source,
        })?;
        self.conn.set_with_ttl(&session_key(view_id), &encoded, ttl)
    }

    fn get(&self, view_id: &str) -> Result<Option<DialogSession>, BusError> {
        let Some(raw) = self.conn.get(&session_key(view_id))? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| BusError::Decode {
                what: "dialog session",
                source,
            })
    }

    fn delete(&self, view_id: &str) -> Result<(), BusError> {
        self.conn.delete(&session_key(view_id))
    }
}

/// Process-local store with the same expiry semantics as the Redis one.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, (DialogSession, Instant)>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for MemorySessionStore {
    fn put(&self, view_id: &str, session: &DialogSession, ttl: Duration) -> Result<(), BusError> {
        let mut entries = self.entries.lock().map_err(|_| BusError::Poisoned)?;
        entries.insert(
            session_key(view_id),
            (session.clone(), Instant::now() + ttl),
        );
        Ok(())
    }

    fn get(&self, view_id: &str) -> Result<Option<DialogSession>, BusError> {
        let mut entries = self.entries.lock().map_err(|_| BusError::Poisoned)?;
        let key = session_key(view_id);
        match entries.get(&key) {
            Some((_, expires_at)) if *expires_at <= Instant::now() => {
                entries.remove(&key);
                Ok(None)
            }
            Some((session, _)) => Ok(Some(session.clone())),
            None => Ok(None),
        }
    }

    fn delete(&self, view_id: &str) -> Result<(), BusError> {
        let mut entries = self.entries.lock().map_err(|_| BusError::Poisoned)?;
        entries.remove(&session_key(view_id));
        Ok(())
    }
}
