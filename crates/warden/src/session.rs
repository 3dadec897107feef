//! Session lifecycle: opaque identifiers bound to identities
//!
//! The store is the only shared mutable state in the subsystem. Entries for
//! distinct identifiers never interfere; operations on the same identifier
//! serialize through the store lock.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::config::SessionConfig;
use crate::identity::Identity;
use crate::{AuthError, AuthResult};

const SESSION_ID_LENGTH: usize = 32;

/// Opaque session identifier, transported as a cookie value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh, unpredictable identifier.
    pub fn generate() -> Self {
        Self(crate::password::generate_session_id())
    }

    /// Accept an identifier presented by a client.
    ///
    /// Anything that could not have been produced by [`SessionId::generate`]
    /// is rejected up front, before the store is consulted.
    pub fn from_string(value: impl Into<String>) -> AuthResult<Self> {
        let value = value.into();
        if value.len() == SESSION_ID_LENGTH && value.chars().all(|c| c.is_ascii_alphanumeric()) {
            Ok(Self(value))
        } else {
            Err(AuthError::Unauthenticated)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Server-side record binding a session identifier to an identity.
#[derive(Debug, Clone)]
pub struct Session {
    pub identity: Identity,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }
}

/// Session storage seam for cookie-based authentication.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create a session for an authenticated identity and return its
    /// identifier.
    async fn create(&self, identity: Identity) -> AuthResult<SessionId>;

    /// Resolve an identifier back to its identity.
    ///
    /// Fails with [`AuthError::Unauthenticated`] when the identifier is
    /// absent or the session has expired.
    async fn get(&self, id: &SessionId) -> AuthResult<Identity>;

    /// Destroy a session. Idempotent: destroying an unknown or
    /// already-destroyed identifier is not an error.
    async fn destroy(&self, id: &SessionId) -> AuthResult<()>;

    /// Remove every expired session; returns how many were removed.
    async fn purge_expired(&self) -> AuthResult<u64>;
}

/// In-memory, lock-guarded session store.
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, Session>>,
    ttl: Option<Duration>,
}

impl MemorySessionStore {
    /// Store without expiry: sessions live until destroyed.
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: None,
        }
    }

    /// Store with an absolute TTL applied to every session at creation.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: Some(ttl),
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        match config.ttl_seconds {
            Some(seconds) => Self::with_ttl(Duration::seconds(seconds as i64)),
            None => Self::new(),
        }
    }

    /// Configured TTL in whole seconds, if any.
    pub fn ttl_seconds(&self) -> Option<i64> {
        self.ttl.map(|ttl| ttl.num_seconds())
    }

    pub fn len(&self) -> usize {
        self.read_lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Poisoning only happens after a panic elsewhere; the map itself stays
    // coherent, so recover the guard instead of propagating.
    fn read_lock(&self) -> std::sync::RwLockReadGuard<'_, HashMap<SessionId, Session>> {
        self.sessions.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_lock(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<SessionId, Session>> {
        self.sessions.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, identity: Identity) -> AuthResult<SessionId> {
        let now = Utc::now();
        let session = Session {
            identity,
            created_at: now,
            expires_at: self.ttl.map(|ttl| now + ttl),
        };

        let mut sessions = self.write_lock();

        // A fresh id must never collide with a live session; retry until
        // vacant.
        let id = loop {
            let candidate = SessionId::generate();
            if !sessions.contains_key(&candidate) {
                break candidate;
            }
        };

        sessions.insert(id.clone(), session);
        tracing::debug!(session = %id, "session created");
        Ok(id)
    }

    async fn get(&self, id: &SessionId) -> AuthResult<Identity> {
        let expired = {
            let sessions = self.read_lock();
            match sessions.get(id) {
                None => return Err(AuthError::Unauthenticated),
                Some(session) if session.is_expired(Utc::now()) => true,
                Some(session) => return Ok(session.identity.clone()),
            }
        };

        if expired {
            // Lazy expiry: drop the entry on first sight past its deadline.
            self.destroy(id).await?;
            tracing::debug!(session = %id, "session expired");
        }
        Err(AuthError::Unauthenticated)
    }

    async fn destroy(&self, id: &SessionId) -> AuthResult<()> {
        let mut sessions = self.write_lock();
        if sessions.remove(id).is_some() {
            tracing::debug!(session = %id, "session destroyed");
        }
        Ok(())
    }

    async fn purge_expired(&self) -> AuthResult<u64> {
        let now = Utc::now();
        let mut sessions = self.write_lock();
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now));
        Ok((before - sessions.len()) as u64)
    }
}
