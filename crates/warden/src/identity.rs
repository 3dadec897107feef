//! User records, authenticated identities, and the directory seam

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::password::PasswordHasher;
use crate::AuthResult;

/// A stored user. Owned by the directory; this crate only reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

/// The authenticated principal: a `UserRecord` with secrets stripped.
///
/// Embedded in sessions and tokens as a point-in-time snapshot of the
/// directory; later directory changes do not flow back into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub username: String,
}

impl From<&UserRecord> for Identity {
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id,
            username: record.username.clone(),
        }
    }
}

/// Read-only user lookup consumed by the gateway.
///
/// Directory mutation (user CRUD) happens elsewhere; the authentication
/// path never writes through this seam.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<UserRecord>>;
}

/// In-memory directory, the moral equivalent of a seeded user list.
#[derive(Debug, Default)]
pub struct MemoryUserDirectory {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record keyed by username.
    pub fn insert(&self, record: UserRecord) {
        self.write_lock().insert(record.username.clone(), record);
    }

    /// Seed a user from a plaintext password, hashing it on the way in.
    pub fn register(
        &self,
        id: i64,
        username: impl Into<String>,
        password: &str,
        hasher: &dyn PasswordHasher,
    ) -> AuthResult<()> {
        let username = username.into();
        let password_hash = hasher.hash_password(password)?;
        self.insert(UserRecord {
            id,
            username,
            password_hash,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.read_lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Poisoning only happens after a panic elsewhere; recover the guard
    // instead of propagating.
    fn read_lock(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, UserRecord>> {
        self.users.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_lock(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, UserRecord>> {
        self.users.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<UserRecord>> {
        Ok(self.read_lock().get(username).cloned())
    }
}
