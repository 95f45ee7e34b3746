//! Provisioning sessions and the per-endpoint session registry.
//!
//! The registry holds at most one session per endpoint. A newer session for
//! the same endpoint replaces the older one; nothing is said about the
//! replaced session's validity afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::credentials::RequestContext;

/// 128-bit random session identifier, carried as two 64-bit halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId {
    pub most_significant: u64,
    pub least_significant: u64,
}

impl SessionId {
    /// Fresh identifier from a v4 UUID (OS-seeded CSPRNG).
    pub fn random() -> Self {
        let (most_significant, least_significant) = Uuid::new_v4().as_u64_pair();
        Self {
            most_significant,
            least_significant,
        }
    }

    pub fn as_uuid(&self) -> Uuid {
        Uuid::from_u64_pair(self.most_significant, self.least_significant)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_uuid())
    }
}

/// In-flight bootstrap session bound to one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningSession {
    pub session_id: SessionId,
    pub endpoint: String,
    /// Credential validation the session was opened for
    pub request: Option<RequestContext>,
    /// Creation time (Unix epoch milliseconds)
    pub created_at: u64,
}

impl ProvisioningSession {
    pub fn new(endpoint: impl Into<String>, request: Option<RequestContext>) -> Self {
        Self {
            session_id: SessionId::random(),
            endpoint: endpoint.into(),
            request,
            created_at: current_timestamp(),
        }
    }
}

/// Concurrency-safe endpoint → session map.
///
/// Every operation takes the lock once, so each is atomic on its own.
/// Callers need no external locking.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, ProvisioningSession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `session` for `endpoint`, returning the session it replaced.
    pub fn put(
        &self,
        endpoint: impl Into<String>,
        session: ProvisioningSession,
    ) -> Option<ProvisioningSession> {
        self.write().insert(endpoint.into(), session)
    }

    pub fn get(&self, endpoint: &str) -> Option<ProvisioningSession> {
        self.read().get(endpoint).cloned()
    }

    pub fn remove(&self, endpoint: &str) -> Option<ProvisioningSession> {
        self.write().remove(endpoint)
    }

    pub fn contains(&self, endpoint: &str) -> bool {
        self.read().contains_key(endpoint)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Endpoints with a live session, in no particular order.
    pub fn endpoints(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    // A panic while holding the lock cannot leave the map half-updated,
    // so a poisoned lock is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, ProvisioningSession>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, ProvisioningSession>> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Get current timestamp in milliseconds.
pub(crate) fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
