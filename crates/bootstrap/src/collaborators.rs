//! Interfaces of the systems the bootstrap security store drives.
//!
//! All collaborators are injected as `Arc<dyn _>` so one instance can be
//! shared by every protocol-engine task.

use crate::bootstrap_config::ResolvedBootstrapConfig;
use crate::credentials::{CredentialBundle, ServerRole};
use crate::error::ConfigStoreError;
use crate::session::ProvisioningSession;

/// Data-access layer that turns a lookup key into a credential bundle.
pub trait CredentialValidator: Send + Sync {
    /// Bundle for `key` (endpoint name or identity).
    ///
    /// Must return a bundle even when nothing is known about `key`.
    fn get_bundle(&self, key: &str, role: ServerRole) -> CredentialBundle;
}

/// Mutable registry the protocol engine consults at handshake time.
pub trait BootstrapConfigStore: Send + Sync {
    fn add(&self, endpoint: &str, config: ResolvedBootstrapConfig) -> Result<(), ConfigStoreError>;

    fn remove(&self, endpoint: &str) -> Option<ResolvedBootstrapConfig>;

    fn get(&self, endpoint: &str) -> Option<ResolvedBootstrapConfig>;

    /// Endpoints with a stored configuration.
    fn keys(&self) -> Vec<String>;
}

/// Listener attached to a registered bootstrap session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapSessionListener {
    pub session: ProvisioningSession,
}

/// Transport service that tracks sessions. Fire-and-forget.
pub trait SessionNotifier: Send + Sync {
    fn register_session(&self, session: &ProvisioningSession, listener: BootstrapSessionListener);
}

/// Reporting sink for per-session telemetry. Fire-and-forget.
pub trait TelemetrySink: Send + Sync {
    fn emit(&self, key: &str, message: &str, session: &ProvisioningSession);
}
