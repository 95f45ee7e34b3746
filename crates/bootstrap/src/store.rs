//! Bootstrap security store consulted by the protocol engine.
//!
//! The two lookups are commands, not queries. A lookup that reaches a
//! credential record:
//! - opens a provisioning session for the endpoint (even if resolution
//!   then fails),
//! - notifies the session notifier and emits one telemetry event,
//! - on success writes the resolved configuration into the
//!   [`BootstrapConfigStore`].
//!
//! Failures never cross this boundary; they end as `None` plus a log line.

use std::sync::Arc;

use lwm2m_bootstrap_core::BootstrapStoreConfig;

use crate::collaborators::{
    BootstrapConfigStore, CredentialValidator, SessionNotifier, TelemetrySink,
};
use crate::credentials::{SecurityDescriptor, ServerRole};
use crate::error::{BootstrapError, ConflictKind};
use crate::resolver::BootstrapParameterResolver;
use crate::session::{ProvisioningSession, SessionRegistry};

/// Resolves security for inbound bootstrap requests and tracks their sessions.
pub struct BootstrapSecurityStore {
    validator: Arc<dyn CredentialValidator>,
    config_store: Arc<dyn BootstrapConfigStore>,
    resolver: BootstrapParameterResolver,
}

impl BootstrapSecurityStore {
    pub fn new(
        validator: Arc<dyn CredentialValidator>,
        config_store: Arc<dyn BootstrapConfigStore>,
        resolver: BootstrapParameterResolver,
    ) -> Self {
        Self {
            validator,
            config_store,
            resolver,
        }
    }

    /// Wire a store with a fresh session registry from loaded settings.
    pub fn with_config(
        config: &BootstrapStoreConfig,
        validator: Arc<dyn CredentialValidator>,
        config_store: Arc<dyn BootstrapConfigStore>,
        notifier: Arc<dyn SessionNotifier>,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Self {
        let resolver =
            BootstrapParameterResolver::new(Arc::new(SessionRegistry::new()), notifier, telemetry)
                .with_telemetry_key(config.telemetry_key.clone());
        Self::new(validator, config_store, resolver)
    }

    /// Security for `endpoint`, refreshing its stored bootstrap configuration.
    ///
    /// Any configuration already stored for the endpoint is removed before
    /// the new one is added. Between the two steps a concurrent reader may
    /// see no entry. A duplicate PSK identity rejection is logged at trace
    /// level, any other rejection at error level; neither changes the
    /// returned descriptor.
    pub fn lookup_by_endpoint(&self, endpoint: &str) -> Option<SecurityDescriptor> {
        let bundle = self.validator.get_bundle(endpoint, ServerRole::Bootstrap);
        if bundle.bootstrap_credential.is_none() {
            tracing::debug!(endpoint, "no bootstrap credential for endpoint");
            return None;
        }

        let config = self.resolver.resolve(&bundle).ok()?;

        for key in self.config_store.keys() {
            if key == endpoint {
                self.config_store.remove(&key);
            }
        }
        if let Err(err) = self.config_store.add(endpoint, config) {
            log_rejection(endpoint, &BootstrapError::from(err), true);
        }

        bundle.security_info
    }

    /// Security for a PSK (or other) identity presented during the handshake.
    ///
    /// Requires both a bootstrap credential record and a declared security
    /// mode. The configuration is added without removing an earlier entry,
    /// and every rejection is logged at error level.
    pub fn lookup_by_identity(&self, identity: &str) -> Option<SecurityDescriptor> {
        let bundle = self.validator.get_bundle(identity, ServerRole::Bootstrap);
        if bundle.bootstrap_credential.is_none() || bundle.security_mode.is_none() {
            tracing::debug!(identity, "no bootstrap credential or security mode for identity");
            return None;
        }

        let config = self.resolver.resolve(&bundle).ok()?;
        if config.security().is_none() {
            tracing::debug!(identity, "resolved configuration has no bootstrap security section");
            return None;
        }

        if let Err(err) = self.config_store.add(&bundle.endpoint, config) {
            log_rejection(&bundle.endpoint, &BootstrapError::from(err), false);
        }

        bundle.security_info
    }

    /// Session currently bound to `endpoint`.
    pub fn get_session(&self, endpoint: &str) -> Option<ProvisioningSession> {
        self.resolver.sessions().get(endpoint)
    }

    /// Unbind and return the session of `endpoint`.
    pub fn remove_session(&self, endpoint: &str) -> Option<ProvisioningSession> {
        self.resolver.sessions().remove(endpoint)
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        self.resolver.sessions()
    }

    pub fn config_store(&self) -> &Arc<dyn BootstrapConfigStore> {
        &self.config_store
    }
}

// TODO: the identity path logs duplicate identities at error level while
// the endpoint path drops them to trace; unify once product confirms which
// level both paths should use.
fn log_rejection(endpoint: &str, err: &BootstrapError, quiet_duplicates: bool) {
    let kind = match err {
        BootstrapError::RegistryConflict(conflict) => conflict.kind(),
        _ => ConflictKind::Other,
    };
    match kind {
        ConflictKind::DuplicateIdentity if quiet_duplicates => {
            tracing::trace!(endpoint, error = %err, "invalid bootstrap configuration");
        }
        _ => {
            tracing::error!(endpoint, error = %err, "invalid bootstrap configuration");
        }
    }
}
