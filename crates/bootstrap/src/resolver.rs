//! Bootstrap parameter resolution.
//!
//! Turns a credential bundle into a [`ResolvedBootstrapConfig`]. Every call
//! that reaches the credential record opens a provisioning session first,
//! whether or not the security modes later turn out to agree.

use std::sync::Arc;

use lwm2m_bootstrap_core::DEFAULT_TELEMETRY_KEY;

use crate::bootstrap_config::ResolvedBootstrapConfig;
use crate::collaborators::{BootstrapSessionListener, SessionNotifier, TelemetrySink};
use crate::credentials::CredentialBundle;
use crate::error::{BootstrapError, BootstrapResult};
use crate::security_mode;
use crate::session::{ProvisioningSession, SessionRegistry};

const ACCESS_GRANTED: &str = "Access connect client with bootstrap server.";
const MODE_MISMATCH: &str = "Different values SecurityMode between of client and profile.";

/// Resolves bundles and registers the provisioning sessions they open.
pub struct BootstrapParameterResolver {
    sessions: Arc<SessionRegistry>,
    notifier: Arc<dyn SessionNotifier>,
    telemetry: Arc<dyn TelemetrySink>,
    telemetry_key: String,
}

impl BootstrapParameterResolver {
    pub fn new(
        sessions: Arc<SessionRegistry>,
        notifier: Arc<dyn SessionNotifier>,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Self {
        Self {
            sessions,
            notifier,
            telemetry,
            telemetry_key: DEFAULT_TELEMETRY_KEY.to_string(),
        }
    }

    /// Use `key` for emitted telemetry instead of the default.
    pub fn with_telemetry_key(mut self, key: impl Into<String>) -> Self {
        self.telemetry_key = key.into();
        self
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    /// Resolve `bundle` into a merged bootstrap configuration.
    ///
    /// Side effects, in order: a new session replaces any session stored
    /// for the endpoint, the session notifier is told about it, and one
    /// telemetry event reports the outcome. The session stays registered
    /// when the security modes disagree.
    pub fn resolve(&self, bundle: &CredentialBundle) -> BootstrapResult<ResolvedBootstrapConfig> {
        let endpoint = bundle.endpoint.as_str();
        let Some(record) = bundle.bootstrap_credential.as_ref() else {
            tracing::error!(endpoint, "no bootstrap credential record to resolve");
            return Err(BootstrapError::MissingCredential {
                endpoint: endpoint.to_string(),
            });
        };

        let session = ProvisioningSession::new(endpoint, bundle.request.clone());
        if let Some(previous) = self.sessions.put(endpoint, session.clone()) {
            tracing::debug!(
                endpoint,
                replaced = %previous.session_id,
                "replaced provisioning session"
            );
        }
        self.notifier.register_session(
            &session,
            BootstrapSessionListener {
                session: session.clone(),
            },
        );

        let check = security_mode::check_record(record);
        if check.is_valid() {
            tracing::info!(endpoint, session = %session.session_id, "bootstrap parameters resolved");
            self.report("info", endpoint, ACCESS_GRANTED, &session);
            Ok(ResolvedBootstrapConfig::merge(endpoint, record))
        } else {
            tracing::error!(
                endpoint,
                bootstrap_ok = check.bootstrap_ok,
                lwm2m_ok = check.management_ok,
                "security mode differs between client credential and profile"
            );
            self.report("error", endpoint, MODE_MISMATCH, &session);
            Err(BootstrapError::SecurityModeMismatch {
                endpoint: endpoint.to_string(),
                bootstrap_ok: check.bootstrap_ok,
                management_ok: check.management_ok,
            })
        }
    }

    fn report(&self, level: &str, endpoint: &str, text: &str, session: &ProvisioningSession) {
        let message = format!("{}: getParametersBootstrap: {} {}", level, endpoint, text);
        self.telemetry.emit(&self.telemetry_key, &message, session);
    }
}
