//! Bootstrap security resolution and session binding for LwM2M devices.
//!
//! Given an endpoint name or a handshake identity, the
//! [`BootstrapSecurityStore`] resolves the security descriptor the protocol
//! engine needs, merges credential and profile parameters into a
//! [`ResolvedBootstrapConfig`], checks that both agree on the security mode
//! of every server role, and keeps one in-flight [`ProvisioningSession`]
//! per endpoint.
//!
//! # Components
//!
//! - [`security_mode`]: credential/profile security mode agreement
//! - [`BootstrapParameterResolver`]: bundle → configuration, opens sessions
//! - [`SessionRegistry`]: endpoint → session map
//! - [`BootstrapSecurityStore`]: the two lookups used at handshake time
//!
//! Credential storage, the configuration registry, session tracking and
//! telemetry transport are collaborators behind the traits in
//! [`collaborators`]. In-memory and channel-backed implementations are
//! provided for wiring and tests.

pub mod bootstrap_config;
pub mod channels;
pub mod collaborators;
pub mod config_store;
pub mod credential_validator;
pub mod credentials;
pub mod error;
pub mod fixtures;
pub mod resolver;
pub mod security_mode;
pub mod session;
pub mod store;

pub use bootstrap_config::{ResolvedBootstrapConfig, ServerDescriptor, ServerSecurity};
pub use channels::{
    ChannelSessionNotifier, ChannelTelemetrySink, SessionRegistration, TelemetryEvent,
};
pub use collaborators::{
    BootstrapConfigStore, BootstrapSessionListener, CredentialValidator, SessionNotifier,
    TelemetrySink,
};
pub use config_store::InMemoryBootstrapConfigStore;
pub use credential_validator::InMemoryCredentialValidator;
pub use credentials::{
    BootstrapCredentialRecord, CredentialBundle, RequestContext, SecurityDescriptor,
    SecurityMode, ServerCredential, ServerCredentialEntry, ServerRole,
};
pub use error::{BootstrapError, BootstrapResult, ConfigStoreError, ConflictKind};
pub use fixtures::{DeviceFixture, Fixtures};
pub use resolver::BootstrapParameterResolver;
pub use security_mode::SecurityModeCheck;
pub use session::{ProvisioningSession, SessionId, SessionRegistry};
pub use store::BootstrapSecurityStore;

// Re-export core types for convenience
pub use lwm2m_bootstrap_core::{BootstrapStoreConfig, CoreError, CoreResult};
