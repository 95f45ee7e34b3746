//! Error types for bootstrap security resolution.
//!
//! None of these cross the boundary of [`crate::BootstrapSecurityStore`]:
//! the store turns every failure into an absent lookup result plus a log
//! line or telemetry event.

use thiserror::Error;

/// Why the configuration registry refused an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// The PSK identity is already claimed by a stored configuration
    DuplicateIdentity,
    /// Any other rejection
    Other,
}

/// Rejection returned by [`crate::BootstrapConfigStore::add`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigStoreError {
    /// PSK identity already used for this bootstrap server
    #[error("PSK identity {identity} already used for this bootstrap server by {endpoint}")]
    DuplicateIdentity { identity: String, endpoint: String },

    /// Configuration is not acceptable for the bootstrap server
    #[error("Invalid bootstrap configuration for {endpoint}: {reason}")]
    Invalid { endpoint: String, reason: String },
}

impl ConfigStoreError {
    pub fn kind(&self) -> ConflictKind {
        match self {
            ConfigStoreError::DuplicateIdentity { .. } => ConflictKind::DuplicateIdentity,
            ConfigStoreError::Invalid { .. } => ConflictKind::Other,
        }
    }
}

/// Errors produced while resolving bootstrap parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BootstrapError {
    /// No bootstrap credential record exists for the key
    #[error("No bootstrap credential for {endpoint}")]
    MissingCredential { endpoint: String },

    /// Profile and credential disagree on the security mode of a server role
    #[error(
        "Security mode mismatch between credential and profile for {endpoint} \
         (bootstrap server ok: {bootstrap_ok}, lwm2m server ok: {management_ok})"
    )]
    SecurityModeMismatch {
        endpoint: String,
        bootstrap_ok: bool,
        management_ok: bool,
    },

    /// The configuration registry rejected the resolved configuration
    #[error("Bootstrap configuration registry conflict: {0}")]
    RegistryConflict(#[from] ConfigStoreError),
}

/// Result type for bootstrap resolution.
pub type BootstrapResult<T> = Result<T, BootstrapError>;
