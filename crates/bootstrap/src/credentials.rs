//! Credential and profile records consumed by bootstrap resolution.
//!
//! A [`CredentialBundle`] is produced per lookup by the external credential
//! validator. It is owned by the call that requested it and never stored.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Authentication scheme declared for a server role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SecurityMode {
    /// Pre-shared key
    #[serde(rename = "PSK")]
    Psk,
    /// Raw public key
    #[serde(rename = "RPK")]
    Rpk,
    /// Certificate based
    #[serde(rename = "X509")]
    X509,
    /// Plain CoAP, no DTLS
    #[serde(rename = "NO_SEC")]
    NoSec,
}

impl SecurityMode {
    /// Whether connections in this mode run over DTLS.
    pub fn uses_dtls(&self) -> bool {
        !matches!(self, SecurityMode::NoSec)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityMode::Psk => "PSK",
            SecurityMode::Rpk => "RPK",
            SecurityMode::X509 => "X509",
            SecurityMode::NoSec => "NO_SEC",
        }
    }
}

impl fmt::Display for SecurityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server role a device may be configured to trust.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerRole {
    /// The bootstrap server itself
    Bootstrap,
    /// Post-bootstrap LwM2M management server
    Management,
}

/// Security material the device credential declares for one server role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerCredential {
    /// Declared security mode
    pub security_mode: SecurityMode,
    /// Client public key (RPK/X509) or PSK identity, hex or plain text as stored
    #[serde(default)]
    pub client_public_key_or_id: String,
    /// Client secret key, hex encoded
    #[serde(default)]
    pub client_secret_key: String,
    /// Server public key or certificate, hex encoded
    #[serde(default)]
    pub server_public_key: String,
}

impl ServerCredential {
    pub fn no_sec() -> Self {
        Self {
            security_mode: SecurityMode::NoSec,
            client_public_key_or_id: String::new(),
            client_secret_key: String::new(),
            server_public_key: String::new(),
        }
    }

    pub fn psk(identity: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            security_mode: SecurityMode::Psk,
            client_public_key_or_id: identity.into(),
            client_secret_key: key.into(),
            server_public_key: String::new(),
        }
    }
}

/// One server entry of a device profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerCredentialEntry {
    /// True when this entry describes the bootstrap server
    pub bootstrap_server: bool,
    /// Security mode the profile declares for this server
    pub security_mode: SecurityMode,
    /// LwM2M short server id
    #[serde(default)]
    pub short_server_id: u16,
    pub host: String,
    pub port: u16,
    /// Registration lifetime in seconds
    #[serde(default = "default_lifetime")]
    pub lifetime: u32,
    /// Client hold-off time in seconds
    #[serde(default)]
    pub client_hold_off_time: u32,
    /// Transport binding, e.g. "U"
    #[serde(default = "default_binding")]
    pub binding: String,
}

fn default_lifetime() -> u32 {
    300
}

fn default_binding() -> String {
    "U".to_string()
}

impl ServerCredentialEntry {
    pub fn role(&self) -> ServerRole {
        if self.bootstrap_server {
            ServerRole::Bootstrap
        } else {
            ServerRole::Management
        }
    }
}

/// Bootstrap credential record attached to a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapCredentialRecord {
    /// Credential for the bootstrap server role
    pub bootstrap_server: ServerCredential,
    /// Credential for the management server role
    pub lwm2m_server: ServerCredential,
    /// Server entries taken from the device profile, in profile order
    #[serde(default)]
    pub servers: Vec<ServerCredentialEntry>,
}

impl BootstrapCredentialRecord {
    /// Credential declared for `role`.
    pub fn credential(&self, role: ServerRole) -> &ServerCredential {
        match role {
            ServerRole::Bootstrap => &self.bootstrap_server,
            ServerRole::Management => &self.lwm2m_server,
        }
    }

    /// First profile entry for `role`.
    pub fn server_entry(&self, role: ServerRole) -> Option<&ServerCredentialEntry> {
        self.servers.iter().find(|entry| entry.role() == role)
    }
}

/// Device details of the credential validation that produced a bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestContext {
    pub tenant_id: String,
    pub device_id: String,
    pub device_name: String,
    pub device_type: String,
    pub profile_id: String,
}

/// Resolved security information handed to the protocol engine.
///
/// Key material is carried exactly as supplied; decoding is the protocol
/// engine's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SecurityDescriptor {
    PreSharedKey {
        endpoint: String,
        identity: String,
        key: String,
    },
    RawPublicKey {
        endpoint: String,
        public_key: String,
    },
    X509 {
        endpoint: String,
    },
}

impl SecurityDescriptor {
    pub fn endpoint(&self) -> &str {
        match self {
            SecurityDescriptor::PreSharedKey { endpoint, .. }
            | SecurityDescriptor::RawPublicKey { endpoint, .. }
            | SecurityDescriptor::X509 { endpoint } => endpoint,
        }
    }

    pub fn security_mode(&self) -> SecurityMode {
        match self {
            SecurityDescriptor::PreSharedKey { .. } => SecurityMode::Psk,
            SecurityDescriptor::RawPublicKey { .. } => SecurityMode::Rpk,
            SecurityDescriptor::X509 { .. } => SecurityMode::X509,
        }
    }
}

/// Everything the credential validator knows about one lookup key.
///
/// The validator always returns a bundle; absent data shows up as `None`
/// fields, never as a missing bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialBundle {
    /// Endpoint name the credential belongs to
    pub endpoint: String,
    /// Security mode declared by the credential
    #[serde(default)]
    pub security_mode: Option<SecurityMode>,
    /// Bootstrap credential record, if the device has one
    #[serde(default)]
    pub bootstrap_credential: Option<BootstrapCredentialRecord>,
    /// Security descriptor for the protocol engine
    #[serde(default)]
    pub security_info: Option<SecurityDescriptor>,
    /// Originating credential validation
    #[serde(default)]
    pub request: Option<RequestContext>,
}

impl CredentialBundle {
    /// Bundle with no credential data for `endpoint`.
    pub fn empty(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }
}
