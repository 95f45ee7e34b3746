//! Resolved per-endpoint bootstrap configuration.
//!
//! Built by merging the device credential (security material) with the
//! device profile (server connection parameters). Once handed to the
//! [`crate::BootstrapConfigStore`] the store owns it.

use serde::{Deserialize, Serialize};

use crate::credentials::{BootstrapCredentialRecord, SecurityMode, ServerRole};

/// Security section of one server in a bootstrap configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSecurity {
    /// `coap://` or `coaps://` URI of the server
    pub uri: String,
    pub bootstrap_server: bool,
    pub security_mode: SecurityMode,
    pub public_key_or_id: String,
    pub secret_key: String,
    pub server_public_key: String,
    pub short_server_id: u16,
    pub client_hold_off_time: u32,
}

/// Fully merged description of one server role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerDescriptor {
    pub role: ServerRole,
    pub host: String,
    pub port: u16,
    pub lifetime: u32,
    pub binding: String,
    pub security: ServerSecurity,
}

impl ServerDescriptor {
    pub fn security_mode(&self) -> SecurityMode {
        self.security.security_mode
    }
}

/// Merged bootstrap configuration for one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedBootstrapConfig {
    pub endpoint: String,
    /// Bootstrap server, absent when the profile declares none
    pub bootstrap_server: Option<ServerDescriptor>,
    /// Management server, absent when the profile declares none
    pub lwm2m_server: Option<ServerDescriptor>,
}

impl ResolvedBootstrapConfig {
    /// Merge the credential of `record` with its profile server entries.
    pub fn merge(endpoint: &str, record: &BootstrapCredentialRecord) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            bootstrap_server: merge_role(record, ServerRole::Bootstrap),
            lwm2m_server: merge_role(record, ServerRole::Management),
        }
    }

    /// Bootstrap-server security section.
    pub fn security(&self) -> Option<&ServerSecurity> {
        self.bootstrap_server.as_ref().map(|server| &server.security)
    }

    /// PSK identity the bootstrap server will authenticate this endpoint with.
    pub fn psk_identity(&self) -> Option<&str> {
        self.security()
            .filter(|security| security.security_mode == SecurityMode::Psk)
            .map(|security| security.public_key_or_id.as_str())
    }

    pub fn server(&self, role: ServerRole) -> Option<&ServerDescriptor> {
        match role {
            ServerRole::Bootstrap => self.bootstrap_server.as_ref(),
            ServerRole::Management => self.lwm2m_server.as_ref(),
        }
    }
}

fn merge_role(record: &BootstrapCredentialRecord, role: ServerRole) -> Option<ServerDescriptor> {
    let entry = record.server_entry(role)?;
    let credential = record.credential(role);
    let scheme = if credential.security_mode.uses_dtls() {
        "coaps"
    } else {
        "coap"
    };

    Some(ServerDescriptor {
        role,
        host: entry.host.clone(),
        port: entry.port,
        lifetime: entry.lifetime,
        binding: entry.binding.clone(),
        security: ServerSecurity {
            uri: format!("{}://{}:{}", scheme, entry.host, entry.port),
            bootstrap_server: role == ServerRole::Bootstrap,
            security_mode: credential.security_mode,
            public_key_or_id: credential.client_public_key_or_id.clone(),
            secret_key: credential.client_secret_key.clone(),
            server_public_key: credential.server_public_key.clone(),
            short_server_id: entry.short_server_id,
            client_hold_off_time: entry.client_hold_off_time,
        },
    })
}
