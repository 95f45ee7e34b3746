//! TOML fixture files for the `bootstrap-lookup` tool.
//!
//! ```toml
//! [store]
//! telemetry_key = "transportLog"
//!
//! [[devices]]
//! endpoint = "dev-001"
//! identity = "dev-001-psk"
//! security_mode = "PSK"
//!
//! [devices.bootstrap_credential.bootstrap_server]
//! security_mode = "PSK"
//! client_public_key_or_id = "dev-001-psk"
//! client_secret_key = "00112233"
//! ```

use serde::Deserialize;
use std::path::Path;

use lwm2m_bootstrap_core::{BootstrapStoreConfig, CoreError, CoreResult};

use crate::credential_validator::InMemoryCredentialValidator;
use crate::credentials::{
    BootstrapCredentialRecord, CredentialBundle, RequestContext, SecurityDescriptor, SecurityMode,
};

/// One device entry of a fixture file.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceFixture {
    pub endpoint: String,
    /// Alternate lookup key
    #[serde(default)]
    pub identity: Option<String>,
    #[serde(default)]
    pub security_mode: Option<SecurityMode>,
    #[serde(default)]
    pub bootstrap_credential: Option<BootstrapCredentialRecord>,
    #[serde(default)]
    pub security_info: Option<SecurityDescriptor>,
    #[serde(default)]
    pub request: Option<RequestContext>,
}

impl DeviceFixture {
    pub fn into_bundle(self) -> (CredentialBundle, Option<String>) {
        let bundle = CredentialBundle {
            endpoint: self.endpoint,
            security_mode: self.security_mode,
            bootstrap_credential: self.bootstrap_credential,
            security_info: self.security_info,
            request: self.request,
        };
        (bundle, self.identity)
    }
}

/// Parsed fixture file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Fixtures {
    #[serde(default)]
    pub store: BootstrapStoreConfig,
    #[serde(default)]
    pub devices: Vec<DeviceFixture>,
}

impl Fixtures {
    pub fn from_file<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> CoreResult<Self> {
        let fixtures: Self = toml::from_str(content)?;
        fixtures.store.validate()?;
        for device in &fixtures.devices {
            if device.endpoint.trim().is_empty() {
                return Err(CoreError::Config("device endpoint must not be empty".to_string()));
            }
        }
        Ok(fixtures)
    }

    /// Credential validator preloaded with every device.
    pub fn into_validator(self) -> (BootstrapStoreConfig, InMemoryCredentialValidator) {
        let validator = InMemoryCredentialValidator::new();
        for device in self.devices {
            let (bundle, identity) = device.into_bundle();
            validator.insert(bundle, identity.as_deref());
        }
        (self.store, validator)
    }
}
