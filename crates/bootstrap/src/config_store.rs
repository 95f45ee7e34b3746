//! In-memory bootstrap configuration registry.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::bootstrap_config::ResolvedBootstrapConfig;
use crate::collaborators::BootstrapConfigStore;
use crate::credentials::SecurityMode;
use crate::error::ConfigStoreError;

/// Registry keeping bootstrap configurations in a locked map.
///
/// `add` refuses a PSK identity that any stored configuration already uses,
/// including one stored under the same endpoint. Replacing an endpoint's
/// PSK configuration therefore needs a `remove` first.
#[derive(Debug, Default)]
pub struct InMemoryBootstrapConfigStore {
    configs: RwLock<HashMap<String, ResolvedBootstrapConfig>>,
}

impl InMemoryBootstrapConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.configs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn check_config(endpoint: &str, config: &ResolvedBootstrapConfig) -> Result<(), ConfigStoreError> {
    let Some(security) = config.security() else {
        return Ok(());
    };
    if security.security_mode == SecurityMode::Psk {
        if security.public_key_or_id.is_empty() {
            return Err(ConfigStoreError::Invalid {
                endpoint: endpoint.to_string(),
                reason: "PSK identity must not be empty".to_string(),
            });
        }
        if security.secret_key.is_empty() {
            return Err(ConfigStoreError::Invalid {
                endpoint: endpoint.to_string(),
                reason: "PSK secret key must not be empty".to_string(),
            });
        }
    }
    Ok(())
}

impl BootstrapConfigStore for InMemoryBootstrapConfigStore {
    fn add(&self, endpoint: &str, config: ResolvedBootstrapConfig) -> Result<(), ConfigStoreError> {
        check_config(endpoint, &config)?;

        let mut configs = self.configs.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(identity) = config.psk_identity() {
            let claimed = configs
                .iter()
                .find(|(_, stored)| stored.psk_identity() == Some(identity));
            if let Some((owner, _)) = claimed {
                return Err(ConfigStoreError::DuplicateIdentity {
                    identity: identity.to_string(),
                    endpoint: owner.clone(),
                });
            }
        }

        configs.insert(endpoint.to_string(), config);
        Ok(())
    }

    fn remove(&self, endpoint: &str) -> Option<ResolvedBootstrapConfig> {
        self.configs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(endpoint)
    }

    fn get(&self, endpoint: &str) -> Option<ResolvedBootstrapConfig> {
        self.configs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(endpoint)
            .cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.configs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}
