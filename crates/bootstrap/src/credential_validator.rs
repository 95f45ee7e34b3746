//! In-memory credential validator.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::collaborators::CredentialValidator;
use crate::credentials::{CredentialBundle, ServerRole};

#[derive(Debug, Default)]
struct Inner {
    by_endpoint: HashMap<String, CredentialBundle>,
    /// identity -> endpoint
    identities: HashMap<String, String>,
}

/// Credential validator serving bundles registered up front.
///
/// Keys are matched against endpoint names first, then identities.
/// Management-role lookups never see the bootstrap credential record.
#[derive(Debug, Default)]
pub struct InMemoryCredentialValidator {
    inner: RwLock<Inner>,
}

impl InMemoryCredentialValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bundle` under its endpoint and, optionally, an identity.
    pub fn insert(&self, bundle: CredentialBundle, identity: Option<&str>) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(identity) = identity {
            inner
                .identities
                .insert(identity.to_string(), bundle.endpoint.clone());
        }
        inner.by_endpoint.insert(bundle.endpoint.clone(), bundle);
    }

    pub fn remove(&self, endpoint: &str) -> Option<CredentialBundle> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.identities.retain(|_, owner| owner != endpoint);
        inner.by_endpoint.remove(endpoint)
    }
}

impl CredentialValidator for InMemoryCredentialValidator {
    fn get_bundle(&self, key: &str, role: ServerRole) -> CredentialBundle {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let found = inner.by_endpoint.get(key).or_else(|| {
            inner
                .identities
                .get(key)
                .and_then(|endpoint| inner.by_endpoint.get(endpoint))
        });

        match (found, role) {
            (Some(bundle), ServerRole::Bootstrap) => bundle.clone(),
            (Some(bundle), ServerRole::Management) => CredentialBundle {
                bootstrap_credential: None,
                ..bundle.clone()
            },
            (None, _) => {
                tracing::debug!(key, "no credentials registered");
                CredentialBundle::empty(key)
            }
        }
    }
}
