//! Integration tests for the bootstrap security store.
//!
//! Each scenario asserts on the side effects of a lookup (sessions,
//! configuration registry, queued telemetry and registrations) as well as
//! on its return value.

use std::sync::{Arc, Mutex};

use lwm2m_bootstrap_security::{
    BootstrapConfigStore, BootstrapCredentialRecord, BootstrapSecurityStore,
    BootstrapStoreConfig, ChannelSessionNotifier, ChannelTelemetrySink, ConfigStoreError,
    CredentialBundle, InMemoryBootstrapConfigStore, InMemoryCredentialValidator,
    ResolvedBootstrapConfig, SecurityDescriptor, SecurityMode, ServerCredential,
    ServerCredentialEntry, SessionRegistration, TelemetryEvent,
};
use tokio::sync::mpsc::UnboundedReceiver;

struct Fixture {
    store: Arc<BootstrapSecurityStore>,
    validator: Arc<InMemoryCredentialValidator>,
    registry: Arc<InMemoryBootstrapConfigStore>,
    telemetry: UnboundedReceiver<TelemetryEvent>,
    registrations: UnboundedReceiver<SessionRegistration>,
}

impl Fixture {
    fn new() -> Self {
        Self::with_registry(Arc::new(InMemoryBootstrapConfigStore::new()))
    }

    fn with_registry(registry: Arc<InMemoryBootstrapConfigStore>) -> Self {
        let validator = Arc::new(InMemoryCredentialValidator::new());
        let (sink, telemetry) = ChannelTelemetrySink::new();
        let (notifier, registrations) = ChannelSessionNotifier::new();
        let store = BootstrapSecurityStore::with_config(
            &BootstrapStoreConfig::default(),
            validator.clone(),
            registry.clone(),
            Arc::new(notifier),
            Arc::new(sink),
        );
        Self {
            store: Arc::new(store),
            validator,
            registry,
            telemetry,
            registrations,
        }
    }

    fn drain_telemetry(&mut self) -> Vec<TelemetryEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.telemetry.try_recv() {
            events.push(event);
        }
        events
    }
}

fn profile_entry(bootstrap_server: bool, mode: SecurityMode) -> ServerCredentialEntry {
    ServerCredentialEntry {
        bootstrap_server,
        security_mode: mode,
        short_server_id: if bootstrap_server { 111 } else { 123 },
        host: "0.0.0.0".to_string(),
        port: if bootstrap_server { 5688 } else { 5686 },
        lifetime: 300,
        client_hold_off_time: 1,
        binding: "U".to_string(),
    }
}

/// Device whose credential declares PSK for both roles.
fn psk_device(endpoint: &str, management_profile_mode: SecurityMode) -> CredentialBundle {
    let identity = format!("{}-psk", endpoint);
    CredentialBundle {
        endpoint: endpoint.to_string(),
        security_mode: Some(SecurityMode::Psk),
        bootstrap_credential: Some(BootstrapCredentialRecord {
            bootstrap_server: ServerCredential::psk(identity.clone(), "3061"),
            lwm2m_server: ServerCredential::psk(identity.clone(), "3062"),
            servers: vec![
                profile_entry(true, SecurityMode::Psk),
                profile_entry(false, management_profile_mode),
            ],
        }),
        security_info: Some(SecurityDescriptor::PreSharedKey {
            endpoint: endpoint.to_string(),
            identity,
            key: "3061".to_string(),
        }),
        request: None,
    }
}

#[test]
fn test_dev_001_psk_agreement() {
    let mut fx = Fixture::new();
    fx.validator
        .insert(psk_device("dev-001", SecurityMode::Psk), None);

    let descriptor = fx.store.lookup_by_endpoint("dev-001");

    assert!(descriptor.is_some());
    assert_eq!(fx.registry.keys(), vec!["dev-001".to_string()]);
    let stored = fx.registry.get("dev-001").unwrap();
    assert_eq!(stored.psk_identity(), Some("dev-001-psk"));

    let session = fx.store.get_session("dev-001").unwrap();
    let registration = fx.registrations.try_recv().unwrap();
    assert_eq!(registration.session, session);

    let events = fx.drain_telemetry();
    assert_eq!(events.len(), 1);
    assert!(events[0].message.starts_with("info:"));
    assert_eq!(events[0].session_id, session.session_id);
}

#[test]
fn test_dev_001_management_mode_mismatch() {
    let mut fx = Fixture::new();
    fx.validator
        .insert(psk_device("dev-001", SecurityMode::X509), None);

    let descriptor = fx.store.lookup_by_endpoint("dev-001");

    assert!(descriptor.is_none());
    assert!(fx.registry.get("dev-001").is_none());
    assert!(fx.store.get_session("dev-001").is_some());

    let events = fx.drain_telemetry();
    assert_eq!(events.len(), 1);
    assert!(events[0].message.starts_with("error:"));
}

#[test]
fn test_missing_credential_has_no_side_effects() {
    let mut fx = Fixture::new();
    fx.validator.insert(
        CredentialBundle {
            security_mode: Some(SecurityMode::Psk),
            ..CredentialBundle::empty("dev-404")
        },
        Some("dev-404-psk"),
    );

    assert!(fx.store.lookup_by_endpoint("dev-404").is_none());
    assert!(fx.store.lookup_by_identity("dev-404-psk").is_none());
    assert!(fx.store.lookup_by_endpoint("never-registered").is_none());

    assert!(fx.store.sessions().is_empty());
    assert!(fx.registry.is_empty());
    assert!(fx.registrations.try_recv().is_err());
    assert!(fx.drain_telemetry().is_empty());
}

#[test]
fn test_repeated_endpoint_lookup_keeps_single_entry() {
    let fx = Fixture::new();
    fx.validator
        .insert(psk_device("dev-002", SecurityMode::Psk), None);

    assert!(fx.store.lookup_by_endpoint("dev-002").is_some());
    assert!(fx.store.lookup_by_endpoint("dev-002").is_some());

    assert_eq!(fx.registry.len(), 1);
    assert_eq!(fx.registry.keys(), vec!["dev-002".to_string()]);
}

#[test]
fn test_second_lookup_replaces_session() {
    let fx = Fixture::new();
    fx.validator
        .insert(psk_device("dev-003", SecurityMode::Psk), None);

    fx.store.lookup_by_endpoint("dev-003");
    let first = fx.store.get_session("dev-003").unwrap();
    fx.store.lookup_by_endpoint("dev-003");
    let second = fx.store.get_session("dev-003").unwrap();

    assert_ne!(first.session_id, second.session_id);
    assert_eq!(fx.store.sessions().len(), 1);
}

#[test]
fn test_identity_lookup_without_security_mode() {
    let mut fx = Fixture::new();
    let mut bundle = psk_device("dev-004", SecurityMode::Psk);
    bundle.security_mode = None;
    fx.validator.insert(bundle, Some("dev-004-psk"));

    assert!(fx.store.lookup_by_identity("dev-004-psk").is_none());

    // resolver never ran: no session, no telemetry
    assert!(fx.store.get_session("dev-004").is_none());
    assert!(fx.drain_telemetry().is_empty());
    assert!(fx.registry.is_empty());
}

#[test]
fn test_identity_lookup_stores_under_bundle_endpoint() {
    let fx = Fixture::new();
    fx.validator
        .insert(psk_device("dev-005", SecurityMode::Psk), Some("dev-005-psk"));

    let descriptor = fx.store.lookup_by_identity("dev-005-psk").unwrap();

    assert_eq!(descriptor.endpoint(), "dev-005");
    assert_eq!(fx.registry.keys(), vec!["dev-005".to_string()]);
    assert!(fx.store.get_session("dev-005").is_some());
}

#[test]
fn test_registry_conflict_does_not_change_result() {
    let fx = Fixture::new();
    // Another endpoint already claims the PSK identity dev-006 will present.
    let mut squatter = psk_device("dev-006", SecurityMode::Psk);
    squatter.endpoint = "squatter".to_string();
    let record = squatter.bootstrap_credential.as_ref().unwrap();
    fx.registry
        .add("squatter", ResolvedBootstrapConfig::merge("squatter", record))
        .unwrap();
    fx.validator
        .insert(psk_device("dev-006", SecurityMode::Psk), Some("dev-006-psk"));

    assert!(fx.store.lookup_by_endpoint("dev-006").is_some());
    assert!(fx.store.lookup_by_identity("dev-006-psk").is_some());

    assert!(fx.registry.get("dev-006").is_none());
    assert_eq!(fx.registry.keys(), vec!["squatter".to_string()]);
}

/// Registry wrapper recording the order of mutations.
#[derive(Default)]
struct RecordingRegistry {
    inner: InMemoryBootstrapConfigStore,
    calls: Mutex<Vec<String>>,
}

impl BootstrapConfigStore for RecordingRegistry {
    fn add(&self, endpoint: &str, config: ResolvedBootstrapConfig) -> Result<(), ConfigStoreError> {
        self.calls.lock().unwrap().push(format!("add:{}", endpoint));
        self.inner.add(endpoint, config)
    }

    fn remove(&self, endpoint: &str) -> Option<ResolvedBootstrapConfig> {
        self.calls.lock().unwrap().push(format!("remove:{}", endpoint));
        self.inner.remove(endpoint)
    }

    fn get(&self, endpoint: &str) -> Option<ResolvedBootstrapConfig> {
        self.inner.get(endpoint)
    }

    fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }
}

#[test]
fn test_endpoint_path_removes_before_add_identity_path_does_not() {
    let registry = Arc::new(RecordingRegistry::default());
    let validator = Arc::new(InMemoryCredentialValidator::new());
    validator.insert(psk_device("dev-007", SecurityMode::Psk), Some("dev-007-psk"));
    let (sink, _telemetry) = ChannelTelemetrySink::new();
    let (notifier, _registrations) = ChannelSessionNotifier::new();
    let store = BootstrapSecurityStore::with_config(
        &BootstrapStoreConfig::default(),
        validator,
        registry.clone(),
        Arc::new(notifier),
        Arc::new(sink),
    );

    store.lookup_by_endpoint("dev-007");
    store.lookup_by_endpoint("dev-007");
    store.lookup_by_identity("dev-007-psk");

    let calls = registry.calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![
            "add:dev-007",
            "remove:dev-007",
            "add:dev-007",
            "add:dev-007",
        ]
    );
}

#[test]
fn test_closed_side_channels_do_not_affect_lookup() {
    let fx = Fixture::new();
    let Fixture {
        store,
        validator,
        registry,
        telemetry,
        registrations,
    } = fx;
    drop(telemetry);
    drop(registrations);
    validator.insert(psk_device("dev-008", SecurityMode::Psk), None);

    assert!(store.lookup_by_endpoint("dev-008").is_some());
    assert!(registry.get("dev-008").is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_lookups_for_distinct_endpoints() {
    let mut fx = Fixture::new();
    fx.validator.insert(psk_device("a", SecurityMode::Psk), None);
    fx.validator.insert(psk_device("b", SecurityMode::Psk), None);

    let mut handles = Vec::new();
    for endpoint in ["a", "b"] {
        for _ in 0..25 {
            let store = Arc::clone(&fx.store);
            handles.push(tokio::task::spawn_blocking(move || {
                store.lookup_by_endpoint(endpoint)
            }));
        }
    }
    for handle in handles {
        let descriptor = handle.await.unwrap();
        // Remove-then-add is not atomic, so a racing add for the same
        // endpoint may be rejected; the descriptor is returned regardless.
        assert!(descriptor.is_some());
    }

    for endpoint in ["a", "b"] {
        let session = fx.store.get_session(endpoint).unwrap();
        assert_eq!(session.endpoint, endpoint);
    }
    assert_eq!(fx.store.sessions().len(), 2);

    // A final sequential lookup per endpoint settles the registry.
    fx.store.lookup_by_endpoint("a");
    fx.store.lookup_by_endpoint("b");
    let mut keys = fx.registry.keys();
    keys.sort();
    assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(
        fx.registry.get("a").unwrap().psk_identity(),
        Some("a-psk")
    );
    assert_eq!(
        fx.registry.get("b").unwrap().psk_identity(),
        Some("b-psk")
    );

    let events = fx.drain_telemetry();
    assert_eq!(events.len(), 52);
    assert!(events.iter().all(|event| event.message.starts_with("info:")));
}
