//! Bootstrap lookup tool
//!
//! Loads credential fixtures, runs one endpoint or identity lookup through
//! the bootstrap security store and prints the outcome as JSON.

use anyhow::{anyhow, bail, Context};
use serde::Serialize;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use lwm2m_bootstrap_core::{logging, LogFormat};
use lwm2m_bootstrap_security::{
    BootstrapSecurityStore, ChannelSessionNotifier, ChannelTelemetrySink, Fixtures,
    InMemoryBootstrapConfigStore, SecurityDescriptor, SessionId, TelemetryEvent,
};

/// Exit code when the lookup finds no security descriptor.
const EXIT_ABSENT: i32 = 2;

#[derive(Debug)]
enum LookupKey {
    Endpoint(String),
    Identity(String),
}

#[derive(Debug)]
struct Args {
    fixtures: PathBuf,
    key: LookupKey,
    json_logs: bool,
}

#[derive(Debug, Serialize)]
struct LookupOutput {
    key: String,
    found: bool,
    security: Option<SecurityDescriptor>,
    session_id: Option<SessionId>,
    registry_keys: Vec<String>,
    telemetry: Vec<TelemetryEvent>,
}

fn parse_args(args: &[String]) -> anyhow::Result<Args> {
    let mut fixtures = None;
    let mut key = None;
    let mut json_logs = false;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--fixtures" => {
                let path = iter.next().ok_or_else(|| anyhow!("--fixtures needs a path"))?;
                fixtures = Some(PathBuf::from(path));
            }
            "--endpoint" => {
                let value = iter.next().ok_or_else(|| anyhow!("--endpoint needs a value"))?;
                key = Some(LookupKey::Endpoint(value.clone()));
            }
            "--identity" => {
                let value = iter.next().ok_or_else(|| anyhow!("--identity needs a value"))?;
                key = Some(LookupKey::Identity(value.clone()));
            }
            "--json-logs" => json_logs = true,
            other => bail!("unknown argument: {}", other),
        }
    }

    Ok(Args {
        fixtures: fixtures.ok_or_else(|| anyhow!("missing required --fixtures <path>"))?,
        key: key.ok_or_else(|| anyhow!("one of --endpoint or --identity is required"))?,
        json_logs,
    })
}

async fn run(args: Args) -> anyhow::Result<bool> {
    let fixtures = Fixtures::from_file(&args.fixtures)
        .with_context(|| format!("loading fixtures from {}", args.fixtures.display()))?;
    let (mut config, validator) = fixtures.into_validator();
    if args.json_logs {
        config.log_format = LogFormat::Json;
    }
    logging::init_from_config(&config);

    let (sink, mut telemetry_rx) = ChannelTelemetrySink::new();
    let (notifier, mut registration_rx) = ChannelSessionNotifier::new();
    let store = BootstrapSecurityStore::with_config(
        &config,
        Arc::new(validator),
        Arc::new(InMemoryBootstrapConfigStore::new()),
        Arc::new(notifier),
        Arc::new(sink),
    );

    let registrations = tokio::spawn(async move {
        while let Some(registration) = registration_rx.recv().await {
            tracing::debug!(
                endpoint = %registration.session.endpoint,
                session = %registration.session.session_id,
                "session registered"
            );
        }
    });

    let (key, security) = match &args.key {
        LookupKey::Endpoint(endpoint) => (endpoint.clone(), store.lookup_by_endpoint(endpoint)),
        LookupKey::Identity(identity) => (identity.clone(), store.lookup_by_identity(identity)),
    };
    let endpoint = security
        .as_ref()
        .map(|descriptor| descriptor.endpoint().to_string())
        .unwrap_or_else(|| key.clone());
    let session_id = store.get_session(&endpoint).map(|session| session.session_id);
    let mut registry_keys = store.config_store().keys();
    registry_keys.sort();

    // Closing the senders lets both drains finish.
    drop(store);
    let mut telemetry = Vec::new();
    while let Some(event) = telemetry_rx.recv().await {
        telemetry.push(event);
    }
    registrations.await.context("session drain task failed")?;

    let output = LookupOutput {
        key,
        found: security.is_some(),
        security,
        session_id,
        registry_keys,
        telemetry,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(output.found)
}

#[tokio::main]
async fn main() {
    let argv: Vec<String> = std::env::args().collect();
    let args = match parse_args(&argv) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!(
                "Usage: bootstrap-lookup --fixtures <file.toml> (--endpoint <ep> | --identity <id>) [--json-logs]"
            );
            process::exit(1);
        }
    };

    match run(args).await {
        Ok(true) => {}
        Ok(false) => process::exit(EXIT_ABSENT),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}
