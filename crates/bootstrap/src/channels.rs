//! Fire-and-forget side channels backed by tokio mpsc queues.
//!
//! Sends never block and never fail the caller: a closed receiver only
//! produces a debug log line.

use serde::Serialize;
use tokio::sync::mpsc;

use crate::collaborators::{BootstrapSessionListener, SessionNotifier, TelemetrySink};
use crate::session::{ProvisioningSession, SessionId};

/// Telemetry record queued for the reporting sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TelemetryEvent {
    pub key: String,
    pub message: String,
    pub session_id: SessionId,
    pub endpoint: String,
}

/// Telemetry sink that enqueues events on an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelTelemetrySink {
    tx: mpsc::UnboundedSender<TelemetryEvent>,
}

impl ChannelTelemetrySink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TelemetryEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl TelemetrySink for ChannelTelemetrySink {
    fn emit(&self, key: &str, message: &str, session: &ProvisioningSession) {
        let event = TelemetryEvent {
            key: key.to_string(),
            message: message.to_string(),
            session_id: session.session_id,
            endpoint: session.endpoint.clone(),
        };
        if self.tx.send(event).is_err() {
            tracing::debug!(endpoint = %session.endpoint, "telemetry receiver closed, event dropped");
        }
    }
}

/// Session registration queued for the transport service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRegistration {
    pub session: ProvisioningSession,
    pub listener: BootstrapSessionListener,
}

/// Session notifier that enqueues registrations on an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSessionNotifier {
    tx: mpsc::UnboundedSender<SessionRegistration>,
}

impl ChannelSessionNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SessionRegistration>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl SessionNotifier for ChannelSessionNotifier {
    fn register_session(&self, session: &ProvisioningSession, listener: BootstrapSessionListener) {
        let registration = SessionRegistration {
            session: session.clone(),
            listener,
        };
        if self.tx.send(registration).is_err() {
            tracing::debug!(
                endpoint = %session.endpoint,
                "session notifier closed, registration dropped"
            );
        }
    }
}
