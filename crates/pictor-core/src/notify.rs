//! Outbound push notifications toward the browser.
//!
//! The host owns the actual delivery channel (a websocket feed in this
//! workspace's server crate); the coordinator and the adapters only
//! know this trait. Delivery is fire-and-forget: a rendezvous whose
//! notification reaches nobody simply times out and falls back.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PushError;
use crate::id::NodeId;

/// One notification pushed to the browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushEvent {
    /// Event name the browser dispatches on, e.g. `bridge-preview-update`.
    pub event: String,
    /// Node invocation the event belongs to.
    pub node_id: NodeId,
    /// Node-specific preview payload.
    pub payload: Value,
}

impl PushEvent {
    /// Creates a push event.
    pub fn new(event: impl Into<String>, node_id: NodeId, payload: Value) -> Self {
        Self {
            event: event.into(),
            node_id,
            payload,
        }
    }
}

/// Sink for push events.
///
/// Implementations must be cheap to call from the coordinator's
/// critical path; anything slow belongs behind a channel.
pub trait PushNotifier: Send + Sync {
    /// Delivers one event toward the browser.
    fn push(&self, event: PushEvent) -> Result<(), PushError>;
}

/// Notifier that drops every event.
///
/// Used in tests and headless runs where no browser is attached; every
/// rendezvous then resolves by completion over HTTP or by timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl PushNotifier for NullNotifier {
    fn push(&self, _event: PushEvent) -> Result<(), PushError> {
        Ok(())
    }
}
