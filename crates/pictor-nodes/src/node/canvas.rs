//! Layered canvas compositor.
//!
//! The browser owns the scene; the backend asks it to flatten and send
//! the composite back. Notification is two-phase: when the scene data
//! changed since the last run — or the browser flagged the node dirty
//! through the refresh ledger — the node pushes a full scene update;
//! otherwise it only asks the browser for its current state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use pictor_core::{Fingerprint, ImageHandle, Mask, NodeId, PushEvent};
use pictor_rendezvous::Outcome;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::context::InteractiveContext;
use crate::error::NodeResult;
use crate::kind::NodeKind;
use crate::reply::NodeReply;

/// Tracing target for canvas operations.
const TRACING_TARGET: &str = "pictor_nodes::canvas";

/// Push event asking the browser to post back its current canvas state.
pub const GET_STATE_EVENT: &str = "canvas-get-state";

/// Default wait for the composite.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the canvas node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Wait deadline for the composite (optional).
    pub timeout: Option<Duration>,
}

impl CanvasConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self { timeout: None }
    }

    /// Returns the wait deadline, using the default if not set.
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT)
    }

    /// Sets the wait deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Output of a canvas run.
///
/// Empty on timeout or cancel: the compositor has no meaningful
/// fallback input to pass through.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CanvasOutput {
    /// The flattened composite, if one was delivered.
    pub image: Option<ImageHandle>,
    /// Composite coverage, if the browser produced one.
    pub mask: Option<Mask>,
    /// Per-layer placement data with the background dimensions
    /// stamped in.
    pub transforms: Value,
}

/// The canvas compositor adapter.
///
/// Remembers the scene fingerprint of the previous run per node so an
/// unchanged scene downgrades the notification to a state request.
#[derive(Debug, Clone, Default)]
pub struct Canvas {
    config: CanvasConfig,
    last_scene: Arc<Mutex<HashMap<NodeId, Fingerprint>>>,
}

impl Canvas {
    /// Creates a compositor with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a compositor with custom configuration.
    #[must_use]
    pub fn with_config(config: CanvasConfig) -> Self {
        Self {
            config,
            last_scene: Arc::default(),
        }
    }

    /// Whether `scene` differs from the one seen on the previous run.
    ///
    /// Records the new fingerprint either way.
    fn scene_changed(&self, id: &NodeId, scene: &Value) -> bool {
        let encoded = serde_json::to_vec(scene).unwrap_or_default();
        let fingerprint = Fingerprint::of(encoded);
        let mut seen = self.last_scene.lock().unwrap_or_else(PoisonError::into_inner);
        seen.insert(id.clone(), fingerprint) != Some(fingerprint)
    }

    /// Runs the compositor for one node invocation.
    ///
    /// `scene` carries the serialized layer stack wired into the node,
    /// if any.
    pub async fn run(
        &self,
        ctx: &InteractiveContext,
        id: NodeId,
        scene: Option<&Value>,
    ) -> NodeResult<CanvasOutput> {
        let dirty = ctx.refresh().take(&id);
        let changed = scene.is_some_and(|scene| self.scene_changed(&id, scene));

        let notice = if dirty || changed {
            PushEvent::new(
                NodeKind::Canvas.update_event(),
                id.clone(),
                json!({ "canvasData": scene }),
            )
        } else {
            PushEvent::new(GET_STATE_EVENT, id.clone(), json!({}))
        };

        tracing::debug!(
            target: TRACING_TARGET,
            node_id = %id,
            dirty,
            changed,
            event = %notice.event,
            "requesting composite"
        );

        let handle =
            ctx.rendezvous()
                .begin_wait_with_timeout(id.clone(), notice, self.config.timeout())?;

        match handle.wait().await {
            Outcome::Delivered(NodeReply::Canvas(reply)) => {
                let mut transforms = reply.transforms;
                if let Value::Object(map) = &mut transforms {
                    map.insert(
                        "background".to_owned(),
                        json!({ "width": reply.width, "height": reply.height }),
                    );
                }
                Ok(CanvasOutput {
                    image: Some(reply.image),
                    mask: reply.mask,
                    transforms,
                })
            }
            Outcome::Delivered(other) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    node_id = %id,
                    kind = %other.kind(),
                    "mismatched reply kind; returning empty output"
                );
                Ok(CanvasOutput::default())
            }
            Outcome::Cancelled | Outcome::TimedOut => Ok(CanvasOutput::default()),
        }
    }
}
