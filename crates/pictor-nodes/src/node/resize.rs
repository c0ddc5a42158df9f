//! Interactive stretch/resize adjustment.

use std::time::Duration;

use pictor_core::{ImageHandle, NodeId, PushEvent};
use pictor_rendezvous::Outcome;
use serde::{Deserialize, Serialize};

use crate::context::InteractiveContext;
use crate::error::NodeResult;
use crate::kind::NodeKind;
use crate::reply::NodeReply;

/// Tracing target for size adjustment operations.
const TRACING_TARGET: &str = "pictor_nodes::resize";

/// Default wait for the resize dialog.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Configuration for the size adjustment node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizeAdjustmentConfig {
    /// Wait deadline for the resize dialog (optional).
    pub timeout: Option<Duration>,
}

impl SizeAdjustmentConfig {
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

impl Default for SizeAdjustmentConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// The size adjustment adapter.
#[derive(Debug, Clone, Default)]
pub struct SizeAdjustment {
    config: SizeAdjustmentConfig,
}

impl SizeAdjustment {
    /// Creates an adapter with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an adapter with custom configuration.
    #[must_use]
    pub fn with_config(config: SizeAdjustmentConfig) -> Self {
        Self { config }
    }

    /// Shows `image` in the resize dialog and returns the stretched
    /// result, or the input unchanged on timeout or cancel.
    ///
    /// A slot left behind by an earlier aborted run of the same node
    /// is replaced by the coordinator when the wait begins.
    pub async fn run(
        &self,
        ctx: &InteractiveContext,
        id: NodeId,
        image: &ImageHandle,
    ) -> NodeResult<ImageHandle> {
        let notice = PushEvent::new(
            NodeKind::SizeAdjustment.update_event(),
            id.clone(),
            image.to_preview_value(),
        );
        let handle =
            ctx.rendezvous()
                .begin_wait_with_timeout(id.clone(), notice, self.config.timeout())?;

        match handle.wait().await {
            Outcome::Delivered(NodeReply::Resize(reply)) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    node_id = %id,
                    width = reply.width,
                    height = reply.height,
                    "resize accepted"
                );
                Ok(reply.image)
            }
            Outcome::Delivered(other) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    node_id = %id,
                    kind = %other.kind(),
                    "mismatched reply kind; returning input"
                );
                Ok(image.clone())
            }
            Outcome::Cancelled | Outcome::TimedOut => Ok(image.clone()),
        }
    }
}
