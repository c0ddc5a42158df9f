//! Interactive cropping.

use std::time::Duration;

use pictor_core::{ImageHandle, NodeId, PushEvent};
use pictor_rendezvous::Outcome;
use serde::{Deserialize, Serialize};

use crate::context::InteractiveContext;
use crate::error::NodeResult;
use crate::kind::NodeKind;
use crate::reply::NodeReply;

/// Tracing target for cropper operations.
const TRACING_TARGET: &str = "pictor_nodes::cropper";

/// Default wait for the crop dialog.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the cropper node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageCropperConfig {
    /// Wait deadline for the crop dialog (optional).
    pub timeout: Option<Duration>,
}

impl ImageCropperConfig {
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

impl Default for ImageCropperConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// The cropper adapter.
#[derive(Debug, Clone, Default)]
pub struct ImageCropper {
    config: ImageCropperConfig,
}

impl ImageCropper {
    /// Creates an adapter with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an adapter with custom configuration.
    #[must_use]
    pub fn with_config(config: ImageCropperConfig) -> Self {
        Self { config }
    }

    /// Shows `image` in the crop dialog and returns the cropped
    /// result, or the input unchanged on timeout or cancel.
    pub async fn run(
        &self,
        ctx: &InteractiveContext,
        id: NodeId,
        image: &ImageHandle,
    ) -> NodeResult<ImageHandle> {
        let notice = PushEvent::new(
            NodeKind::ImageCropper.update_event(),
            id.clone(),
            image.to_preview_value(),
        );
        let handle =
            ctx.rendezvous()
                .begin_wait_with_timeout(id.clone(), notice, self.config.timeout())?;

        match handle.wait().await {
            Outcome::Delivered(NodeReply::Crop(reply)) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    node_id = %id,
                    width = reply.width,
                    height = reply.height,
                    "crop accepted"
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
