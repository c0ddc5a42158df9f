//! Preview bridge with browser-side mask editing.
//!
//! Shows the upstream batch in the browser, waits for the user to
//! paint a mask, and returns the edited image plus the mask's
//! complement. Accepted results are cached under the input
//! fingerprint so a skip-mode run with unchanged input can bypass the
//! dialog entirely.

use std::time::Duration;

use pictor_core::{ImageBatch, Mask, NodeId, PushEvent};
use pictor_rendezvous::Outcome;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::context::InteractiveContext;
use crate::error::NodeResult;
use crate::kind::NodeKind;
use crate::reply::NodeReply;

/// Tracing target for bridge preview operations.
const TRACING_TARGET: &str = "pictor_nodes::bridge";

/// Default wait for the mask editor dialog.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the preview bridge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgePreviewConfig {
    /// Wait deadline for the mask editor (optional).
    pub timeout: Option<Duration>,
    /// Whether a skip-mode cache hit still pushes the cached preview
    /// so the browser-side thumbnail stays current.
    pub notify_on_cache_hit: bool,
}

impl BridgePreviewConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            timeout: None,
            notify_on_cache_hit: false,
        }
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

    /// Sets whether skip-mode cache hits push the cached preview.
    #[must_use]
    pub fn with_notify_on_cache_hit(mut self, notify: bool) -> Self {
        self.notify_on_cache_hit = notify;
        self
    }
}

impl Default for BridgePreviewConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Output of a bridge run: the (possibly edited) image batch and the
/// mask the pipeline consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeOutput {
    /// Edited image, or the unmodified input on fallback.
    pub images: ImageBatch,
    /// Complement of the painted mask; full coverage on fallback.
    pub mask: Mask,
}

impl BridgeOutput {
    fn passthrough(images: &ImageBatch) -> Self {
        Self {
            images: images.clone(),
            mask: Mask::ones(images.width(), images.height()),
        }
    }
}

/// The preview bridge adapter.
#[derive(Debug, Clone, Default)]
pub struct BridgePreview {
    config: BridgePreviewConfig,
}

impl BridgePreview {
    /// Creates a bridge with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a bridge with custom configuration.
    #[must_use]
    pub fn with_config(config: BridgePreviewConfig) -> Self {
        Self { config }
    }

    /// Runs the bridge for one node invocation.
    ///
    /// With `skip` set, no dialog is opened: a cache hit for the
    /// current input returns the previously accepted edit, anything
    /// else passes the input through under a full-coverage mask.
    pub async fn run(
        &self,
        ctx: &InteractiveContext,
        id: NodeId,
        images: &ImageBatch,
        skip: bool,
    ) -> NodeResult<BridgeOutput> {
        let fingerprint = images.fingerprint();

        if skip {
            if let Some(NodeReply::MaskEdit(prior)) = ctx.cache().get(&id, &fingerprint) {
                tracing::debug!(
                    target: TRACING_TARGET,
                    node_id = %id,
                    %fingerprint,
                    "skip enabled; returning cached edit"
                );
                if self.config.notify_on_cache_hit {
                    ctx.notify(PushEvent::new(
                        NodeKind::BridgePreview.update_event(),
                        id.clone(),
                        json!({ "images": [prior.image.to_preview_value()] }),
                    ));
                }
                let (width, height) = (prior.mask.width(), prior.mask.height());
                return Ok(BridgeOutput {
                    images: ImageBatch::single(width, height, prior.image),
                    mask: prior.mask.inverted(),
                });
            }
            return Ok(BridgeOutput::passthrough(images));
        }

        // Interactive path. A cache hit previews the prior edit so the
        // user sees what accepting unchanged input would keep.
        let preview = match ctx.cache().get(&id, &fingerprint) {
            Some(NodeReply::MaskEdit(prior)) => json!({
                "images": [prior.image.to_preview_value()],
                "cached": true,
            }),
            _ => json!({ "images": images.to_preview_values() }),
        };

        let notice = PushEvent::new(NodeKind::BridgePreview.update_event(), id.clone(), preview);
        let handle = ctx.rendezvous().begin_wait_with_timeout(
            id.clone(),
            notice,
            self.config.timeout(),
        )?;

        match handle.wait().await {
            Outcome::Delivered(NodeReply::MaskEdit(reply)) => {
                ctx.cache()
                    .put(id, fingerprint, NodeReply::MaskEdit(reply.clone()));
                let (width, height) = (reply.mask.width(), reply.mask.height());
                Ok(BridgeOutput {
                    images: ImageBatch::single(width, height, reply.image),
                    mask: reply.mask.inverted(),
                })
            }
            Outcome::Delivered(other) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    node_id = %id,
                    kind = %other.kind(),
                    "mismatched reply kind; passing input through"
                );
                Ok(BridgeOutput::passthrough(images))
            }
            Outcome::Cancelled | Outcome::TimedOut => Ok(BridgeOutput::passthrough(images)),
        }
    }
}
