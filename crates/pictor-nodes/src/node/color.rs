//! Interactive color adjustment.

use std::time::Duration;

use pictor_core::{ImageHandle, NodeId, PushEvent};
use pictor_rendezvous::Outcome;
use serde::{Deserialize, Serialize};

use crate::context::InteractiveContext;
use crate::error::NodeResult;
use crate::kind::NodeKind;
use crate::reply::NodeReply;

/// Tracing target for color adjustment operations.
const TRACING_TARGET: &str = "pictor_nodes::color";

/// Color dialogs are quick; the default deadline is short.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for the color adjustment node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorAdjustmentConfig {
    /// Wait deadline for the adjustment dialog (optional).
    pub timeout: Option<Duration>,
}

impl ColorAdjustmentConfig {
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

impl Default for ColorAdjustmentConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// The color adjustment adapter.
#[derive(Debug, Clone, Default)]
pub struct ColorAdjustment {
    config: ColorAdjustmentConfig,
}

impl ColorAdjustment {
    /// Creates an adapter with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an adapter with custom configuration.
    #[must_use]
    pub fn with_config(config: ColorAdjustmentConfig) -> Self {
        Self { config }
    }

    /// Shows `image` in the adjustment dialog and returns the adjusted
    /// result, or the input unchanged on timeout or cancel.
    pub async fn run(
        &self,
        ctx: &InteractiveContext,
        id: NodeId,
        image: &ImageHandle,
    ) -> NodeResult<ImageHandle> {
        let notice = PushEvent::new(
            NodeKind::ColorAdjustment.update_event(),
            id.clone(),
            image.to_preview_value(),
        );
        let handle =
            ctx.rendezvous()
                .begin_wait_with_timeout(id.clone(), notice, self.config.timeout())?;

        match handle.wait().await {
            Outcome::Delivered(NodeReply::ColorAdjust(reply)) => Ok(reply.image),
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

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pictor_core::NullNotifier;

    use super::*;
    use crate::reply::ColorAdjustReply;
    use crate::test_support::{
        CaptureNotifier, cancel_when_waiting, complete_when_waiting, test_image,
    };

    fn quick_adapter() -> ColorAdjustment {
        ColorAdjustment::with_config(
            ColorAdjustmentConfig::new().with_timeout(Duration::from_millis(20)),
        )
    }

    fn patient_adapter() -> ColorAdjustment {
        ColorAdjustment::with_config(
            ColorAdjustmentConfig::new().with_timeout(Duration::from_secs(5)),
        )
    }

    #[tokio::test]
    async fn delivery_returns_the_adjusted_image() {
        let ctx = InteractiveContext::new(Arc::new(NullNotifier));
        let id = NodeId::new("c1");

        let completer = complete_when_waiting(
            ctx.rendezvous().clone(),
            id.clone(),
            NodeReply::ColorAdjust(ColorAdjustReply {
                image: test_image(b"adjusted"),
            }),
        );
        let out = patient_adapter()
            .run(&ctx, id, &test_image(b"input"))
            .await
            .unwrap();

        assert!(completer.await.unwrap());
        assert_eq!(out, test_image(b"adjusted"));
    }

    #[tokio::test]
    async fn timeout_returns_the_input() {
        let ctx = InteractiveContext::new(Arc::new(NullNotifier));
        let input = test_image(b"input");

        let out = quick_adapter()
            .run(&ctx, NodeId::new("c1"), &input)
            .await
            .unwrap();
        assert_eq!(out, input);
    }

    #[tokio::test]
    async fn cancel_returns_the_input_without_error() {
        let ctx = InteractiveContext::new(Arc::new(NullNotifier));
        let id = NodeId::new("c1");
        let input = test_image(b"input");

        let canceller = cancel_when_waiting(ctx.rendezvous().clone(), id.clone());
        let out = patient_adapter().run(&ctx, id, &input).await.unwrap();

        assert!(canceller.await.unwrap());
        assert_eq!(out, input);
    }

    #[tokio::test]
    async fn preview_is_pushed_as_a_data_url() {
        let notifier = CaptureNotifier::new();
        let ctx = InteractiveContext::new(notifier.clone());

        quick_adapter()
            .run(&ctx, NodeId::new("c1"), &test_image(b"input"))
            .await
            .unwrap();

        let events = notifier.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "color-adjustment-update");
        let url = events[0].payload["imageData"].as_str().unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }
}
