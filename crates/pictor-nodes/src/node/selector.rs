//! Image selection out of a batch.
//!
//! Shows every image in the incoming batch and waits for the user to
//! pick a subset. Selection is the one interaction whose cancellation
//! stops the whole pipeline run: a browser-side cancel surfaces as
//! [`NodeError::Interrupted`] instead of a fallback output.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use pictor_core::{ImageBatch, ImageHandle, NodeId, PushEvent};
use pictor_rendezvous::Outcome;
use serde::{Deserialize, Serialize};
use serde_json::json;
use strum::{Display, EnumString};

use crate::context::InteractiveContext;
use crate::error::{NodeError, NodeResult};
use crate::kind::NodeKind;
use crate::reply::NodeReply;

/// Tracing target for selector operations.
const TRACING_TARGET: &str = "pictor_nodes::selector";

/// Push event re-announcing a remembered selection.
pub const SELECTION_EVENT: &str = "image-selector-selection";

/// Selection is user-paced; the default deadline is generous.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// How the selector behaves when a run reaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[derive(Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SelectorMode {
    /// Pause every run and wait for a fresh selection.
    #[default]
    AlwaysPause,
    /// Reuse the previous selection when one is remembered and still
    /// fits the batch; pause otherwise.
    KeepLastSelection,
    /// Select everything without pausing.
    Passthrough,
}

/// Configuration for the image selector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSelectorConfig {
    /// Wait deadline for the selection dialog (optional).
    pub timeout: Option<Duration>,
}

impl ImageSelectorConfig {
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

impl Default for ImageSelectorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Output of a selector run.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorOutput {
    /// The selected images, in selection order.
    pub images: Vec<ImageHandle>,
    /// Zero-based indices of the selection into the input batch.
    pub indices: Vec<usize>,
}

impl SelectorOutput {
    fn from_indices(batch: &ImageBatch, indices: Vec<usize>) -> Self {
        let images = indices
            .iter()
            .filter_map(|&index| batch.get(index).cloned())
            .collect();
        Self { images, indices }
    }

    /// The first image alone, or nothing for an empty batch.
    fn first_of(batch: &ImageBatch) -> Self {
        if batch.is_empty() {
            Self {
                images: Vec::new(),
                indices: Vec::new(),
            }
        } else {
            Self::from_indices(batch, vec![0])
        }
    }

    /// Comma-separated index list, as downstream string inputs expect.
    #[must_use]
    pub fn indices_csv(&self) -> String {
        self.indices
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// The image selector adapter.
///
/// Remembers the last accepted selection per node so the
/// keep-last-selection mode can replay it without pausing.
#[derive(Debug, Clone, Default)]
pub struct ImageSelector {
    config: ImageSelectorConfig,
    remembered: Arc<Mutex<HashMap<NodeId, Vec<usize>>>>,
}

impl ImageSelector {
    /// Creates a selector with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a selector with custom configuration.
    #[must_use]
    pub fn with_config(config: ImageSelectorConfig) -> Self {
        Self {
            config,
            remembered: Arc::default(),
        }
    }

    fn recall(&self, id: &NodeId, len: usize) -> Option<Vec<usize>> {
        let remembered = self.remembered.lock().unwrap_or_else(PoisonError::into_inner);
        let prior = remembered.get(id)?;
        let valid: Vec<usize> = prior.iter().copied().filter(|&index| index < len).collect();
        (!valid.is_empty()).then_some(valid)
    }

    fn remember(&self, id: NodeId, indices: Vec<usize>) {
        self.remembered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, indices);
    }

    /// Runs the selector for one node invocation.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::Interrupted`] when the browser cancels the
    /// selection; the host stops the pipeline run in response.
    pub async fn run(
        &self,
        ctx: &InteractiveContext,
        id: NodeId,
        images: &ImageBatch,
        mode: SelectorMode,
    ) -> NodeResult<SelectorOutput> {
        let preview = json!({ "images": images.to_preview_values() });

        match mode {
            SelectorMode::Passthrough => {
                // Keep the browser's thumbnails current even though
                // nothing pauses.
                ctx.notify(PushEvent::new(
                    NodeKind::ImageSelector.update_event(),
                    id.clone(),
                    preview,
                ));
                let all = (0..images.len()).collect();
                return Ok(SelectorOutput::from_indices(images, all));
            }
            SelectorMode::KeepLastSelection => {
                if let Some(valid) = self.recall(&id, images.len()) {
                    tracing::debug!(
                        target: TRACING_TARGET,
                        node_id = %id,
                        indices = ?valid,
                        "replaying remembered selection"
                    );
                    ctx.notify(PushEvent::new(
                        NodeKind::ImageSelector.update_event(),
                        id.clone(),
                        preview,
                    ));
                    ctx.notify(PushEvent::new(
                        SELECTION_EVENT,
                        id.clone(),
                        json!({ "selectedIndices": valid }),
                    ));
                    return Ok(SelectorOutput::from_indices(images, valid));
                }
                // Nothing remembered (or the batch shrank): pause.
            }
            SelectorMode::AlwaysPause => {}
        }

        let notice = PushEvent::new(NodeKind::ImageSelector.update_event(), id.clone(), preview);
        let handle =
            ctx.rendezvous()
                .begin_wait_with_timeout(id.clone(), notice, self.config.timeout())?;

        match handle.wait().await {
            Outcome::Delivered(NodeReply::Selection(reply)) => {
                let valid: Vec<usize> = reply
                    .indices
                    .into_iter()
                    .filter(|&index| index < images.len())
                    .collect();
                if valid.is_empty() {
                    return Ok(SelectorOutput::first_of(images));
                }
                self.remember(id, valid.clone());
                Ok(SelectorOutput::from_indices(images, valid))
            }
            Outcome::Delivered(other) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    node_id = %id,
                    kind = %other.kind(),
                    "mismatched reply kind; selecting first image"
                );
                Ok(SelectorOutput::first_of(images))
            }
            Outcome::Cancelled => {
                tracing::info!(
                    target: TRACING_TARGET,
                    node_id = %id,
                    "selection cancelled; interrupting pipeline run"
                );
                Err(NodeError::Interrupted)
            }
            Outcome::TimedOut => Ok(SelectorOutput::first_of(images)),
        }
    }
}
