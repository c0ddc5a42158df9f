//! Shared helpers for adapter tests.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use pictor_core::{ImageBatch, ImageFormat, ImageHandle, NodeId, PushError, PushEvent, PushNotifier};
use pictor_rendezvous::Rendezvous;

use crate::reply::NodeReply;

/// Notifier that records every pushed event.
#[derive(Debug, Default)]
pub(crate) struct CaptureNotifier {
    events: Mutex<Vec<PushEvent>>,
}

impl CaptureNotifier {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn events(&self) -> Vec<PushEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl PushNotifier for CaptureNotifier {
    fn push(&self, event: PushEvent) -> Result<(), PushError> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
        Ok(())
    }
}

/// Resolves the rendezvous for `id` as soon as its slot appears.
///
/// Adapters begin their wait inside `run`, so tests deliver from a
/// second task that polls for the slot first.
pub(crate) fn complete_when_waiting(
    rendezvous: Rendezvous<NodeReply>,
    id: NodeId,
    reply: NodeReply,
) -> tokio::task::JoinHandle<bool> {
    tokio::spawn(async move {
        for _ in 0..500 {
            if rendezvous.is_waiting(&id) {
                return rendezvous.complete(&id, reply);
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        false
    })
}

/// Cancels the rendezvous for `id` as soon as its slot appears.
pub(crate) fn cancel_when_waiting(
    rendezvous: Rendezvous<NodeReply>,
    id: NodeId,
) -> tokio::task::JoinHandle<bool> {
    tokio::spawn(async move {
        for _ in 0..500 {
            if rendezvous.is_waiting(&id) {
                return rendezvous.cancel(&id);
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        false
    })
}

/// A small inline test image.
pub(crate) fn test_image(tag: &[u8]) -> ImageHandle {
    ImageHandle::inline(ImageFormat::Png, tag.to_vec())
}

/// A single-image batch around [`test_image`].
pub(crate) fn test_batch(width: u32, height: u32, tag: &[u8]) -> ImageBatch {
    ImageBatch::single(width, height, test_image(tag))
}
