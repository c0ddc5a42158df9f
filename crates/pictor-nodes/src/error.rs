//! Node adapter error types.

use thiserror::Error;

use crate::decode::DecodeError;

/// Result type for node adapter operations.
pub type NodeResult<T> = Result<T, NodeError>;

/// Errors that can occur while running an interactive node.
///
/// Timeouts and browser cancellations are not errors for most
/// adapters — they resolve to the adapter's fallback output. The
/// exception is [`NodeError::Interrupted`], which the host treats as
/// a user-initiated stop of the whole pipeline run.
#[derive(Debug, Error)]
pub enum NodeError {
    /// The user cancelled the interaction and the node's contract is
    /// to stop the pipeline run (image selector only).
    #[error("pipeline run interrupted by user cancellation")]
    Interrupted,

    /// Coordinator rejected the rendezvous.
    #[error(transparent)]
    Rendezvous(#[from] pictor_rendezvous::RendezvousError),

    /// A completion payload failed to decode.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}
