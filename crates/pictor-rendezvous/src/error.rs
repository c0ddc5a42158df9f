//! Rendezvous error types.

use pictor_core::NodeId;
use thiserror::Error;

/// Errors from coordinator operations.
#[derive(Debug, Error)]
pub enum RendezvousError {
    /// A live wait slot already exists for this node key.
    ///
    /// Two in-flight rendezvous under one key could cross-deliver
    /// results; the second `begin_wait` is rejected until the first
    /// slot is consumed and removed.
    #[error("a rendezvous is already waiting for node {id}")]
    AlreadyWaiting {
        /// Key the rejected rendezvous was requested under.
        id: NodeId,
    },
}
