//! Core error types.

use thiserror::Error;

/// Errors from delivering a push notification.
#[derive(Debug, Error)]
pub enum PushError {
    /// No subscriber is currently attached to the delivery channel.
    ///
    /// Callers may ignore this: the corresponding rendezvous times out
    /// and the node falls back to its input.
    #[error("no subscribers attached to the push channel")]
    NoSubscribers,
}
