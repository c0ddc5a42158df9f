//! The wait-slot coordinator.
//!
//! One table of in-flight rendezvous, keyed by node id. The compute
//! side inserts a slot with [`Rendezvous::begin_wait`] and awaits the
//! returned [`WaitHandle`]; the HTTP side resolves it with
//! [`Rendezvous::complete`] or [`Rendezvous::cancel`]. Each slot owns
//! a one-shot channel, so a result is delivered at most once and the
//! waiter consumes it at most once. The handle removes its slot on
//! every exit path, including being dropped mid-wait.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use pictor_core::{NodeId, PushEvent, PushNotifier, SessionId};
use tokio::sync::oneshot;

use crate::config::RendezvousConfig;
use crate::error::RendezvousError;
use crate::outcome::{Delivery, Outcome};

/// Tracing target for coordinator operations.
const TRACING_TARGET: &str = "pictor_rendezvous::coordinator";

/// State of a wait slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    /// Created, no delivery yet.
    Waiting,
    /// A result was sent; the waiter has not consumed it yet.
    Completed,
    /// A cancellation was sent; the waiter has not consumed it yet.
    Cancelled,
}

/// Bookkeeping for one in-flight rendezvous.
struct WaitSlot<R> {
    session: SessionId,
    state: SlotState,
    sender: Option<oneshot::Sender<Delivery<R>>>,
    created_at: jiff::Timestamp,
}

impl<R> WaitSlot<R> {
    /// Whether a waiter can still observe a delivery through this slot.
    ///
    /// A slot whose sender is gone was already resolved and is about
    /// to be consumed; a slot whose receiver hung up belongs to an
    /// aborted waiter and counts as cleared.
    fn is_live(&self) -> bool {
        match &self.sender {
            Some(sender) => !sender.is_closed(),
            None => true,
        }
    }
}

type SlotTable<R> = Arc<Mutex<HashMap<NodeId, WaitSlot<R>>>>;

/// The rendezvous coordinator.
///
/// Constructed once at host startup and shared by every adapter and
/// HTTP handler; cloning is cheap and clones share the same table.
/// `R` is the completion payload type the suite instantiates it with.
pub struct Rendezvous<R> {
    slots: SlotTable<R>,
    notifier: Arc<dyn PushNotifier>,
    config: RendezvousConfig,
}

impl<R> Clone for Rendezvous<R> {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
            notifier: Arc::clone(&self.notifier),
            config: self.config.clone(),
        }
    }
}

impl<R: Send + 'static> Rendezvous<R> {
    /// Creates a coordinator with default configuration.
    pub fn new(notifier: Arc<dyn PushNotifier>) -> Self {
        Self::with_config(notifier, RendezvousConfig::default())
    }

    /// Creates a coordinator with custom configuration.
    pub fn with_config(notifier: Arc<dyn PushNotifier>, config: RendezvousConfig) -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
            notifier,
            config,
        }
    }

    /// Returns the coordinator configuration.
    pub fn config(&self) -> &RendezvousConfig {
        &self.config
    }

    fn table(&self) -> MutexGuard<'_, HashMap<NodeId, WaitSlot<R>>> {
        // The mutex is only held for table lookups; a poisoned lock
        // cannot leave a slot half-written.
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Begins a rendezvous with the configured default deadline.
    pub fn begin_wait(
        &self,
        id: NodeId,
        notice: PushEvent,
    ) -> Result<WaitHandle<R>, RendezvousError> {
        self.begin_wait_with_timeout(id, notice, self.config.default_timeout())
    }

    /// Begins a rendezvous: inserts a waiting slot for `id`, pushes
    /// `notice` toward the browser, and returns the handle to await.
    ///
    /// Fails with [`RendezvousError::AlreadyWaiting`] while a live
    /// slot exists for the same key; a slot left behind by an aborted
    /// waiter is replaced. Notification failures are logged, not
    /// surfaced — a rendezvous nobody sees resolves by timeout.
    pub fn begin_wait_with_timeout(
        &self,
        id: NodeId,
        notice: PushEvent,
        timeout: Duration,
    ) -> Result<WaitHandle<R>, RendezvousError> {
        let session = SessionId::new();
        let (sender, receiver) = oneshot::channel();

        {
            let mut table = self.table();
            match table.get(&id) {
                Some(slot) if slot.is_live() => {
                    return Err(RendezvousError::AlreadyWaiting { id });
                }
                Some(slot) => {
                    tracing::debug!(
                        target: TRACING_TARGET,
                        node_id = %id,
                        stale_session = %slot.session,
                        "replacing stale slot"
                    );
                }
                None => {}
            }

            table.insert(
                id.clone(),
                WaitSlot {
                    session,
                    state: SlotState::Waiting,
                    sender: Some(sender),
                    created_at: jiff::Timestamp::now(),
                },
            );
        }

        tracing::debug!(
            target: TRACING_TARGET,
            node_id = %id,
            session = %session,
            timeout_ms = timeout.as_millis() as u64,
            event = %notice.event,
            "rendezvous started"
        );

        if let Err(error) = self.notifier.push(notice) {
            tracing::debug!(
                target: TRACING_TARGET,
                node_id = %id,
                %error,
                "push notification not delivered"
            );
        }

        Ok(WaitHandle {
            id,
            session,
            timeout,
            receiver,
            slots: Arc::clone(&self.slots),
        })
    }

    /// Delivers a completion result to the waiter for `id`.
    ///
    /// Returns `false` when no slot is waiting under that key — a
    /// late or duplicate delivery. Callers log this case and move on;
    /// it must never surface as a user-facing error.
    pub fn complete(&self, id: &NodeId, result: R) -> bool {
        self.deliver(id, Delivery::Delivered(result), SlotState::Completed)
    }

    /// Delivers a cancellation to the waiter for `id`.
    ///
    /// Same no-op semantics as [`Rendezvous::complete`] when the slot
    /// is absent or already resolved.
    pub fn cancel(&self, id: &NodeId) -> bool {
        self.deliver(id, Delivery::Cancelled, SlotState::Cancelled)
    }

    fn deliver(&self, id: &NodeId, delivery: Delivery<R>, next: SlotState) -> bool {
        let mut table = self.table();

        let Some(slot) = table.get_mut(id) else {
            tracing::debug!(
                target: TRACING_TARGET,
                node_id = %id,
                "no slot for delivery; ignoring"
            );
            return false;
        };

        if slot.state != SlotState::Waiting {
            tracing::debug!(
                target: TRACING_TARGET,
                node_id = %id,
                session = %slot.session,
                state = ?slot.state,
                "duplicate delivery for resolved slot; ignoring"
            );
            return false;
        }

        // State is Waiting, so the sender has not been taken yet.
        let Some(sender) = slot.sender.take() else {
            return false;
        };

        if sender.send(delivery).is_err() {
            // The waiter hung up; its drop guard removes the entry.
            tracing::debug!(
                target: TRACING_TARGET,
                node_id = %id,
                session = %slot.session,
                "waiter gone before delivery; ignoring"
            );
            return false;
        }

        slot.state = next;

        tracing::debug!(
            target: TRACING_TARGET,
            node_id = %id,
            session = %slot.session,
            state = ?slot.state,
            waited_ms = jiff::Timestamp::now().duration_since(slot.created_at).as_millis() as i64,
            "rendezvous resolved"
        );

        true
    }

    /// Whether any slot (waiting or resolved-but-unconsumed) exists
    /// for `id`.
    #[must_use]
    pub fn contains(&self, id: &NodeId) -> bool {
        self.table().contains_key(id)
    }

    /// Whether a slot for `id` is still waiting for a delivery.
    #[must_use]
    pub fn is_waiting(&self, id: &NodeId) -> bool {
        self.table()
            .get(id)
            .is_some_and(|slot| slot.state == SlotState::Waiting)
    }

    /// Number of slots currently in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table().len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table().is_empty()
    }
}

/// Handle to one in-flight rendezvous.
///
/// Awaiting the handle consumes it; the slot is removed from the table
/// before the outcome reaches the caller, so a key can be reused for
/// the next run as soon as the wait returns. Dropping the handle
/// without awaiting it removes the slot too.
pub struct WaitHandle<R> {
    id: NodeId,
    session: SessionId,
    timeout: Duration,
    receiver: oneshot::Receiver<Delivery<R>>,
    slots: SlotTable<R>,
}

impl<R> WaitHandle<R> {
    /// Node key this handle waits under.
    #[must_use]
    pub fn node_id(&self) -> &NodeId {
        &self.id
    }

    /// Session tag of this rendezvous.
    #[must_use]
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Deadline this wait resolves by, absent a delivery.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Waits for the rendezvous to resolve.
    ///
    /// Suspends the calling task until a completion or cancellation is
    /// delivered, or the deadline elapses. This is the only suspension
    /// point in the coordinator.
    pub async fn wait(mut self) -> Outcome<R> {
        let outcome = match tokio::time::timeout(self.timeout, &mut self.receiver).await {
            Ok(Ok(Delivery::Delivered(result))) => Outcome::Delivered(result),
            Ok(Ok(Delivery::Cancelled)) => Outcome::Cancelled,
            Ok(Err(_)) => {
                // The slot was evicted under us (stale replacement by a
                // newer rendezvous on the same key).
                tracing::warn!(
                    target: TRACING_TARGET,
                    node_id = %self.id,
                    session = %self.session,
                    "slot dropped before delivery"
                );
                Outcome::TimedOut
            }
            Err(_) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    node_id = %self.id,
                    session = %self.session,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "rendezvous timed out"
                );
                Outcome::TimedOut
            }
        };

        // Removes the slot before the caller observes the outcome.
        drop(self);

        outcome
    }
}

impl<R> Drop for WaitHandle<R> {
    fn drop(&mut self) {
        let mut table = self.slots.lock().unwrap_or_else(PoisonError::into_inner);

        // Only remove our own slot: if this key was already recycled
        // by a newer rendezvous, the session tag differs.
        let owned = table
            .get(&self.id)
            .is_some_and(|slot| slot.session == self.session);
        if owned {
            table.remove(&self.id);
            tracing::trace!(
                target: TRACING_TARGET,
                node_id = %self.id,
                session = %self.session,
                "slot released"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pictor_core::NullNotifier;
    use serde_json::json;

    use super::*;

    fn coordinator() -> Rendezvous<String> {
        Rendezvous::new(Arc::new(NullNotifier))
    }

    fn notice(id: &NodeId) -> PushEvent {
        PushEvent::new("test-update", id.clone(), json!({}))
    }

    #[tokio::test]
    async fn delivered_result_is_returned_unmodified() {
        let rz = coordinator();
        let id = NodeId::new("n1");

        let handle = rz.begin_wait(id.clone(), notice(&id)).unwrap();
        assert!(rz.complete(&id, "edited".to_owned()));

        let outcome = handle.wait().await;
        assert_eq!(outcome, Outcome::Delivered("edited".to_owned()));
        assert!(!rz.contains(&id));
    }

    #[tokio::test]
    async fn complete_before_begin_is_a_noop() {
        let rz = coordinator();
        let id = NodeId::new("n1");

        assert!(!rz.complete(&id, "early".to_owned()));

        // The early delivery must not leak into a later rendezvous.
        let handle = rz.begin_wait(id.clone(), notice(&id)).unwrap();
        assert!(rz.complete(&id, "on time".to_owned()));
        assert_eq!(handle.wait().await, Outcome::Delivered("on time".to_owned()));
    }

    #[tokio::test]
    async fn slot_is_gone_after_any_outcome() {
        let rz = coordinator();
        let id = NodeId::new("n1");

        let handle = rz.begin_wait(id.clone(), notice(&id)).unwrap();
        rz.cancel(&id);
        assert_eq!(handle.wait().await, Outcome::Cancelled);

        // A subsequent cancel finds nothing.
        assert!(!rz.cancel(&id));
        assert!(rz.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_elapses_at_the_deadline() {
        let rz = coordinator();
        let id = NodeId::new("n1");

        let handle = rz
            .begin_wait_with_timeout(id.clone(), notice(&id), Duration::from_millis(50))
            .unwrap();

        let started = tokio::time::Instant::now();
        let outcome = handle.wait().await;

        assert_eq!(outcome, Outcome::TimedOut);
        assert_eq!(started.elapsed(), Duration::from_millis(50));
        assert!(!rz.contains(&id));
    }

    #[tokio::test]
    async fn late_complete_after_timeout_is_a_noop() {
        let rz = coordinator();
        let id = NodeId::new("n1");

        let handle = rz
            .begin_wait_with_timeout(id.clone(), notice(&id), Duration::from_millis(1))
            .unwrap();
        assert_eq!(handle.wait().await, Outcome::TimedOut);

        assert!(!rz.complete(&id, "too late".to_owned()));
    }

    #[tokio::test]
    async fn duplicate_begin_wait_is_rejected() {
        let rz = coordinator();
        let id = NodeId::new("A");

        let first = rz.begin_wait(id.clone(), notice(&id)).unwrap();
        let second = rz.begin_wait(id.clone(), notice(&id));
        assert!(matches!(
            second,
            Err(RendezvousError::AlreadyWaiting { .. })
        ));

        // The first waiter is unaffected by the rejected attempt.
        assert!(rz.complete(&id, "first".to_owned()));
        assert_eq!(first.wait().await, Outcome::Delivered("first".to_owned()));
    }

    #[tokio::test]
    async fn duplicate_complete_is_a_noop() {
        let rz = coordinator();
        let id = NodeId::new("n1");

        let handle = rz.begin_wait(id.clone(), notice(&id)).unwrap();
        assert!(rz.complete(&id, "first".to_owned()));
        assert!(!rz.complete(&id, "second".to_owned()));

        assert_eq!(handle.wait().await, Outcome::Delivered("first".to_owned()));
    }

    #[tokio::test]
    async fn dropped_handle_releases_the_slot() {
        let rz = coordinator();
        let id = NodeId::new("n1");

        let handle = rz.begin_wait(id.clone(), notice(&id)).unwrap();
        drop(handle);

        assert!(!rz.contains(&id));
        // The key is immediately reusable.
        let _handle = rz.begin_wait(id.clone(), notice(&id)).unwrap();
        assert!(rz.is_waiting(&id));
    }

    #[tokio::test]
    async fn waiter_and_completer_race_from_separate_tasks() {
        let rz = coordinator();
        let id = NodeId::new("n1");

        let handle = rz.begin_wait(id.clone(), notice(&id)).unwrap();

        let completer = {
            let rz = rz.clone();
            let id = id.clone();
            tokio::spawn(async move { rz.complete(&id, "raced".to_owned()) })
        };

        let outcome = handle.wait().await;
        assert!(completer.await.unwrap());
        assert_eq!(outcome, Outcome::Delivered("raced".to_owned()));
        assert!(rz.is_empty());
    }
}
