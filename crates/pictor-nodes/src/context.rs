//! Shared state handed to every adapter.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use pictor_core::{NodeId, PushEvent, PushNotifier};
use pictor_rendezvous::{Rendezvous, RendezvousConfig, ResultCache};

use crate::reply::NodeReply;

/// Tracing target for context operations.
const TRACING_TARGET: &str = "pictor_nodes::context";

/// Browser-side refresh signals posted between runs.
///
/// The canvas compositor's frontend flags its node as dirty whenever
/// the scene changes outside a run; the next run consumes the flag and
/// pushes a full update instead of a state request. Flags are
/// one-shot: taking one clears it.
#[derive(Debug, Clone, Default)]
pub struct RefreshLedger {
    dirty: Arc<Mutex<HashSet<NodeId>>>,
}

impl RefreshLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `id` as needing a full update on its next run.
    pub fn mark(&self, id: NodeId) {
        self.dirty
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);
    }

    /// Takes the flag for `id`, returning whether it was set.
    pub fn take(&self, id: &NodeId) -> bool {
        self.dirty
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
    }
}

/// The coordinator bundle shared by adapters and HTTP handlers.
///
/// Constructed once at host startup and passed by reference everywhere
/// a rendezvous is begun or resolved; replaces the per-node-type
/// global tables the pattern is prone to. Clones share all state.
#[derive(Clone)]
pub struct InteractiveContext {
    rendezvous: Arc<Rendezvous<NodeReply>>,
    cache: Arc<ResultCache<NodeReply>>,
    refresh: RefreshLedger,
    notifier: Arc<dyn PushNotifier>,
}

impl InteractiveContext {
    /// Creates a context with default coordinator configuration.
    pub fn new(notifier: Arc<dyn PushNotifier>) -> Self {
        Self::with_config(notifier, RendezvousConfig::default())
    }

    /// Creates a context with custom coordinator configuration.
    pub fn with_config(notifier: Arc<dyn PushNotifier>, config: RendezvousConfig) -> Self {
        Self {
            rendezvous: Arc::new(Rendezvous::with_config(Arc::clone(&notifier), config)),
            cache: Arc::new(ResultCache::new()),
            refresh: RefreshLedger::new(),
            notifier,
        }
    }

    /// The shared rendezvous coordinator.
    #[must_use]
    pub fn rendezvous(&self) -> &Rendezvous<NodeReply> {
        &self.rendezvous
    }

    /// The shared result cache.
    #[must_use]
    pub fn cache(&self) -> &ResultCache<NodeReply> {
        &self.cache
    }

    /// The canvas refresh ledger.
    #[must_use]
    pub fn refresh(&self) -> &RefreshLedger {
        &self.refresh
    }

    /// Pushes a notification outside any rendezvous.
    ///
    /// Used for fire-and-forget announcements (cache-hit previews,
    /// remembered-selection echoes); failures are logged and dropped.
    pub fn notify(&self, event: PushEvent) {
        let node_id = event.node_id.clone();
        let name = event.event.clone();
        if let Err(error) = self.notifier.push(event) {
            tracing::debug!(
                target: TRACING_TARGET,
                node_id = %node_id,
                event = %name,
                %error,
                "push notification not delivered"
            );
        }
    }
}
