//! Fan-out of registry snapshots to live subscribers.
//!
//! Every subscriber holds a single latest-value slot. A broadcast overwrites
//! whatever the subscriber has not read yet, so a slow reader skips straight
//! to the newest snapshot. Only a subscriber whose receiving side is gone is
//! dropped from the set; the rest still receive that snapshot.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use shared::types::DeviceSnapshot;
use crate::registry::DeviceRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// Receiving side handed to a subscriber task
pub struct Subscription {
    pub id: SubscriberId,
    pub updates: watch::Receiver<Arc<DeviceSnapshot>>,
}

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    senders: HashMap<SubscriberId, watch::Sender<Arc<DeviceSnapshot>>>,
}

#[derive(Default)]
pub struct Notifier {
    subscribers: Mutex<Subscribers>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Subscribers> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a subscriber. Its slot starts with the registry's current
    /// snapshot, already marked unread, taken while the subscriber set is
    /// locked so no broadcast can slip in between.
    pub fn subscribe(&self, registry: &DeviceRegistry) -> Subscription {
        let mut subscribers = self.lock();
        let id = SubscriberId(subscribers.next_id);
        subscribers.next_id += 1;

        let (tx, mut rx) = watch::channel(Arc::new(registry.snapshot()));
        rx.mark_changed();
        subscribers.senders.insert(id, tx);

        tracing::debug!("Subscriber {} joined ({} total)", id.0, subscribers.senders.len());
        Subscription { id, updates: rx }
    }

    pub fn unsubscribe(&self, id: SubscriberId) {
        let mut subscribers = self.lock();
        if subscribers.senders.remove(&id).is_some() {
            tracing::debug!("Subscriber {} left ({} total)", id.0, subscribers.senders.len());
        }
    }

    /// Push a snapshot to every subscriber. Returns how many accepted it.
    pub fn broadcast(&self, snapshot: Arc<DeviceSnapshot>) -> usize {
        let mut subscribers = self.lock();

        subscribers.senders.retain(|id, tx| match tx.send(Arc::clone(&snapshot)) {
            Ok(()) => true,
            Err(_) => {
                tracing::debug!("Dropping disconnected subscriber {}", id.0);
                false
            }
        });

        subscribers.senders.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().senders.len()
    }
}
