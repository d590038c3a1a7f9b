//! Change notification bus.
//!
//! Every successful collection write publishes a payload-free
//! [`StoreChanged`] to all live subscribers. Subscribers never apply deltas;
//! on notification they re-read whole collections from the store.
//!
//! Delivery is at-least-once and unordered relative to other notifications.
//! A subscriber may see a notification caused by its own write, and several
//! writes may be observed as one after [`Subscription::drain`].

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// "Something in the store changed."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreChanged;

/// Handle used to unregister a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug, Default)]
struct BusState {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Sender<StoreChanged>)>,
}

/// Shared publish/subscribe hub. Clones refer to the same hub.
#[derive(Debug, Clone, Default)]
pub struct ChangeBus {
    state: Arc<Mutex<BusState>>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel();
        let mut state = self.lock();
        state.next_id += 1;
        let id = SubscriptionId(state.next_id);
        state.subscribers.push((id, tx));
        tracing::trace!(subscription = id.0, "subscribed to store changes");
        Subscription { id, rx }
    }

    /// Unregister a subscriber. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut state = self.lock();
        let before = state.subscribers.len();
        state.subscribers.retain(|(sub_id, _)| *sub_id != id);
        before != state.subscribers.len()
    }

    /// Notify every live subscriber; returns how many were reached.
    ///
    /// Subscribers whose [`Subscription`] was dropped are pruned.
    pub fn publish(&self) -> usize {
        let mut state = self.lock();
        state
            .subscribers
            .retain(|(_, tx)| tx.send(StoreChanged).is_ok());
        state.subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn lock(&self) -> MutexGuard<'_, BusState> {
        // Every mutation of the list is a single retain/push.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Receiving end of a bus registration.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    rx: Receiver<StoreChanged>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Consume all pending notifications; returns how many there were.
    pub fn drain(&self) -> usize {
        let mut count = 0;
        loop {
            match self.rx.try_recv() {
                Ok(StoreChanged) => count += 1,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return count,
            }
        }
    }

    /// Block up to `timeout` for a notification.
    ///
    /// Returns true if one arrived; false on timeout or when unsubscribed.
    pub fn wait(&self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(StoreChanged) => true,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_reaches_every_subscriber() {
        let bus = ChangeBus::new();
        let first = bus.subscribe();
        let second = bus.subscribe();

        assert_eq!(bus.publish(), 2);
        assert_eq!(first.drain(), 1);
        assert_eq!(second.drain(), 1);
        assert_eq!(first.drain(), 0);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let bus = ChangeBus::new();
        let sub = bus.subscribe();
        assert!(bus.unsubscribe(sub.id()));
        assert!(!bus.unsubscribe(sub.id()));

        assert_eq!(bus.publish(), 0);
        assert_eq!(sub.drain(), 0);
        assert!(!sub.wait(Duration::from_millis(5)));
    }

    #[test]
    fn dropped_subscriptions_are_pruned() {
        let bus = ChangeBus::new();
        let kept = bus.subscribe();
        drop(bus.subscribe());
        assert_eq!(bus.subscriber_count(), 2);

        assert_eq!(bus.publish(), 1);
        assert_eq!(bus.subscriber_count(), 1);
        assert!(kept.wait(Duration::from_millis(10)));
    }

    #[test]
    fn clones_share_subscribers() {
        let bus = ChangeBus::new();
        let sub = bus.subscribe();
        let other = bus.clone();
        other.publish();
        other.publish();
        assert_eq!(sub.drain(), 2);
    }

    #[test]
    fn wait_times_out_without_publish() {
        let bus = ChangeBus::new();
        let sub = bus.subscribe();
        assert!(!sub.wait(Duration::from_millis(5)));
    }
}
