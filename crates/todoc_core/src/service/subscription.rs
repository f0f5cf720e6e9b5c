//! Snapshot publication to long-lived subscribers.
//!
//! # Responsibility
//! - Track active subscribers and push each new snapshot to all of them.
//! - Give every subscriber a cancellable handle.
//!
//! # Invariants
//! - Each subscriber holds at most one undelivered snapshot; a newer publish
//!   replaces it, so memory stays bounded for subscribers that never read.
//! - A subscriber never receives an older snapshot after a newer one.
//! - Cancelled or dropped subscriptions never receive further snapshots.
//! - Publishing never blocks on a slow subscriber.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

struct Slot<T> {
    pending: Option<T>,
    closed: bool,
}

/// Single-value mailbox shared by the hub and one subscriber.
struct Mailbox<T> {
    slot: Mutex<Slot<T>>,
    ready: Condvar,
}

impl<T> Mailbox<T> {
    fn new(initial: T) -> Self {
        Self {
            slot: Mutex::new(Slot {
                pending: Some(initial),
                closed: false,
            }),
            ready: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn put(&self, value: T) {
        self.lock().pending = Some(value);
        self.ready.notify_all();
    }

    fn close(&self) {
        self.lock().closed = true;
        self.ready.notify_all();
    }
}

struct HubState<T> {
    next_id: u64,
    subscribers: Vec<(u64, Arc<Mailbox<T>>)>,
}

impl<T> Drop for HubState<T> {
    fn drop(&mut self) {
        for (_, mailbox) in &self.subscribers {
            mailbox.close();
        }
    }
}

/// Fan-out point for snapshots of type `T`.
pub struct SnapshotHub<T> {
    state: Arc<Mutex<HubState<T>>>,
}

impl<T> Clone for SnapshotHub<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> Default for SnapshotHub<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SnapshotHub<T> {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(HubState {
                next_id: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        lock_state(&self.state).subscribers.len()
    }

    /// Registers a subscriber whose first delivery is `initial`.
    pub fn subscribe(&self, initial: T) -> Subscription<T> {
        let mailbox = Arc::new(Mailbox::new(initial));

        let mut state = lock_state(&self.state);
        let id = state.next_id;
        state.next_id += 1;
        state.subscribers.push((id, Arc::clone(&mailbox)));

        Subscription {
            id,
            mailbox,
            hub: Arc::downgrade(&self.state),
        }
    }
}

impl<T: Clone> SnapshotHub<T> {
    /// Replaces every subscriber's pending snapshot with `snapshot`.
    /// Returns the number of subscribers reached.
    pub fn publish(&self, snapshot: T) -> usize {
        let state = lock_state(&self.state);
        for (_, mailbox) in &state.subscribers {
            mailbox.put(snapshot.clone());
        }
        state.subscribers.len()
    }
}

fn lock_state<T>(state: &Mutex<HubState<T>>) -> MutexGuard<'_, HubState<T>> {
    // Subscriber bookkeeping stays consistent even if a holder panicked.
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Receiving end of a snapshot subscription.
///
/// Dropping the handle cancels the subscription.
pub struct Subscription<T> {
    id: u64,
    mailbox: Arc<Mailbox<T>>,
    hub: Weak<Mutex<HubState<T>>>,
}

impl<T> Subscription<T> {
    /// Blocks for the newest undelivered snapshot; `None` once the
    /// publisher is gone and nothing is pending.
    pub fn recv(&self) -> Option<T> {
        let mut slot = self
            .mailbox
            .ready
            .wait_while(self.mailbox.lock(), |slot| {
                slot.pending.is_none() && !slot.closed
            })
            .unwrap_or_else(PoisonError::into_inner);
        slot.pending.take()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<T> {
        let (mut slot, _) = self
            .mailbox
            .ready
            .wait_timeout_while(self.mailbox.lock(), timeout, |slot| {
                slot.pending.is_none() && !slot.closed
            })
            .unwrap_or_else(PoisonError::into_inner);
        slot.pending.take()
    }

    /// Returns the pending snapshot without blocking.
    pub fn try_recv(&self) -> Option<T> {
        self.mailbox.lock().pending.take()
    }

    /// Stops delivery to this subscriber.
    pub fn cancel(self) {
        drop(self);
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(state) = self.hub.upgrade() {
            let id = self.id;
            lock_state(&state)
                .subscribers
                .retain(|(subscriber_id, _)| *subscriber_id != id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SnapshotHub;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn unread_snapshot_is_replaced_by_newer_publish() {
        let hub = SnapshotHub::new();
        let subscription = hub.subscribe(0);
        assert_eq!(hub.publish(1), 1);
        assert_eq!(hub.publish(2), 1);

        assert_eq!(subscription.try_recv(), Some(2));
        assert_eq!(subscription.try_recv(), None);

        hub.publish(3);
        assert_eq!(subscription.recv(), Some(3));
    }

    #[test]
    fn cancel_removes_subscriber() {
        let hub = SnapshotHub::new();
        let first = hub.subscribe("a");
        let second = hub.subscribe("a");
        assert_eq!(hub.subscriber_count(), 2);

        first.cancel();
        assert_eq!(hub.subscriber_count(), 1);
        assert_eq!(hub.publish("b"), 1);
        assert_eq!(second.try_recv(), Some("b"));
    }

    #[test]
    fn recv_wakes_on_publish_from_another_thread() {
        let hub = SnapshotHub::new();
        let subscription = hub.subscribe(0);
        assert_eq!(subscription.try_recv(), Some(0));

        let publisher = hub.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            publisher.publish(5);
        });
        assert_eq!(subscription.recv_timeout(Duration::from_secs(5)), Some(5));
        handle.join().unwrap();
    }

    #[test]
    fn recv_ends_when_hub_is_gone() {
        let hub = SnapshotHub::new();
        let subscription = hub.subscribe(7);
        drop(hub);
        assert_eq!(subscription.recv(), Some(7));
        assert_eq!(subscription.recv(), None);
        assert_eq!(subscription.recv_timeout(Duration::from_millis(10)), None);
    }
}
