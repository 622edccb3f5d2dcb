//! Push notifications from the host window

use crossbeam_channel::{unbounded, Receiver, Sender, TryIter};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

/// Window state changes observed by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    FullscreenChanged(bool),
    MaximizedChanged(bool),
}

struct Subscribers<E> {
    next_id: u64,
    senders: Vec<(u64, Sender<E>)>,
}

/// Fan-out of events to every live [`Subscription`]
pub struct EventBus<E> {
    inner: Arc<Mutex<Subscribers<E>>>,
}

impl<E: Clone> EventBus<E> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Subscribers {
                next_id: 0,
                senders: Vec::new(),
            })),
        }
    }

    pub fn subscribe(&self) -> Subscription<E> {
        let (tx, rx) = unbounded();
        let mut subs = self.inner.lock();
        let id = subs.next_id;
        subs.next_id += 1;
        subs.senders.push((id, tx));

        Subscription {
            id,
            rx,
            bus: Arc::downgrade(&self.inner),
        }
    }

    pub fn publish(&self, event: E) {
        let subs = self.inner.lock();
        for (_, tx) in &subs.senders {
            let _ = tx.send(event.clone());
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().senders.len()
    }
}

impl<E: Clone> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving end; unsubscribes when dropped
pub struct Subscription<E> {
    id: u64,
    rx: Receiver<E>,
    bus: Weak<Mutex<Subscribers<E>>>,
}

impl<E> Subscription<E> {
    /// Drain events published since the last call
    pub fn try_iter(&self) -> TryIter<'_, E> {
        self.rx.try_iter()
    }
}

impl<E> Drop for Subscription<E> {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.lock().senders.retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_subscriber_receives() {
        let bus = EventBus::new();
        let a = bus.subscribe();
        let b = bus.subscribe();

        bus.publish(AppEvent::FullscreenChanged(true));
        bus.publish(AppEvent::MaximizedChanged(false));

        let got: Vec<_> = a.try_iter().collect();
        assert_eq!(
            got,
            vec![AppEvent::FullscreenChanged(true), AppEvent::MaximizedChanged(false)]
        );
        assert_eq!(b.try_iter().count(), 2);
        assert_eq!(a.try_iter().count(), 0);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let bus = EventBus::new();
        let a = bus.subscribe();
        {
            let _b = bus.subscribe();
            assert_eq!(bus.subscriber_count(), 2);
        }
        assert_eq!(bus.subscriber_count(), 1);
        bus.publish(AppEvent::FullscreenChanged(false));
        assert_eq!(a.try_iter().count(), 1);
    }

    #[test]
    fn test_subscription_outlives_bus() {
        let sub = {
            let bus: EventBus<AppEvent> = EventBus::new();
            bus.subscribe()
        };
        assert_eq!(sub.try_iter().count(), 0);
    }
}
