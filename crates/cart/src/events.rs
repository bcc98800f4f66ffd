//! Cart change notification.
//!
//! Every surface that shows cart state (badge, mini-cart, cart page) holds a
//! [`CartSubscription`] and re-reads the store when it fires. Events carry no
//! data, so a subscriber that falls behind only needs to know that something
//! changed.

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

/// Default number of unread events buffered per subscriber.
pub const DEFAULT_CAPACITY: usize = 16;

/// Signal emitted after a cart mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartEvent {
    /// The cart changed; re-read it from the store.
    Changed,
}

/// Publisher side of cart change notification.
///
/// Clones share the same channel.
#[derive(Debug, Clone)]
pub struct CartEvents {
    sender: broadcast::Sender<CartEvent>,
}

impl Default for CartEvents {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl CartEvents {
    /// Create a publisher buffering up to `capacity` events per subscriber.
    ///
    /// A capacity of zero is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Register a new subscriber. It sees events sent after this call.
    #[must_use]
    pub fn subscribe(&self) -> CartSubscription {
        CartSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Tell every subscriber the cart changed.
    pub fn notify(&self) {
        // An error only means nobody is listening.
        if self.sender.send(CartEvent::Changed).is_err() {
            tracing::trace!("Cart changed with no subscribers");
        }
    }
}

/// Subscriber side of cart change notification.
///
/// Dropping it unsubscribes.
#[derive(Debug)]
pub struct CartSubscription {
    receiver: broadcast::Receiver<CartEvent>,
}

impl CartSubscription {
    /// Take the next pending event without waiting.
    ///
    /// Returns `None` when nothing is pending or the publisher is gone. If
    /// the subscriber fell behind, the missed events collapse into one
    /// `Changed`.
    pub fn try_next(&mut self) -> Option<CartEvent> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Lagged(missed)) => {
                tracing::debug!(missed, "Cart subscriber lagged");
                Some(CartEvent::Changed)
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => None,
        }
    }

    /// Drain everything pending. Returns how many events were waiting.
    pub fn drain(&mut self) -> usize {
        let mut count = 0;
        while self.try_next().is_some() {
            count += 1;
        }
        count
    }

    /// Wait for the next change.
    ///
    /// Returns `None` once every publisher handle has been dropped.
    pub async fn changed(&mut self) -> Option<CartEvent> {
        match self.receiver.recv().await {
            Ok(event) => Some(event),
            Err(RecvError::Lagged(missed)) => {
                tracing::debug!(missed, "Cart subscriber lagged");
                Some(CartEvent::Changed)
            }
            Err(RecvError::Closed) => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_without_subscribers_is_fine() {
        let events = CartEvents::default();
        events.notify();
        assert_eq!(events.subscriber_count(), 0);
    }

    #[test]
    fn test_every_subscriber_sees_each_change() {
        let events = CartEvents::default();
        let mut badge = events.subscribe();
        let mut page = events.subscribe();
        assert_eq!(events.subscriber_count(), 2);

        events.notify();
        events.notify();

        assert_eq!(badge.drain(), 2);
        assert_eq!(page.try_next(), Some(CartEvent::Changed));
        assert_eq!(page.try_next(), Some(CartEvent::Changed));
        assert_eq!(page.try_next(), None);
    }

    #[test]
    fn test_late_subscriber_misses_earlier_events() {
        let events = CartEvents::default();
        events.notify();
        let mut late = events.subscribe();
        assert_eq!(late.try_next(), None);
    }

    #[test]
    fn test_dropping_subscription_unsubscribes() {
        let events = CartEvents::default();
        let subscription = events.subscribe();
        assert_eq!(events.subscriber_count(), 1);
        drop(subscription);
        assert_eq!(events.subscriber_count(), 0);
    }

    #[test]
    fn test_lag_collapses_into_one_change() {
        let events = CartEvents::new(1);
        let mut slow = events.subscribe();
        for _ in 0..5 {
            events.notify();
        }
        assert_eq!(slow.try_next(), Some(CartEvent::Changed));
        assert!(slow.drain() <= 1);
    }

    #[tokio::test]
    async fn test_changed_waits_for_notify() {
        let events = CartEvents::default();
        let mut subscription = events.subscribe();
        let publisher = events.clone();

        let handle = tokio::spawn(async move { subscription.changed().await });
        publisher.notify();

        assert_eq!(handle.await.unwrap(), Some(CartEvent::Changed));
    }

    #[tokio::test]
    async fn test_changed_returns_none_when_publisher_dropped() {
        let events = CartEvents::default();
        let mut subscription = events.subscribe();
        drop(events);
        assert_eq!(subscription.changed().await, None);
    }
}
