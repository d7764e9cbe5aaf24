//! Process-wide refresh notifications.

use tokio::sync::broadcast;
use tracing::trace;

/// Announces that the cache for a record type was refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notification {
    /// The refreshed record type.
    pub record_type: &'static str,
}

/// Broadcasts one [`Notification`] per successful refresh.
#[derive(Debug, Clone)]
pub struct NotificationBus {
    sender: broadcast::Sender<Notification>,
}

impl NotificationBus {
    /// Creates a bus that buffers `capacity` notifications per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Announces a refresh. Returns the number of subscribers reached.
    pub fn notify(&self, record_type: &'static str) -> usize {
        let reached = self
            .sender
            .send(Notification { record_type })
            .unwrap_or(0);
        trace!(record_type, reached, "refresh notification sent");
        reached
    }

    /// Subscribes to every record type.
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
            filter: None,
        }
    }

    /// Subscribes to one record type.
    pub fn subscribe_to(&self, record_type: &'static str) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
            filter: Some(record_type),
        }
    }

    /// Returns the current number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new(64)
    }
}

/// A receiver of refresh notifications.
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<Notification>,
    filter: Option<&'static str>,
}

impl Subscription {
    /// Waits for the next matching notification.
    ///
    /// A subscriber that fell behind skips the notifications it missed.
    /// Returns `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<Notification> {
        loop {
            match self.receiver.recv().await {
                Ok(notification) if self.matches(&notification) => return Some(notification),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the next matching notification if one is already queued.
    pub fn try_recv(&mut self) -> Option<Notification> {
        loop {
            match self.receiver.try_recv() {
                Ok(notification) if self.matches(&notification) => return Some(notification),
                Ok(_) => continue,
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }

    fn matches(&self, notification: &Notification) -> bool {
        match self.filter {
            Some(record_type) => record_type == notification.record_type,
            None => true,
        }
    }
}
