use tokio::sync::broadcast;

use crate::model::Notification;

const CHANNEL_CAPACITY: usize = 256;

/// Process-wide broadcast hub for mutation notifications: one explicit
/// channel, injected where it is needed.
pub struct NotifyHub {
    tx: broadcast::Sender<Notification>,
}

impl Default for NotifyHub {
    fn default() -> Self {
        Self::new()
    }
}

impl NotifyHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Subscribe to all notifications. Drop the receiver to tear down.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    /// Fire-and-forget. No-op if nobody is listening; nothing is queued for
    /// inactive listeners, they re-query on activation.
    pub fn send(&self, notification: Notification) {
        let _ = self.tx.send(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribe_and_receive() {
        let hub = NotifyHub::new();
        let mut rx = hub.subscribe();

        hub.send(Notification::BlocksChanged);

        let received = rx.recv().await.unwrap();
        assert_eq!(received, Notification::BlocksChanged);
    }

    #[tokio::test]
    async fn send_without_subscribers_is_noop() {
        let hub = NotifyHub::new();
        // No subscriber — must not panic or block.
        hub.send(Notification::BlocksChanged);
    }

    #[tokio::test]
    async fn each_subscriber_sees_every_notification() {
        let hub = NotifyHub::new();
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();

        hub.send(Notification::BlocksChanged);

        assert_eq!(a.recv().await.unwrap(), Notification::BlocksChanged);
        assert_eq!(b.recv().await.unwrap(), Notification::BlocksChanged);
    }
}
