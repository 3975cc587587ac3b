//! Notification Bus: typed in-process publish/subscribe for cross-component
//! signals. Built on a `tokio::sync::broadcast` channel so every subscriber
//! sees every event published after it subscribed.

use tokio::sync::broadcast;

use crate::types::events::QrEvent;

const BUS_CAPACITY: usize = 64;

/// Cloneable handle; all clones publish into the same channel.
#[derive(Debug, Clone)]
pub struct NotificationBus {
    sender: broadcast::Sender<QrEvent>,
}

impl NotificationBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BUS_CAPACITY);
        Self { sender }
    }

    /// Publishes an event. Having no subscribers is not an error.
    pub fn publish(&self, event: QrEvent) {
        log::debug!("publishing {}", event.name());
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QrEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Drains everything currently queued for `receiver` without blocking.
/// Lagged receivers skip the overwritten events and keep going.
pub fn drain(receiver: &mut broadcast::Receiver<QrEvent>) -> Vec<QrEvent> {
    let mut events = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(event) => events.push(event),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                log::warn!("notification subscriber lagged, {} events dropped", skipped);
            }
            Err(_) => break,
        }
    }
    events
}
