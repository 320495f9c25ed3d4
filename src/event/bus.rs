use tokio::sync::broadcast;
use tracing::debug;

use super::events::{DurationEvent, FanoutMessage};

/// Capacity of each broadcast topic. Slow receivers that fall behind will
/// skip messages (RecvError::Lagged).
const TOPIC_CAPACITY: usize = 1024;

/// Publish/subscribe channel shared by every component in the process.
///
/// Two topics: `duration-checker` synchronizes per-process duration
/// tracking maps, `websocket-fanout` carries user-facing notifications
/// for the connection-owning layer to deliver. Cloneable - store in
/// AppState.
#[derive(Debug, Clone)]
pub struct NotificationBus {
    duration_tx: broadcast::Sender<DurationEvent>,
    fanout_tx: broadcast::Sender<FanoutMessage>,
}

impl NotificationBus {
    pub fn new() -> Self {
        let (duration_tx, _) = broadcast::channel(TOPIC_CAPACITY);
        let (fanout_tx, _) = broadcast::channel(TOPIC_CAPACITY);
        Self {
            duration_tx,
            fanout_tx,
        }
    }

    /// Publishes a duration-check event to every live subscriber.
    /// No receivers is not an error - a single-process deployment with
    /// the scheduler stopped simply drops the event.
    pub fn publish_duration_event(&self, event: DurationEvent) {
        match self.duration_tx.send(event) {
            Ok(receivers) => {
                debug!(receivers, "Duration event published");
            }
            Err(_) => {
                debug!("Duration event published with no receivers");
            }
        }
    }

    /// Subscribe to the duration-checker topic. The scheduler calls this
    /// once for the process lifetime.
    pub fn subscribe_duration_events(&self) -> broadcast::Receiver<DurationEvent> {
        self.duration_tx.subscribe()
    }

    /// Publishes a user-facing notification on the fanout topic.
    pub fn publish_fanout(&self, message: FanoutMessage) {
        match self.fanout_tx.send(message) {
            Ok(receivers) => {
                debug!(receivers, "Fanout message published");
            }
            Err(_) => {
                debug!("Fanout message published with no receivers");
            }
        }
    }

    /// Subscribe to the websocket-fanout topic.
    pub fn subscribe_fanout(&self) -> broadcast::Receiver<FanoutMessage> {
        self.fanout_tx.subscribe()
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}
