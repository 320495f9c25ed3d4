use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, error, info, instrument, warn};

use super::tracker::DurationTracker;
use crate::breakout::models::RoomMetadata;
use crate::directory::RoomDirectory;
use crate::event::{DurationEvent, DurationEventType, NotificationBus};

/// Configuration for the duration scheduler
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// How often the sweep scans the tracking map for overdue rooms
    pub sweep_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(5),
        }
    }
}

impl SchedulerConfig {
    /// Reads the sweep interval from SWEEP_INTERVAL_SECS, defaulting to 5s
    pub fn from_env() -> Self {
        let secs = std::env::var("SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);
        Self {
            sweep_interval: Duration::from_secs(secs),
        }
    }
}

/// Handle to a running scheduler. Dropping it does not stop the loops;
/// call `shutdown` for a clean stop.
pub struct SchedulerHandle {
    stop_tx: watch::Sender<bool>,
    sweep_task: JoinHandle<()>,
    subscription_task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Signals both loops to stop and waits for them to finish.
    pub async fn shutdown(self) {
        let _ = self.stop_tx.send(true);
        let _ = self.sweep_task.await;
        let _ = self.subscription_task.await;
    }
}

/// Per-process duration scheduler: a fixed-interval sweep that ends
/// overdue rooms, plus a bus subscription that applies duration events
/// originating from any process (this one included).
pub struct DurationScheduler {
    tracker: Arc<DurationTracker>,
    directory: Arc<dyn RoomDirectory + Send + Sync>,
    bus: NotificationBus,
    config: SchedulerConfig,
}

impl DurationScheduler {
    pub fn new(
        tracker: Arc<DurationTracker>,
        directory: Arc<dyn RoomDirectory + Send + Sync>,
        bus: NotificationBus,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            tracker,
            directory,
            bus,
            config,
        }
    }

    /// Starts both background loops. Each runs until the returned handle
    /// is shut down or the process exits.
    pub fn start(self) -> SchedulerHandle {
        info!(
            sweep_interval_secs = self.config.sweep_interval.as_secs(),
            "Starting duration scheduler"
        );

        let (stop_tx, stop_rx) = watch::channel(false);

        let subscription_task = tokio::spawn(run_subscription_loop(
            Arc::clone(&self.tracker),
            Arc::clone(&self.directory),
            self.bus.subscribe_duration_events(),
            stop_rx.clone(),
        ));

        let sweep_task = tokio::spawn(run_sweep_loop(
            Arc::clone(&self.tracker),
            Arc::clone(&self.directory),
            self.config.sweep_interval,
            stop_rx,
        ));

        SchedulerHandle {
            stop_tx,
            sweep_task,
            subscription_task,
        }
    }
}

async fn run_sweep_loop(
    tracker: Arc<DurationTracker>,
    directory: Arc<dyn RoomDirectory + Send + Sync>,
    sweep_interval: Duration,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut ticker = interval(sweep_interval);

    loop {
        tokio::select! {
            _ = stop_rx.changed() => {
                info!("Sweep loop stopping");
                return;
            }
            _ = ticker.tick() => {
                end_expired_rooms(&tracker, &directory).await;
            }
        }
    }
}

/// One sweep pass: ends every tracked room whose deadline has passed.
/// Ending is detect-and-end only; the tracking entry is removed later by
/// the `delete` event the directory publishes. Returns how many rooms
/// were ended.
#[instrument(skip(tracker, directory))]
pub async fn end_expired_rooms(
    tracker: &DurationTracker,
    directory: &Arc<dyn RoomDirectory + Send + Sync>,
) -> usize {
    let now = Utc::now().timestamp();
    let expired = tracker.expired(now).await;

    if expired.is_empty() {
        return 0;
    }

    let mut ended = 0;
    for room_id in expired {
        match directory.end_room(&room_id).await {
            Ok(true) => {
                ended += 1;
                info!(room_id = %room_id, "Ended overdue room");
            }
            Ok(false) => {
                // Another process or a previous tick already ended it;
                // the delete event will drop our entry shortly.
                debug!(room_id = %room_id, "Overdue room was already ended");
            }
            Err(e) => {
                error!(room_id = %room_id, error = %e, "Failed to end overdue room");
            }
        }
    }

    ended
}

async fn run_subscription_loop(
    tracker: Arc<DurationTracker>,
    directory: Arc<dyn RoomDirectory + Send + Sync>,
    mut receiver: broadcast::Receiver<DurationEvent>,
    mut stop_rx: watch::Receiver<bool>,
) {
    info!("Duration event subscription started");

    loop {
        tokio::select! {
            _ = stop_rx.changed() => {
                info!("Subscription loop stopping");
                return;
            }
            event = receiver.recv() => match event {
                Ok(event) => handle_duration_event(&tracker, &directory, event).await,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Duration event subscription lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    warn!("Duration event channel closed - subscription ending");
                    return;
                }
            }
        }
    }
}

/// Applies a single duration event to this process's tracking map.
///
/// `delete` drops the local entry if one exists. `increaseDuration`
/// replaces the tracked budget and, only when this process actually held
/// an entry (it is the one enforcing the deadline), rewrites the room's
/// directory metadata so its advertised duration matches.
#[instrument(skip(tracker, directory, event), fields(room_id = %event.room_id))]
pub async fn handle_duration_event(
    tracker: &DurationTracker,
    directory: &Arc<dyn RoomDirectory + Send + Sync>,
    event: DurationEvent,
) {
    match event.event_type {
        DurationEventType::Delete => {
            if tracker.untrack(&event.room_id).await {
                debug!(room_id = %event.room_id, "Tracking entry removed");
            }
        }
        DurationEventType::IncreaseDuration => {
            let Some(new_duration) = tracker
                .increase_duration(&event.room_id, event.duration)
                .await
            else {
                // Not tracked here - another process owns this deadline.
                return;
            };

            apply_room_duration(directory, &event.room_id, new_duration).await;
        }
    }
}

/// Writes the new duration budget into the room's directory metadata.
/// Failures are logged and swallowed; the tracking map already holds the
/// authoritative deadline.
async fn apply_room_duration(
    directory: &Arc<dyn RoomDirectory + Send + Sync>,
    room_id: &str,
    duration: u64,
) {
    let raw = match directory.load_room_metadata(room_id).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(room_id = %room_id, error = %e, "Could not load room metadata for duration update");
            return;
        }
    };

    let mut metadata: RoomMetadata = match serde_json::from_str(&raw) {
        Ok(metadata) => metadata,
        Err(e) => {
            warn!(room_id = %room_id, error = %e, "Room metadata is malformed");
            return;
        }
    };

    metadata.features.room_duration = duration;

    let serialized = match serde_json::to_string(&metadata) {
        Ok(serialized) => serialized,
        Err(e) => {
            warn!(room_id = %room_id, error = %e, "Could not serialize updated metadata");
            return;
        }
    };

    if let Err(e) = directory.update_room_metadata(room_id, serialized).await {
        warn!(room_id = %room_id, error = %e, "Could not write updated room duration");
    }
}
