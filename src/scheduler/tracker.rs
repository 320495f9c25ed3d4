use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Local deadline entry for one room this process is enforcing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedRoom {
    /// Unix timestamp (seconds) of room creation.
    pub started_at: i64,
    /// Duration budget in minutes.
    pub duration: u64,
}

impl TrackedRoom {
    /// Unix timestamp after which the room is overdue.
    pub fn deadline(&self) -> i64 {
        self.started_at + (self.duration as i64) * 60
    }
}

/// Per-process map of room deadlines, shared between the sweep loop
/// (reader) and the event subscription and room creation paths (writers).
///
/// Owned and injected explicitly rather than living in ambient global
/// state; lifecycle is tied to process start/stop. Entries for the same
/// room may exist in several processes' trackers, but duration events
/// are broadcast so they all converge (last event wins).
#[derive(Debug, Default)]
pub struct DurationTracker {
    rooms: RwLock<HashMap<String, TrackedRoom>>,
}

impl DurationTracker {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
        }
    }

    /// Starts enforcing a room's deadline in this process.
    pub async fn track(&self, room_id: &str, started_at: i64, duration: u64) {
        let mut rooms = self.rooms.write().await;
        rooms.insert(
            room_id.to_string(),
            TrackedRoom {
                started_at,
                duration,
            },
        );
        debug!(room_id = %room_id, started_at, duration, "Room tracked");
    }

    /// Drops a room's tracking entry. Returns whether one existed.
    pub async fn untrack(&self, room_id: &str) -> bool {
        let removed = self.rooms.write().await.remove(room_id).is_some();
        if removed {
            debug!(room_id = %room_id, "Room untracked");
        }
        removed
    }

    /// Replaces a room's duration budget with an absolute new value. The
    /// deadline is recomputed from the original start time. Returns None
    /// when this process holds no entry for the room, in which case the
    /// caller must treat the update as someone else's to enforce.
    pub async fn increase_duration(&self, room_id: &str, duration: u64) -> Option<u64> {
        let mut rooms = self.rooms.write().await;
        let entry = rooms.get_mut(room_id)?;
        entry.duration = duration;
        debug!(room_id = %room_id, duration, "Tracked duration replaced");
        Some(entry.duration)
    }

    /// Ids of every tracked room whose deadline has passed, computed
    /// under a single read lock.
    pub async fn expired(&self, now: i64) -> Vec<String> {
        let rooms = self.rooms.read().await;
        rooms
            .iter()
            .filter(|(_, tracked)| now > tracked.deadline())
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub async fn is_tracked(&self, room_id: &str) -> bool {
        self.rooms.read().await.contains_key(room_id)
    }

    pub async fn get(&self, room_id: &str) -> Option<TrackedRoom> {
        self.rooms.read().await.get(room_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.rooms.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rooms.read().await.is_empty()
    }
}
