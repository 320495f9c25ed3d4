use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument};

use crate::shared::AppError;

/// Coordination store for breakout room records, shared by every server
/// process. One hash per parent room: field = breakout-room-id, value =
/// JSON-serialized record. A record exists in the hash if and only if
/// the room has not yet ended.
#[async_trait]
pub trait BreakoutStore {
    async fn put_room(
        &self,
        parent_room_id: &str,
        breakout_room_id: &str,
        value: String,
    ) -> Result<(), AppError>;

    async fn get_room(
        &self,
        parent_room_id: &str,
        breakout_room_id: &str,
    ) -> Result<Option<String>, AppError>;

    /// All fields of the parent's hash; empty map when none exist.
    async fn get_all_rooms(
        &self,
        parent_room_id: &str,
    ) -> Result<HashMap<String, String>, AppError>;

    async fn delete_room(
        &self,
        parent_room_id: &str,
        breakout_room_id: &str,
    ) -> Result<(), AppError>;

    /// Drops the parent's entire hash entry in one shot.
    async fn delete_all(&self, parent_room_id: &str) -> Result<(), AppError>;
}

/// In-memory implementation of BreakoutStore for development and testing
pub struct InMemoryBreakoutStore {
    hashes: Mutex<HashMap<String, HashMap<String, String>>>,
}

impl Default for InMemoryBreakoutStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBreakoutStore {
    /// Creates a new empty in-memory store
    pub fn new() -> Self {
        Self {
            hashes: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl BreakoutStore for InMemoryBreakoutStore {
    #[instrument(skip(self, value))]
    async fn put_room(
        &self,
        parent_room_id: &str,
        breakout_room_id: &str,
        value: String,
    ) -> Result<(), AppError> {
        let mut hashes = self.hashes.lock().unwrap();
        hashes
            .entry(parent_room_id.to_string())
            .or_default()
            .insert(breakout_room_id.to_string(), value);

        debug!(
            parent_room_id = %parent_room_id,
            breakout_room_id = %breakout_room_id,
            "Breakout room record stored"
        );
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_room(
        &self,
        parent_room_id: &str,
        breakout_room_id: &str,
    ) -> Result<Option<String>, AppError> {
        let hashes = self.hashes.lock().unwrap();
        let value = hashes
            .get(parent_room_id)
            .and_then(|h| h.get(breakout_room_id))
            .cloned();

        match &value {
            Some(_) => debug!(breakout_room_id = %breakout_room_id, "Record found"),
            None => debug!(breakout_room_id = %breakout_room_id, "Record not found"),
        }

        Ok(value)
    }

    #[instrument(skip(self))]
    async fn get_all_rooms(
        &self,
        parent_room_id: &str,
    ) -> Result<HashMap<String, String>, AppError> {
        let hashes = self.hashes.lock().unwrap();
        Ok(hashes.get(parent_room_id).cloned().unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn delete_room(
        &self,
        parent_room_id: &str,
        breakout_room_id: &str,
    ) -> Result<(), AppError> {
        let mut hashes = self.hashes.lock().unwrap();
        if let Some(hash) = hashes.get_mut(parent_room_id) {
            hash.remove(breakout_room_id);
            if hash.is_empty() {
                hashes.remove(parent_room_id);
            }
        }

        debug!(
            parent_room_id = %parent_room_id,
            breakout_room_id = %breakout_room_id,
            "Breakout room record deleted"
        );
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_all(&self, parent_room_id: &str) -> Result<(), AppError> {
        let mut hashes = self.hashes.lock().unwrap();
        hashes.remove(parent_room_id);

        debug!(parent_room_id = %parent_room_id, "Breakout room hash deleted");
        Ok(())
    }
}
