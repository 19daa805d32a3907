use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use super::store::{CollabStore, FileRecord, RoomRecord, StoreError};

/// In-process store used when no database is configured, and by tests.
#[derive(Default)]
pub struct MemoryStore {
    rooms: RwLock<HashMap<String, RoomRecord>>,
    files: RwLock<Vec<FileRecord>>,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail until reset, to simulate an outage
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn insert_room(&self, room: RoomRecord) {
        self.rooms.write().await.insert(room.room_id.clone(), room);
    }

    pub async fn insert_file(&self, file: FileRecord) {
        self.files.write().await.push(file);
    }

    /// Room by id regardless of its active flag
    pub async fn room(&self, room_id: &str) -> Option<RoomRecord> {
        self.rooms.read().await.get(room_id).cloned()
    }

    pub async fn file(&self, room_id: &str, path: &str) -> Option<FileRecord> {
        self.files
            .read()
            .await
            .iter()
            .find(|f| f.room_id.as_deref() == Some(room_id) && f.path == path)
            .cloned()
    }

    pub async fn file_count(&self) -> usize {
        self.files.read().await.len()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is failing".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CollabStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.check()
    }

    async fn find_active_room(&self, room_id: &str) -> Result<Option<RoomRecord>, StoreError> {
        self.check()?;
        Ok(self
            .rooms
            .read()
            .await
            .get(room_id)
            .filter(|r| r.is_active)
            .cloned())
    }

    async fn touch_room(&self, room_id: &str, at: DateTime<Utc>) -> Result<u64, StoreError> {
        self.check()?;
        let mut rooms = self.rooms.write().await;
        match rooms.get_mut(room_id).filter(|r| r.is_active) {
            Some(room) => {
                room.last_activity = at;
                room.updated_at = at;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn deactivate_room(&self, room_id: &str, at: DateTime<Utc>) -> Result<u64, StoreError> {
        self.check()?;
        let mut rooms = self.rooms.write().await;
        match rooms.get_mut(room_id).filter(|r| r.is_active) {
            Some(room) => {
                room.is_active = false;
                room.updated_at = at;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_stale_rooms(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        self.check()?;
        let mut rooms = self.rooms.write().await;
        let before = rooms.len();
        rooms.retain(|_, r| {
            let stale_inactive = !r.is_active && r.updated_at < cutoff;
            let stale_activity = r.last_activity < cutoff;
            !(stale_inactive || stale_activity)
        });
        Ok((before - rooms.len()) as u64)
    }

    async fn find_file(&self, room_id: &str, path: &str) -> Result<Option<FileRecord>, StoreError> {
        self.check()?;
        Ok(self.file(room_id, path).await)
    }

    async fn update_file_content(
        &self,
        room_id: &str,
        path: &str,
        content: &str,
        at: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        self.check()?;
        let mut files = self.files.write().await;
        let mut modified = 0;
        for file in files
            .iter_mut()
            .filter(|f| f.room_id.as_deref() == Some(room_id) && f.path == path)
        {
            file.content = content.to_string();
            file.updated_at = at;
            modified += 1;
        }
        Ok(modified)
    }

    async fn delete_orphaned_files(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        self.check()?;
        let mut files = self.files.write().await;
        let before = files.len();
        files.retain(|f| !(f.room_id.is_none() && f.updated_at < cutoff));
        Ok((before - files.len()) as u64)
    }
}
