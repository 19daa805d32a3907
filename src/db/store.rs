use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by a durable store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// A user's membership in a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomMember {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "isActive")]
    pub is_active: bool,
}

/// Room row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRecord {
    pub room_id: String,
    pub is_active: bool,
    pub users: Vec<RoomMember>,
    pub last_activity: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RoomRecord {
    /// An active room with every timestamp set to `at`
    pub fn new(room_id: &str, users: Vec<RoomMember>, at: DateTime<Utc>) -> Self {
        Self {
            room_id: room_id.to_string(),
            is_active: true,
            users,
            last_activity: at,
            created_at: at,
            updated_at: at,
        }
    }

    pub fn active_member_count(&self) -> usize {
        self.users.iter().filter(|u| u.is_active).count()
    }
}

/// File row. A file without a room is orphaned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: Uuid,
    pub room_id: Option<String>,
    pub path: String,
    pub content: String,
    pub updated_at: DateTime<Utc>,
}

impl FileRecord {
    pub fn new(room_id: Option<&str>, path: &str, content: &str, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            room_id: room_id.map(str::to_string),
            path: path.to_string(),
            content: content.to_string(),
            updated_at: at,
        }
    }
}

/// Durable storage for rooms and files.
///
/// Update and delete operations return the number of affected rows so
/// callers can tell a missing record apart from a failed write.
#[async_trait]
pub trait CollabStore: Send + Sync {
    /// Cheap connectivity probe for readiness checks
    async fn ping(&self) -> Result<(), StoreError>;

    /// Fetch a room only if it exists and is marked active
    async fn find_active_room(&self, room_id: &str) -> Result<Option<RoomRecord>, StoreError>;

    /// Refresh `last_activity` (and `updated_at`) on an active room
    async fn touch_room(&self, room_id: &str, at: DateTime<Utc>) -> Result<u64, StoreError>;

    /// Mark an active room inactive
    async fn deactivate_room(&self, room_id: &str, at: DateTime<Utc>) -> Result<u64, StoreError>;

    /// Delete rooms that are inactive and not updated since `cutoff`, or
    /// whose last activity is older than `cutoff`
    async fn delete_stale_rooms(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError>;

    async fn find_file(&self, room_id: &str, path: &str) -> Result<Option<FileRecord>, StoreError>;

    /// Overwrite a file's content. Never creates a file.
    async fn update_file_content(
        &self,
        room_id: &str,
        path: &str,
        content: &str,
        at: DateTime<Utc>,
    ) -> Result<u64, StoreError>;

    /// Delete files without a room that were not updated since `cutoff`
    async fn delete_orphaned_files(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError>;
}
