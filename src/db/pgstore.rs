use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use super::store::{CollabStore, FileRecord, RoomMember, RoomRecord, StoreError};

const SCHEMA_SQL: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS rooms (
        room_id TEXT PRIMARY KEY,
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        users JSONB NOT NULL DEFAULT '[]'::jsonb,
        last_activity TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS files (
        id UUID PRIMARY KEY,
        room_id TEXT NULL,
        path TEXT NOT NULL,
        content TEXT NOT NULL DEFAULT '',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        UNIQUE (room_id, path)
    )
    "#,
];

#[derive(sqlx::FromRow)]
struct RoomRow {
    room_id: String,
    is_active: bool,
    users: Json<Vec<RoomMember>>,
    last_activity: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<RoomRow> for RoomRecord {
    fn from(row: RoomRow) -> Self {
        Self {
            room_id: row.room_id,
            is_active: row.is_active,
            users: row.users.0,
            last_activity: row.last_activity,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct FileRow {
    id: Uuid,
    room_id: Option<String>,
    path: String,
    content: String,
    updated_at: DateTime<Utc>,
}

impl From<FileRow> for FileRecord {
    fn from(row: FileRow) -> Self {
        Self {
            id: row.id,
            room_id: row.room_id,
            path: row.path,
            content: row.content,
            updated_at: row.updated_at,
        }
    }
}

/// Postgres backed store
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new database connection pool
    ///
    /// # Arguments
    /// * `database_url` - PostgreSQL connection string
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        info!("Connecting to database...");

        let pool = PgPoolOptions::new()
            .max_connections(20)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .connect(database_url)
            .await?;

        info!("Database connection pool created successfully");

        Ok(Self { pool })
    }

    /// Create the `rooms` and `files` tables if they are missing
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA_SQL {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Database schema verified");
        Ok(())
    }

    fn log_pool_state(&self, operation: &str) {
        let pool_idle = self.pool.num_idle() as u32;
        let pool_size = self.pool.size();
        debug!(
            "{}. Pool connections: {} idle, {} in use",
            operation,
            pool_idle,
            pool_size.saturating_sub(pool_idle)
        );
    }
}

#[async_trait]
impl CollabStore for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_active_room(&self, room_id: &str) -> Result<Option<RoomRecord>, StoreError> {
        self.log_pool_state("Loading room");

        let query_sql = r#"
            SELECT room_id, is_active, users, last_activity, created_at, updated_at
            FROM rooms
            WHERE room_id = $1
                AND is_active = TRUE
        "#;
        let row = sqlx::query_as::<_, RoomRow>(query_sql)
            .bind(room_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(RoomRecord::from))
    }

    async fn touch_room(&self, room_id: &str, at: DateTime<Utc>) -> Result<u64, StoreError> {
        let query_sql = r#"
            UPDATE rooms
            SET last_activity = $1,
                updated_at = $1
            WHERE room_id = $2
                AND is_active = TRUE
        "#;
        let result = sqlx::query(query_sql)
            .bind(at)
            .bind(room_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn deactivate_room(&self, room_id: &str, at: DateTime<Utc>) -> Result<u64, StoreError> {
        let query_sql = r#"
            UPDATE rooms
            SET is_active = FALSE,
                updated_at = $1
            WHERE room_id = $2
                AND is_active = TRUE
        "#;
        let result = sqlx::query(query_sql)
            .bind(at)
            .bind(room_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_stale_rooms(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        self.log_pool_state("Sweeping stale rooms");

        let query_sql = r#"
            DELETE FROM rooms
            WHERE (is_active = FALSE AND updated_at < $1)
                OR last_activity < $1
        "#;
        let result = sqlx::query(query_sql)
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn find_file(&self, room_id: &str, path: &str) -> Result<Option<FileRecord>, StoreError> {
        self.log_pool_state("Loading file");

        let query_sql = r#"
            SELECT id, room_id, path, content, updated_at
            FROM files
            WHERE room_id = $1
                AND path = $2
        "#;
        let row = sqlx::query_as::<_, FileRow>(query_sql)
            .bind(room_id)
            .bind(path)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(FileRecord::from))
    }

    async fn update_file_content(
        &self,
        room_id: &str,
        path: &str,
        content: &str,
        at: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let query_sql = r#"
            UPDATE files
            SET content = $1,
                updated_at = $2
            WHERE room_id = $3
                AND path = $4
        "#;
        let result = sqlx::query(query_sql)
            .bind(content)
            .bind(at)
            .bind(room_id)
            .bind(path)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_orphaned_files(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        self.log_pool_state("Sweeping orphaned files");

        let query_sql = r#"
            DELETE FROM files
            WHERE updated_at < $1
                AND room_id IS NULL
        "#;
        let result = sqlx::query(query_sql)
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
