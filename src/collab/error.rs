use thiserror::Error;

/// Reasons a session attempt is rejected
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Invalid document format '{0}'. Use roomId::filePath")]
    InvalidIdentifier(String),

    #[error("Room '{0}' not found")]
    RoomNotFound(String),

    #[error("Room '{room}' is full (max {capacity} users)")]
    RoomFull { room: String, capacity: usize },

    #[error("Room store unavailable: {0}")]
    StoreUnavailable(String),
}
