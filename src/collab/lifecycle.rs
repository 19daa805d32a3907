use chrono::Utc;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{error, info, warn};

use super::{ConnectionId, Coordinator, DocumentName, SessionError};

const GATE_STRIPES: usize = 16;

/// Striped locks ordering a room's admit and deactivate transitions.
///
/// A connect holds its room's gate from the room lookup through the
/// activity touch; a deactivation holds it from the member read through
/// the store write. Unrelated rooms may share a stripe.
pub(crate) struct RoomGates {
    stripes: Vec<Mutex<()>>,
}

impl RoomGates {
    pub(crate) fn new() -> Self {
        Self {
            stripes: (0..GATE_STRIPES).map(|_| Mutex::new(())).collect(),
        }
    }

    async fn lock(&self, room_id: &str) -> MutexGuard<'_, ()> {
        let mut hasher = DefaultHasher::new();
        room_id.hash(&mut hasher);
        let stripe = (hasher.finish() as usize) % self.stripes.len();
        self.stripes[stripe].lock().await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Active,
    Disconnected,
}

/// One connection's view of one document
#[derive(Debug, Clone)]
pub struct Session {
    pub document: DocumentName,
    pub conn: ConnectionId,
    state: SessionState,
}

impl Session {
    fn connecting(document: DocumentName, conn: ConnectionId) -> Self {
        Self {
            document,
            conn,
            state: SessionState::Connecting,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn room(&self) -> &str {
        &self.document.room_key
    }
}

impl Coordinator {
    /// Admit a connection to a document session.
    ///
    /// Rejections leave the registry and the store untouched.
    pub async fn on_connect(
        &self,
        document_name: &str,
        conn: ConnectionId,
    ) -> Result<Session, SessionError> {
        let document = DocumentName::parse(document_name);
        if !document.valid {
            warn!("⚠️ Invalid document format: {}", document_name);
            return Err(SessionError::InvalidIdentifier(document_name.to_string()));
        }
        let mut session = Session::connecting(document, conn);
        let room_id = session.room().to_string();
        info!(room = %room_id, path = ?session.document.file_path, conn = %conn, "📥 Connection attempt");

        let _gate = self.gates.lock(&room_id).await;
        match self.store.find_active_room(&room_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                error!("❌ Room {} not found", room_id);
                return Err(SessionError::RoomNotFound(room_id));
            }
            Err(e) => {
                error!("❌ Failed to look up room {}: {}", room_id, e);
                return Err(SessionError::StoreUnavailable(e.to_string()));
            }
        }

        let admission = self.admission.register(&room_id, conn);
        if !admission.accepted {
            error!(
                "❌ Room {} is full ({}/{} users)",
                room_id,
                admission.current_count,
                self.admission.capacity()
            );
            return Err(SessionError::RoomFull {
                room: room_id,
                capacity: self.admission.capacity(),
            });
        }
        info!(
            "✅ User connected to room {}. Active: {}/{}",
            room_id,
            admission.current_count,
            self.admission.capacity()
        );

        // The room can still have been deactivated since it was read
        if self.touch_room(&room_id).await == Some(0) {
            warn!("⚠️ Room {} was deactivated during connect", room_id);
            self.admission.unregister(&room_id, conn);
            return Err(SessionError::RoomNotFound(room_id));
        }
        session.state = SessionState::Active;
        Ok(session)
    }

    /// Release a session's slot and deactivate the room when it empties.
    ///
    /// Calling this on a session that is already disconnected does nothing.
    pub async fn on_disconnect(&self, session: &mut Session) {
        if session.state == SessionState::Disconnected {
            return;
        }
        session.state = SessionState::Disconnected;
        let room_id = session.room().to_string();
        info!(room = %room_id, path = ?session.document.file_path, conn = %session.conn, "📤 Disconnection");

        let remaining = self.admission.unregister(&room_id, session.conn);
        if remaining == 0 {
            info!("🗑️ Room {} removed from active tracking", room_id);
            self.deactivate_if_idle(&room_id).await;
        } else {
            info!("👋 User disconnected. Remaining: {}/{}", remaining, self.admission.capacity());
        }

        self.touch_room(&room_id).await;
    }

    async fn deactivate_if_idle(&self, room_id: &str) {
        let _gate = self.gates.lock(room_id).await;
        let room = match self.store.find_active_room(room_id).await {
            Ok(Some(room)) => room,
            Ok(None) => return,
            Err(e) => {
                error!("❌ Failed to load room {} for deactivation: {}", room_id, e);
                return;
            }
        };
        if room.active_member_count() > 0 {
            return;
        }
        // A connect may have landed while the room was being read
        if self.admission.count(room_id) > 0 {
            info!("Room {} regained a connection, keeping it active", room_id);
            return;
        }

        match self.store.deactivate_room(room_id, Utc::now()).await {
            Ok(_) => info!("🔒 Room {} marked as inactive", room_id),
            Err(e) => error!("❌ Failed to deactivate room {}: {}", room_id, e),
        }
    }

    /// Refresh the activity timestamp of a room that is still active.
    ///
    /// Returns the number of rooms touched, or `None` when the store failed.
    pub(crate) async fn touch_room(&self, room_id: &str) -> Option<u64> {
        match self.store.touch_room(room_id, Utc::now()).await {
            Ok(touched) => Some(touched),
            Err(e) => {
                error!("❌ Failed to refresh activity for room {}: {}", room_id, e);
                None
            }
        }
    }
}
