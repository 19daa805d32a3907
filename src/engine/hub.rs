use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, OnceCell};
use tracing::{debug, info};

use super::{EngineError, LoroSharedText};
use crate::collab::{ChangeDebouncer, ConnectionId, Coordinator, DocumentName, LoadOutcome};

const UPDATE_CHANNEL_CAPACITY: usize = 256;

/// An update received from one peer, fanned out to the others
#[derive(Debug, Clone)]
pub struct DocUpdate {
    pub from: ConnectionId,
    pub bytes: Vec<u8>,
}

/// One open document shared by every connection on the same identifier
pub struct DocRoom {
    document: DocumentName,
    text: Arc<LoroSharedText>,
    updates: broadcast::Sender<DocUpdate>,
    debouncer: ChangeDebouncer,
    loaded: OnceCell<LoadOutcome>,
}

impl DocRoom {
    fn open(document: DocumentName, coordinator: Arc<Coordinator>) -> Self {
        let settings = coordinator.settings().clone();
        let text = Arc::new(LoroSharedText::new(&settings.text_field));
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);

        let sync_text = text.clone();
        let sync_document = document.clone();
        let debouncer = ChangeDebouncer::spawn(settings.debounce, settings.max_debounce, move || {
            let coordinator = coordinator.clone();
            let text = sync_text.clone();
            let document = sync_document.clone();
            async move {
                coordinator.on_change(&document, text.as_ref()).await;
            }
        });

        Self {
            document,
            text,
            updates,
            debouncer,
            loaded: OnceCell::new(),
        }
    }

    pub fn document(&self) -> &DocumentName {
        &self.document
    }

    pub fn text(&self) -> &LoroSharedText {
        &self.text
    }

    /// Run the load hook exactly once, before the document is served
    async fn ensure_loaded(&self, coordinator: &Coordinator) -> LoadOutcome {
        *self
            .loaded
            .get_or_init(|| coordinator.on_load(&self.document, self.text.as_ref()))
            .await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DocUpdate> {
        self.updates.subscribe()
    }

    pub fn snapshot(&self) -> Result<Vec<u8>, EngineError> {
        self.text.snapshot()
    }

    /// Merge a peer's update, forward it to the other peers and schedule a sync
    pub fn apply_remote(&self, from: ConnectionId, bytes: Vec<u8>) -> Result<(), EngineError> {
        self.text.import(&bytes)?;
        // no receivers just means nobody else is listening
        let _ = self.updates.send(DocUpdate { from, bytes });
        self.debouncer.notify();
        Ok(())
    }

    pub fn has_pending_sync(&self) -> bool {
        self.debouncer.is_dirty()
    }
}

struct HubEntry {
    room: Arc<DocRoom>,
    subscribers: HashSet<ConnectionId>,
}

/// Registry of open documents keyed by session identifier
pub struct DocHub {
    coordinator: Arc<Coordinator>,
    rooms: Mutex<HashMap<String, HubEntry>>,
}

impl DocHub {
    pub fn new(coordinator: Arc<Coordinator>) -> Self {
        Self {
            coordinator,
            rooms: Mutex::new(HashMap::new()),
        }
    }

    /// Attach a connection to a document, opening and loading it if needed
    pub async fn join(&self, document: &DocumentName, conn: ConnectionId) -> Arc<DocRoom> {
        let key = document.to_string();
        let room = {
            let mut rooms = self.rooms.lock().await;
            let entry = rooms.entry(key.clone()).or_insert_with(|| {
                info!("Opening document {}", key);
                HubEntry {
                    room: Arc::new(DocRoom::open(document.clone(), self.coordinator.clone())),
                    subscribers: HashSet::new(),
                }
            });
            entry.subscribers.insert(conn);
            entry.room.clone()
        };

        let outcome = room.ensure_loaded(&self.coordinator).await;
        debug!(document = %key, ?outcome, "document ready");
        room
    }

    /// Detach a connection. The last one out flushes pending changes and
    /// closes the document.
    pub async fn leave(&self, document: &DocumentName, conn: ConnectionId) {
        let key = document.to_string();
        let closed = {
            let mut rooms = self.rooms.lock().await;
            let Some(entry) = rooms.get_mut(&key) else {
                return;
            };
            entry.subscribers.remove(&conn);
            if entry.subscribers.is_empty() {
                rooms.remove(&key).map(|entry| entry.room)
            } else {
                None
            }
        };

        if let Some(room) = closed {
            room.debouncer.shutdown().await;
            info!("Closed document {}", key);
        }
    }

    pub async fn open_documents(&self) -> usize {
        self.rooms.lock().await.len()
    }

    pub async fn pending_syncs(&self) -> usize {
        self.rooms
            .lock()
            .await
            .values()
            .filter(|entry| entry.room.has_pending_sync())
            .count()
    }
}
