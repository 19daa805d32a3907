//! Session coordination between the collaboration engine and the durable store.
//!
//! The engine calls the four hooks on [`Coordinator`]: `on_connect` and
//! `on_disconnect` (see [`lifecycle`]), `on_load` and `on_change` (see
//! [`persistence`]). The [`gc`] sweep runs on its own timer.

pub mod admission;
pub mod debounce;
pub mod docname;
pub mod error;
pub mod gc;
pub mod lifecycle;
pub mod persistence;

pub use admission::{Admission, AdmissionController, ConnectionId};
pub use debounce::ChangeDebouncer;
pub use docname::DocumentName;
pub use error::SessionError;
pub use gc::{GarbageCollector, SweepReport};
pub use lifecycle::{Session, SessionState};

use lifecycle::RoomGates;
pub use persistence::{LoadOutcome, SyncOutcome};

use std::sync::Arc;
use std::time::Duration;

use crate::db::CollabStore;

/// Tunables for the coordinator, normally derived from `Config`
#[derive(Debug, Clone)]
pub struct CollabSettings {
    pub room_capacity: usize,
    pub debounce: Duration,
    pub max_debounce: Duration,
    pub text_field: String,
    pub gc_interval: Duration,
    pub room_ttl: Duration,
    pub orphan_file_ttl: Duration,
}

impl Default for CollabSettings {
    fn default() -> Self {
        Self {
            room_capacity: 2,
            debounce: Duration::from_millis(200),
            max_debounce: Duration::from_secs(10),
            text_field: "codemirror".to_string(),
            gc_interval: Duration::from_secs(60 * 60),
            room_ttl: Duration::from_secs(24 * 60 * 60),
            orphan_file_ttl: Duration::from_secs(60 * 60),
        }
    }
}

/// Owns the connection registry and the store handle shared by every hook.
///
/// Created once at startup and handed to the engine; the registry lives
/// and dies with it.
pub struct Coordinator {
    store: Arc<dyn CollabStore>,
    admission: AdmissionController,
    gates: RoomGates,
    settings: CollabSettings,
}

impl Coordinator {
    pub fn new(store: Arc<dyn CollabStore>, settings: CollabSettings) -> Self {
        Self {
            store,
            admission: AdmissionController::new(settings.room_capacity),
            gates: RoomGates::new(),
            settings,
        }
    }

    pub fn admission(&self) -> &AdmissionController {
        &self.admission
    }

    pub fn settings(&self) -> &CollabSettings {
        &self.settings
    }

    pub fn store(&self) -> Arc<dyn CollabStore> {
        self.store.clone()
    }
}
