use chrono::Utc;
use tracing::{error, info, warn};

use super::{Coordinator, DocumentName};
use crate::engine::ReplicatedText;

/// What `on_load` did to the live text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No file path in the identifier
    Skipped,
    /// No stored file; the document starts empty
    NotFound,
    /// Stored content was inserted into the empty live text
    Loaded { chars: usize },
    /// Live text already had content and was left alone
    KeptLive,
    /// The store failed; the document starts empty
    ReadFailed,
}

/// What `on_change` did with the live text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Skipped,
    Written,
    /// No file matched; nothing is created
    FileMissing,
    /// The store failed; the next change retries
    WriteFailed,
}

impl Coordinator {
    /// Seed a freshly opened document from its stored file.
    ///
    /// Stored content never replaces live content that is already there.
    pub async fn on_load(&self, document: &DocumentName, text: &dyn ReplicatedText) -> LoadOutcome {
        let room_id = document.room_key.as_str();
        let Some(path) = document.persisted_path() else {
            warn!("⚠️ No filePath in {} - using empty document", document);
            return LoadOutcome::Skipped;
        };

        let file = match self.store.find_file(room_id, path).await {
            Ok(Some(file)) => file,
            Ok(None) => return LoadOutcome::NotFound,
            Err(e) => {
                error!("❌ Document load error for {} in room {}: {}", path, room_id, e);
                return LoadOutcome::ReadFailed;
            }
        };
        info!("📂 Loading file: {} in room {}", path, room_id);

        if !text.is_empty() {
            return LoadOutcome::KeptLive;
        }
        if file.content.is_empty() {
            return LoadOutcome::Loaded { chars: 0 };
        }
        match text.insert(0, &file.content) {
            Ok(()) => LoadOutcome::Loaded { chars: text.len() },
            Err(e) => {
                error!("❌ Failed to seed {} in room {}: {}", path, room_id, e);
                LoadOutcome::ReadFailed
            }
        }
    }

    /// Write the live text back to its file and refresh room activity
    pub async fn on_change(&self, document: &DocumentName, text: &dyn ReplicatedText) -> SyncOutcome {
        let room_id = document.room_key.as_str();
        let Some(path) = document.persisted_path() else {
            warn!("⚠️ No filePath in document name {}", document);
            return SyncOutcome::Skipped;
        };

        let content = text.read_all_text();
        let outcome = match self
            .store
            .update_file_content(room_id, path, &content, Utc::now())
            .await
        {
            Ok(0) => {
                warn!("⚠️ File not found: {} in room {}", path, room_id);
                SyncOutcome::FileMissing
            }
            Ok(_) => {
                info!("💾 Updated file: {} in room {}", path, room_id);
                SyncOutcome::Written
            }
            Err(e) => {
                error!("❌ File update error for {} in room {}: {}", path, room_id, e);
                return SyncOutcome::WriteFailed;
            }
        };

        self.touch_room(room_id).await;
        outcome
    }
}
