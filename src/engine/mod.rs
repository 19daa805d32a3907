pub mod hub;
pub mod loro_text;

pub use hub::{DocHub, DocRoom, DocUpdate};
pub use loro_text::LoroSharedText;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to edit text: {0}")]
    Mutation(String),

    #[error("Failed to import update: {0}")]
    Import(String),

    #[error("Failed to export snapshot: {0}")]
    Export(String),
}

/// Live text of one document, owned by the collaboration engine.
///
/// The coordinator only reads and inserts through this surface; merging
/// concurrent edits is the engine's job.
pub trait ReplicatedText: Send + Sync {
    fn read_all_text(&self) -> String;

    /// Length in characters
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&self, offset: usize, text: &str) -> Result<(), EngineError>;
}
