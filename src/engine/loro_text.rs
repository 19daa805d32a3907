use loro::{ExportMode, LoroDoc};

use super::{EngineError, ReplicatedText};

/// A `LoroDoc` whose root text container holds a file's content
pub struct LoroSharedText {
    doc: LoroDoc,
    field: String,
}

impl LoroSharedText {
    pub fn new(field: &str) -> Self {
        Self {
            doc: LoroDoc::new(),
            field: field.to_string(),
        }
    }

    pub fn doc(&self) -> &LoroDoc {
        &self.doc
    }

    /// Merge an update or snapshot received from a peer
    pub fn import(&self, bytes: &[u8]) -> Result<(), EngineError> {
        self.doc
            .import(bytes)
            .map(|_| ())
            .map_err(|e| EngineError::Import(e.to_string()))
    }

    /// Full snapshot sent to a freshly joined peer
    pub fn snapshot(&self) -> Result<Vec<u8>, EngineError> {
        self.doc
            .export(ExportMode::Snapshot)
            .map_err(|e| EngineError::Export(e.to_string()))
    }
}

impl ReplicatedText for LoroSharedText {
    fn read_all_text(&self) -> String {
        self.doc.get_text(self.field.as_str()).to_string()
    }

    fn len(&self) -> usize {
        self.doc.get_text(self.field.as_str()).len_unicode()
    }

    fn insert(&self, offset: usize, text: &str) -> Result<(), EngineError> {
        self.doc
            .get_text(self.field.as_str())
            .insert(offset, text)
            .map_err(|e| EngineError::Mutation(e.to_string()))?;
        self.doc.commit();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn insert_is_visible_through_the_text_surface() {
        let text = LoroSharedText::new("codemirror");
        assert!(text.is_empty());
        text.insert(0, "print('hi')").unwrap();
        assert_eq!(text.read_all_text(), "print('hi')");
        assert_eq!(text.len(), 11);
    }

    #[test]
    fn snapshot_carries_content_to_another_replica() {
        let source = LoroSharedText::new("codemirror");
        source.insert(0, "fn main() {}").unwrap();

        let replica = LoroSharedText::new("codemirror");
        replica.import(&source.snapshot().unwrap()).unwrap();
        assert_eq!(replica.read_all_text(), "fn main() {}");
    }

    #[test]
    fn garbage_update_is_rejected() {
        let text = LoroSharedText::new("codemirror");
        assert!(text.import(&[0xde, 0xad, 0xbe, 0xef]).is_err());
    }
}
