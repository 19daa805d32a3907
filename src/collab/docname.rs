/// Separator between the room id and the file path in a session identifier
pub const DELIMITER: &str = "::";

/// A session identifier split into its room and file parts.
///
/// `"roomA::src/a.js"` resolves to room `roomA` and path `src/a.js`. Only the
/// first delimiter separates; any later ones belong to the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentName {
    pub room_key: String,
    pub file_path: Option<String>,
    pub valid: bool,
}

impl DocumentName {
    pub fn parse(name: &str) -> Self {
        match name.split_once(DELIMITER) {
            Some((room, path)) => Self {
                room_key: room.to_string(),
                file_path: Some(path.to_string()),
                valid: true,
            },
            None => Self {
                room_key: name.to_string(),
                file_path: None,
                valid: false,
            },
        }
    }

    /// The file path when it is usable for persistence (present and non-empty)
    pub fn persisted_path(&self) -> Option<&str> {
        self.file_path.as_deref().filter(|p| !p.is_empty())
    }
}

impl std::fmt::Display for DocumentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.file_path {
            Some(path) => write!(f, "{}{}{}", self.room_key, DELIMITER, path),
            None => write!(f, "{}", self.room_key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn splits_room_and_path() {
        assert_eq!(
            DocumentName::parse("roomA::path/to/file.js"),
            DocumentName {
                room_key: "roomA".to_string(),
                file_path: Some("path/to/file.js".to_string()),
                valid: true,
            }
        );
    }

    #[test]
    fn missing_delimiter_is_invalid() {
        let name = DocumentName::parse("roomA");
        assert!(!name.valid);
        assert_eq!(name.room_key, "roomA");
        assert_eq!(name.file_path, None);
    }

    #[test]
    fn later_delimiters_stay_in_the_path() {
        let name = DocumentName::parse("r::a::b::c.rs");
        assert_eq!(name.room_key, "r");
        assert_eq!(name.file_path.as_deref(), Some("a::b::c.rs"));
    }

    #[test]
    fn empty_path_is_valid_but_not_persisted() {
        let name = DocumentName::parse("roomA::");
        assert!(name.valid);
        assert_eq!(name.persisted_path(), None);
    }

    proptest! {
        #[test]
        fn display_restores_the_original_identifier(
            room in "[a-zA-Z0-9_-]{0,12}",
            path in "[a-zA-Z0-9_./:-]{0,24}",
        ) {
            let raw = format!("{}::{}", room, path);
            let name = DocumentName::parse(&raw);
            prop_assert!(name.valid);
            prop_assert_eq!(&name.room_key, &room);
            prop_assert_eq!(name.to_string(), raw);
        }

        #[test]
        fn identifiers_without_delimiter_are_rejected(raw in "[a-zA-Z0-9_/.-]{0,32}") {
            let name = DocumentName::parse(&raw);
            prop_assert!(!name.valid);
            prop_assert_eq!(name.room_key, raw);
        }
    }
}
