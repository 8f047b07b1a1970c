/// Name used when a document has never been opened or saved.
pub const UNTITLED: &str = "untitled.md";

/// Identity of the document being edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSession {
    /// `None` for a new, never saved document.
    pub name: Option<String>,
    /// Set by any buffer mutation, cleared by a successful persist.
    pub dirty: bool,
}

impl DocumentSession {
    /// The name to show and to save under.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNTITLED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_defaults_to_untitled() {
        let mut doc = DocumentSession::default();
        assert_eq!(doc.display_name(), "untitled.md");
        doc.name = Some("notes.md".to_string());
        assert_eq!(doc.display_name(), "notes.md");
    }
}
