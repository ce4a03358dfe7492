//! Draft for a note not yet added

use crate::edit::DraftField;
use jotter_core::note::validate_fields;

/// Title and content typed into the add form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    /// Draft title
    pub title: String,
    /// Draft content
    pub content: String,
}

impl NoteDraft {
    /// Create an empty draft
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one field
    pub fn set(&mut self, field: DraftField, value: impl Into<String>) {
        match field {
            DraftField::Title => self.title = value.into(),
            DraftField::Content => self.content = value.into(),
        }
    }

    /// Whether both fields are non-blank, i.e. the add action can be enabled
    pub fn is_submittable(&self) -> bool {
        validate_fields(&self.title, &self.content).is_ok()
    }

    /// Reset both fields
    pub fn clear(&mut self) {
        self.title.clear();
        self.content.clear();
    }
}
