//! Note records
//!
//! A note has no identifier of its own: it is addressed by its position in
//! the caller's ordered sequence on the remote store.

use crate::errors::{JotterError, Result};
use serde::{Deserialize, Serialize};

/// A single note as stored remotely
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Note {
    /// Note title
    pub title: String,
    /// Note body
    pub content: String,
}

impl Note {
    /// Create a note without validating it
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Check that title and content are fit to commit
    pub fn validate(&self) -> Result<()> {
        validate_fields(&self.title, &self.content)
    }
}

/// Reject a title or content that is empty after trimming whitespace.
///
/// The values themselves are committed untrimmed.
pub fn validate_fields(title: &str, content: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(JotterError::validation("title must not be blank"));
    }
    if content.trim().is_empty() {
        return Err(JotterError::validation("content must not be blank"));
    }
    Ok(())
}
