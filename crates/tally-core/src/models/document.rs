//! Document identity and text content models.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a document within a batch, normally its file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Create an identifier from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// A document whose text content is available for extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Identifier of the document.
    pub id: DocumentId,

    /// Full text content of the document.
    pub text: String,
}

impl Document {
    /// Create a document from an identifier and its text content.
    pub fn new(id: DocumentId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

/// A batch member as produced by document conversion.
///
/// Conversion failures are carried as data so the batch keeps its
/// order and unreadable documents still appear in the summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SourceDocument {
    /// The document text was extracted successfully.
    Loaded(Document),

    /// The document could not be read or contained no usable text.
    Unreadable {
        /// Identifier of the document.
        id: DocumentId,

        /// Human-readable reason the document is unreadable.
        reason: String,
    },
}

impl SourceDocument {
    /// Identifier of the underlying document regardless of state.
    pub fn id(&self) -> &DocumentId {
        match self {
            SourceDocument::Loaded(doc) => &doc.id,
            SourceDocument::Unreadable { id, .. } => id,
        }
    }
}
