//! Error types for the tally-core library.

use thiserror::Error;

use crate::models::document::DocumentId;

/// Main error type for the tally library.
#[derive(Error, Debug)]
pub enum TallyError {
    /// Summary report assembly error.
    #[error("report error: {0}")]
    Report(#[from] ReportError),

    /// Interactive resolution error.
    #[error("resolver error: {0}")]
    Resolver(#[from] ResolverError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to summary report assembly.
#[derive(Error, Debug)]
pub enum ReportError {
    /// The same document was recorded twice.
    #[error("document {0} was already recorded")]
    DuplicateRecord(DocumentId),

    /// An ambiguous outcome reached the report without being resolved.
    #[error("cannot record unresolved ambiguity for {0}")]
    UnresolvedAmbiguity(DocumentId),
}

/// Errors related to interactive resolution.
#[derive(Error, Debug)]
pub enum ResolverError {
    /// The resolver was driven again after it already produced a total.
    #[error("ambiguity for {0} was already resolved")]
    AlreadyResolved(DocumentId),
}

/// Result type for the tally library.
pub type Result<T> = std::result::Result<T, TallyError>;
