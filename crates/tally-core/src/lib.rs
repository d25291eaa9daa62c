//! Core library for invoice batch totalization.
//!
//! This crate provides:
//! - Content-based duplicate detection over document batches
//! - Currency-tagged amount extraction from document text
//! - Discount reconciliation with document-confirmed auto-application
//! - Interactive resolution of ambiguous totals
//! - Insertion-ordered summary reports with provenance

pub mod error;
pub mod models;
pub mod extract;
pub mod review;
pub mod dedup;
pub mod reconcile;
pub mod resolve;
pub mod report;
pub mod pipeline;

pub use error::{ReportError, ResolverError, Result, TallyError};
pub use models::config::{ConversionConfig, CurrencyConfig, ReviewConfig, TallyConfig};
pub use models::document::{Document, DocumentId, SourceDocument};
pub use extract::{AmountExtractor, AmountKind, AmountToken, ExtractionResult};
pub use review::{AmbiguousCase, DuplicateDecision, ResolverChoice, ReviewPrompt};
pub use dedup::{resolve_duplicates, DuplicateGroup, Fingerprint, Fingerprinter};
pub use reconcile::{ManualMethod, ReconciliationEngine, ReconciliationOutcome};
pub use resolve::{parse_manual_amount, InteractiveResolver};
pub use report::{OutcomeCounts, ReportAggregator, ReportEntry, Resolution, SummaryReport};
pub use pipeline::BatchProcessor;
