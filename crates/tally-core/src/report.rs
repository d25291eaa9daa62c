//! Insertion-ordered summary report assembly.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ReportError;
use crate::models::document::DocumentId;
use crate::reconcile::{ManualMethod, ReconciliationOutcome};

/// Provenance of a report entry's total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    /// Highest gross amount, no discount involved.
    Auto,

    /// Discount applied and confirmed by the document itself.
    AutoDiscounted {
        /// Discount that was subtracted.
        applied: Decimal,
    },

    /// Settled by an operator.
    Manual {
        /// How the operator settled it.
        method: ManualMethod,
    },

    /// The document could not be read.
    Unreadable,
}

/// One line of the summary report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Document the entry belongs to.
    pub id: DocumentId,

    /// Final total, or None when the document was unreadable.
    pub total: Option<Decimal>,

    /// Where the total came from.
    pub resolution: Resolution,

    /// Human-readable provenance note.
    pub note: String,
}

/// Entry counts by provenance, manual outcomes split per method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    /// Totals taken straight from the highest gross amount.
    pub auto: usize,

    /// Totals with an automatically confirmed discount.
    pub auto_discounted: usize,

    /// Totals typed in by an operator.
    pub entered: usize,

    /// Totals where the operator kept the highest amount.
    pub skipped: usize,

    /// Totals with operator-selected discounts applied.
    pub discount_selection: usize,

    /// Documents that could not be read.
    pub unreadable: usize,
}

impl OutcomeCounts {
    /// Entries settled by an operator, over all manual methods.
    pub fn manual(&self) -> usize {
        self.entered + self.skipped + self.discount_selection
    }

    /// Total number of entries counted.
    pub fn total(&self) -> usize {
        self.auto + self.auto_discounted + self.manual() + self.unreadable
    }
}

/// Finished batch summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    /// Entries in processing order.
    pub entries: Vec<ReportEntry>,

    /// Exact sum of all present totals.
    pub grand_total: Decimal,

    /// Entry counts by provenance.
    pub counts: OutcomeCounts,

    /// When the report was finalized.
    pub finalized_at: DateTime<Utc>,
}

impl SummaryReport {
    /// Look up the entry for a document.
    pub fn entry(&self, id: &DocumentId) -> Option<&ReportEntry> {
        self.entries.iter().find(|e| e.id == *id)
    }
}

/// Collects per-document outcomes in processing order.
#[derive(Debug, Default)]
pub struct ReportAggregator {
    entries: Vec<ReportEntry>,
    seen: HashSet<DocumentId>,
}

impl ReportAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the outcome for a document.
    ///
    /// Ambiguous outcomes must be resolved before they reach the
    /// report; recording one is an error, as is recording the same
    /// document twice.
    pub fn record(
        &mut self,
        id: DocumentId,
        outcome: &ReconciliationOutcome,
    ) -> Result<(), ReportError> {
        let (total, resolution, note) = match outcome {
            ReconciliationOutcome::Ambiguous { .. } => {
                return Err(ReportError::UnresolvedAmbiguity(id));
            }
            ReconciliationOutcome::AutoResolved {
                total,
                applied_discount: None,
            } => (*total, Resolution::Auto, String::new()),
            ReconciliationOutcome::AutoResolved {
                total,
                applied_discount: Some(applied),
            } => (
                *total,
                Resolution::AutoDiscounted { applied: *applied },
                format!("Applied discount of -{:.2}.", applied),
            ),
            ReconciliationOutcome::ManuallyResolved { total, method } => (
                *total,
                Resolution::Manual { method: *method },
                manual_note(*method),
            ),
        };

        if !self.seen.insert(id.clone()) {
            return Err(ReportError::DuplicateRecord(id));
        }

        self.entries.push(ReportEntry {
            id,
            total: Some(total),
            resolution,
            note,
        });
        Ok(())
    }

    /// Append the marker entry for an unreadable document.
    pub fn record_unreadable(&mut self, id: DocumentId, reason: &str) -> Result<(), ReportError> {
        if !self.seen.insert(id.clone()) {
            return Err(ReportError::DuplicateRecord(id));
        }

        self.entries.push(ReportEntry {
            id,
            total: None,
            resolution: Resolution::Unreadable,
            note: reason.to_string(),
        });
        Ok(())
    }

    /// Consume the aggregator and produce the finished report.
    pub fn finalize(self) -> SummaryReport {
        let grand_total: Decimal = self.entries.iter().filter_map(|e| e.total).sum();

        let mut counts = OutcomeCounts::default();
        for entry in &self.entries {
            match entry.resolution {
                Resolution::Auto => counts.auto += 1,
                Resolution::AutoDiscounted { .. } => counts.auto_discounted += 1,
                Resolution::Manual { method } => match method {
                    ManualMethod::Entered => counts.entered += 1,
                    ManualMethod::Skipped => counts.skipped += 1,
                    ManualMethod::DiscountSelection => counts.discount_selection += 1,
                },
                Resolution::Unreadable => counts.unreadable += 1,
            }
        }

        debug!("finalized report with {} entries", self.entries.len());

        SummaryReport {
            entries: self.entries,
            grand_total,
            counts,
            finalized_at: Utc::now(),
        }
    }
}

fn manual_note(method: ManualMethod) -> String {
    match method {
        ManualMethod::Entered => "Manually entered total.".to_string(),
        ManualMethod::Skipped => "Skipped discount in interactive mode.".to_string(),
        ManualMethod::DiscountSelection => "Manually applied selected discounts.".to_string(),
    }
}
