//! Review seam between the batch pipeline and the operator.

use rust_decimal::Decimal;

use crate::dedup::DuplicateGroup;
use crate::extract::AmountToken;
use crate::models::document::DocumentId;

/// Operator decision for a group of identical documents.
#[derive(Debug, Clone, PartialEq)]
pub enum DuplicateDecision {
    /// Drop the named document from the batch.
    Remove(DocumentId),

    /// Keep every remaining member.
    KeepAll,
}

/// Operator decision for an ambiguous reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolverChoice {
    /// Use this amount as the final total.
    Enter(Decimal),

    /// Keep the candidate total unchanged.
    Skip,

    /// Subtract the discounts at these zero-based indices.
    ApplyDiscounts(Vec<usize>),
}

/// Everything a reviewer needs to settle one ambiguous document.
#[derive(Debug, Clone)]
pub struct AmbiguousCase {
    /// Document under review.
    pub document_id: DocumentId,

    /// Highest gross amount, used as the total unless overridden.
    pub candidate_total: Decimal,

    /// Gross amounts found in the document.
    pub gross: Vec<AmountToken>,

    /// Discount amounts found in the document.
    pub discounts: Vec<AmountToken>,
}

/// Interactive surface consulted by the batch pipeline.
///
/// Implementations decide how questions reach the operator. The
/// pipeline itself never touches stdin or stdout.
pub trait ReviewPrompt {
    /// Ask what to do with a group of identical documents.
    fn review_duplicates(&self, group: &DuplicateGroup) -> DuplicateDecision;

    /// Ask how to settle a document whose total could not be proven.
    fn review_ambiguity(&self, case: &AmbiguousCase) -> ResolverChoice;
}
