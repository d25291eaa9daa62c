//! Discount reconciliation over extracted amounts.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::extract::{AmountToken, ExtractionResult};

/// How an operator settled an ambiguous document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ManualMethod {
    /// The operator typed the final total.
    Entered,

    /// The operator kept the candidate total.
    Skipped,

    /// The operator picked discounts to subtract.
    DiscountSelection,
}

impl fmt::Display for ManualMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ManualMethod::Entered => "entered",
            ManualMethod::Skipped => "skipped",
            ManualMethod::DiscountSelection => "discount-selection",
        };
        f.write_str(label)
    }
}

/// Result of reconciling one document's amounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReconciliationOutcome {
    /// The total was determined without operator input.
    AutoResolved {
        /// Final total for the document.
        total: Decimal,

        /// Discount that was subtracted, if any.
        #[serde(skip_serializing_if = "Option::is_none")]
        applied_discount: Option<Decimal>,
    },

    /// The total needs operator review.
    Ambiguous {
        /// Highest gross amount, or zero when none was found.
        candidate_total: Decimal,
    },

    /// The total was settled by an operator.
    ManuallyResolved {
        /// Final total for the document.
        total: Decimal,

        /// How the operator settled it.
        method: ManualMethod,
    },
}

/// Reconciles gross amounts against discounts.
///
/// A discount is applied automatically only when the document itself
/// confirms the arithmetic: the highest gross minus the highest
/// discount must reappear among the other gross amounts. Anything
/// less certain is handed to review.
pub struct ReconciliationEngine;

impl ReconciliationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Reconcile extracted amounts into an outcome.
    pub fn reconcile(&self, extraction: &ExtractionResult) -> ReconciliationOutcome {
        let (gross_idx, highest_gross) = match first_max(&extraction.gross) {
            Some(found) => found,
            None => {
                debug!("no gross amounts found");
                return ReconciliationOutcome::Ambiguous {
                    candidate_total: Decimal::ZERO,
                };
            }
        };

        let highest_discount = match first_max(&extraction.discounts) {
            Some((_, value)) => value,
            None => {
                return ReconciliationOutcome::AutoResolved {
                    total: highest_gross,
                    applied_discount: None,
                };
            }
        };

        let candidate = highest_gross - highest_discount;
        let confirmed = extraction
            .gross
            .iter()
            .enumerate()
            .any(|(idx, token)| idx != gross_idx && token.value == candidate);

        if confirmed {
            debug!(
                "applied discount {} confirmed by matching gross amount",
                highest_discount
            );
            ReconciliationOutcome::AutoResolved {
                total: candidate,
                applied_discount: Some(highest_discount),
            }
        } else {
            debug!("candidate total {} has no confirming amount", candidate);
            ReconciliationOutcome::Ambiguous {
                candidate_total: highest_gross,
            }
        }
    }
}

impl Default for ReconciliationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Index and value of the first occurrence of the largest amount.
fn first_max(tokens: &[AmountToken]) -> Option<(usize, Decimal)> {
    let mut best: Option<(usize, Decimal)> = None;
    for (idx, token) in tokens.iter().enumerate() {
        let replace = match best {
            Some((_, value)) => token.value > value,
            None => true,
        };
        if replace {
            best = Some((idx, token.value));
        }
    }
    best
}
