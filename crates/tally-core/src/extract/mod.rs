//! Currency-tagged amount extraction.

mod amounts;

pub use amounts::AmountExtractor;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Classification of an extracted amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountKind {
    /// A positive amount, a candidate for the invoice total.
    Gross,

    /// A negative amount, a discount or credit line.
    Discount,
}

/// A single currency amount found in document text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountToken {
    /// Extracted value, always non-negative.
    pub value: Decimal,

    /// Whether the amount appeared as a gross value or a discount.
    pub kind: AmountKind,

    /// Byte offsets of the match in the source text.
    pub span: (usize, usize),

    /// Source text that was matched.
    pub source: String,
}

/// All amounts extracted from one document, in order of appearance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Gross amounts in order of appearance.
    pub gross: Vec<AmountToken>,

    /// Discount amounts in order of appearance.
    pub discounts: Vec<AmountToken>,
}

impl ExtractionResult {
    /// True when no amounts of either kind were found.
    pub fn is_empty(&self) -> bool {
        self.gross.is_empty() && self.discounts.is_empty()
    }
}
