//! Regex-based extraction of currency-tagged amounts.

use std::str::FromStr;

use regex::Regex;
use rust_decimal::Decimal;
use tracing::debug;

use super::{AmountKind, AmountToken, ExtractionResult};
use crate::error::{Result, TallyError};
use crate::models::config::CurrencyConfig;

/// A decimal number with two decimal places and optional thousand
/// separators. Word boundaries keep the match from starting or ending
/// inside a longer digit run.
const NUMBER: &str = r"(\d{1,3}(?:[., \u{00a0}]?\d{3})*)[.,](\d{2})\b";

/// Extractor for amounts carrying a configured currency indicator.
///
/// An amount counts only when the currency symbol or code appears
/// directly before or after the number. A leading minus sign marks
/// the amount as a discount.
pub struct AmountExtractor {
    pattern: Regex,
}

impl AmountExtractor {
    /// Build an extractor for the given currency configuration.
    pub fn new(config: &CurrencyConfig) -> Result<Self> {
        let indicator = currency_indicator(config)?;
        let pattern = format!(
            r"(?i)(-\s*)?(?:(?:{ind})\s*{num}|\b{num}\s*(?:{ind}))",
            ind = indicator,
            num = NUMBER,
        );
        let pattern = Regex::new(&pattern)
            .map_err(|e| TallyError::Config(format!("invalid amount pattern: {}", e)))?;

        Ok(Self { pattern })
    }

    /// Extract all currency amounts from text, in order of appearance.
    pub fn extract(&self, text: &str) -> ExtractionResult {
        let mut result = ExtractionResult::default();

        for caps in self.pattern.captures_iter(text) {
            // The number groups appear twice, once per alternative.
            let (int_match, dec_match) = match (caps.get(2), caps.get(3)) {
                (Some(int), Some(dec)) => (int, dec),
                _ => match (caps.get(4), caps.get(5)) {
                    (Some(int), Some(dec)) => (int, dec),
                    _ => continue,
                },
            };

            let integer_part = int_match.as_str().replace(['.', ',', ' ', '\u{00a0}'], "");
            let amount_str = format!("{}.{}", integer_part, dec_match.as_str());
            if let Ok(value) = Decimal::from_str(&amount_str) {
                let full_match = caps.get(0).unwrap();
                let kind = if caps.get(1).is_some() {
                    AmountKind::Discount
                } else {
                    AmountKind::Gross
                };
                let token = AmountToken {
                    value,
                    kind,
                    span: (full_match.start(), full_match.end()),
                    source: full_match.as_str().to_string(),
                };
                match kind {
                    AmountKind::Gross => result.gross.push(token),
                    AmountKind::Discount => result.discounts.push(token),
                }
            }
        }

        debug!(
            "extracted {} gross and {} discount amounts",
            result.gross.len(),
            result.discounts.len()
        );

        result
    }
}

/// Build the currency indicator alternation from the configuration.
fn currency_indicator(config: &CurrencyConfig) -> Result<String> {
    let mut parts = Vec::new();

    let symbol = config.symbol.trim();
    if !symbol.is_empty() {
        parts.push(regex::escape(symbol));
    }
    let code = config.code.trim();
    if !code.is_empty() {
        parts.push(regex::escape(code));
    }

    if parts.is_empty() {
        return Err(TallyError::Config(
            "currency symbol and code are both empty".to_string(),
        ));
    }

    Ok(parts.join("|"))
}
