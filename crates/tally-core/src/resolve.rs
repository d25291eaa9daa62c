//! One-shot resolution of ambiguous reconciliations.

use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::warn;

use crate::error::ResolverError;
use crate::reconcile::ManualMethod;
use crate::review::{AmbiguousCase, ResolverChoice, ReviewPrompt};

lazy_static! {
    /// Plain decimal number with at most two decimal places.
    static ref MANUAL_AMOUNT: Regex = Regex::new(r"^(\d+)(?:[.,](\d{1,2}))?$").unwrap();
}

/// Parse an operator-entered amount such as "123,45" or "99".
pub fn parse_manual_amount(input: &str) -> Option<Decimal> {
    let caps = MANUAL_AMOUNT.captures(input.trim())?;
    let fraction = caps.get(2).map_or("0", |m| m.as_str());
    Decimal::from_str(&format!("{}.{}", &caps[1], fraction)).ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResolverState {
    Presented,
    Resolved,
}

/// Drives one ambiguous document through operator review.
///
/// The resolver is single use: once a total has been produced,
/// driving it again is an error.
pub struct InteractiveResolver {
    case: AmbiguousCase,
    state: ResolverState,
}

impl InteractiveResolver {
    pub fn new(case: AmbiguousCase) -> Self {
        Self {
            case,
            state: ResolverState::Presented,
        }
    }

    /// The case under review.
    pub fn case(&self) -> &AmbiguousCase {
        &self.case
    }

    /// Ask the prompt until a usable choice arrives, then produce the
    /// final total and the method that settled it.
    pub fn resolve<P: ReviewPrompt>(
        &mut self,
        prompt: &P,
    ) -> Result<(Decimal, ManualMethod), ResolverError> {
        if self.state == ResolverState::Resolved {
            return Err(ResolverError::AlreadyResolved(
                self.case.document_id.clone(),
            ));
        }

        loop {
            match prompt.review_ambiguity(&self.case) {
                ResolverChoice::Enter(amount) => {
                    if amount < Decimal::ZERO {
                        warn!("rejecting negative manual amount {}", amount);
                        continue;
                    }
                    self.state = ResolverState::Resolved;
                    return Ok((amount.round_dp(2), ManualMethod::Entered));
                }
                ResolverChoice::Skip => {
                    self.state = ResolverState::Resolved;
                    return Ok((self.case.candidate_total, ManualMethod::Skipped));
                }
                ResolverChoice::ApplyDiscounts(indices) => {
                    // Selecting nothing is the same as skipping.
                    if indices.is_empty() {
                        self.state = ResolverState::Resolved;
                        return Ok((self.case.candidate_total, ManualMethod::Skipped));
                    }
                    if let Some(bad) = indices.iter().find(|&&i| i >= self.case.discounts.len()) {
                        warn!("discount index {} is out of range", bad);
                        continue;
                    }
                    let applied: Decimal = indices
                        .iter()
                        .map(|&i| self.case.discounts[i].value)
                        .sum();
                    self.state = ResolverState::Resolved;
                    return Ok((
                        self.case.candidate_total - applied,
                        ManualMethod::DiscountSelection,
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::DuplicateGroup;
    use crate::extract::{AmountKind, AmountToken};
    use crate::models::document::DocumentId;
    use crate::review::DuplicateDecision;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    struct ScriptedPrompt {
        choices: RefCell<VecDeque<ResolverChoice>>,
    }

    impl ScriptedPrompt {
        fn new(choices: Vec<ResolverChoice>) -> Self {
            Self {
                choices: RefCell::new(choices.into()),
            }
        }
    }

    impl ReviewPrompt for ScriptedPrompt {
        fn review_duplicates(&self, _group: &DuplicateGroup) -> DuplicateDecision {
            DuplicateDecision::KeepAll
        }

        fn review_ambiguity(&self, _case: &AmbiguousCase) -> ResolverChoice {
            self.choices
                .borrow_mut()
                .pop_front()
                .unwrap_or(ResolverChoice::Skip)
        }
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn token(value: &str, kind: AmountKind) -> AmountToken {
        AmountToken {
            value: dec(value),
            kind,
            span: (0, 0),
            source: String::new(),
        }
    }

    fn case(candidate: &str, discounts: &[&str]) -> AmbiguousCase {
        AmbiguousCase {
            document_id: DocumentId::new("invoice.txt"),
            candidate_total: dec(candidate),
            gross: vec![token(candidate, AmountKind::Gross)],
            discounts: discounts
                .iter()
                .map(|v| token(v, AmountKind::Discount))
                .collect(),
        }
    }

    #[test]
    fn test_enter_uses_operator_amount() {
        let prompt = ScriptedPrompt::new(vec![ResolverChoice::Enter(dec("97.00"))]);
        let mut resolver = InteractiveResolver::new(case("150.00", &[]));

        let (total, method) = resolver.resolve(&prompt).unwrap();
        assert_eq!(total, dec("97.00"));
        assert_eq!(method, ManualMethod::Entered);
    }

    #[test]
    fn test_entered_amount_is_rounded_to_cents() {
        let prompt = ScriptedPrompt::new(vec![ResolverChoice::Enter(dec("97.125"))]);
        let mut resolver = InteractiveResolver::new(case("150.00", &[]));

        let (total, _) = resolver.resolve(&prompt).unwrap();
        assert_eq!(total, dec("97.12"));
    }

    #[test]
    fn test_negative_entry_is_asked_again() {
        let prompt = ScriptedPrompt::new(vec![
            ResolverChoice::Enter(dec("-5.00")),
            ResolverChoice::Enter(dec("20.00")),
        ]);
        let mut resolver = InteractiveResolver::new(case("150.00", &[]));

        let (total, method) = resolver.resolve(&prompt).unwrap();
        assert_eq!(total, dec("20.00"));
        assert_eq!(method, ManualMethod::Entered);
    }

    #[test]
    fn test_skip_keeps_candidate_total() {
        let prompt = ScriptedPrompt::new(vec![ResolverChoice::Skip]);
        let mut resolver = InteractiveResolver::new(case("150.00", &["5.00"]));

        let (total, method) = resolver.resolve(&prompt).unwrap();
        assert_eq!(total, dec("150.00"));
        assert_eq!(method, ManualMethod::Skipped);
    }

    #[test]
    fn test_apply_selected_discounts() {
        let prompt = ScriptedPrompt::new(vec![ResolverChoice::ApplyDiscounts(vec![0, 1])]);
        let mut resolver = InteractiveResolver::new(case("150.00", &["5.00", "10.00"]));

        let (total, method) = resolver.resolve(&prompt).unwrap();
        assert_eq!(total, dec("135.00"));
        assert_eq!(method, ManualMethod::DiscountSelection);
    }

    #[test]
    fn test_empty_selection_means_skip() {
        let prompt = ScriptedPrompt::new(vec![ResolverChoice::ApplyDiscounts(vec![])]);
        let mut resolver = InteractiveResolver::new(case("150.00", &["5.00"]));

        let (total, method) = resolver.resolve(&prompt).unwrap();
        assert_eq!(total, dec("150.00"));
        assert_eq!(method, ManualMethod::Skipped);
    }

    #[test]
    fn test_out_of_range_selection_is_asked_again() {
        let prompt = ScriptedPrompt::new(vec![
            ResolverChoice::ApplyDiscounts(vec![3]),
            ResolverChoice::Skip,
        ]);
        let mut resolver = InteractiveResolver::new(case("150.00", &["5.00"]));

        let (total, method) = resolver.resolve(&prompt).unwrap();
        assert_eq!(total, dec("150.00"));
        assert_eq!(method, ManualMethod::Skipped);
    }

    #[test]
    fn test_resolver_is_single_use() {
        let prompt = ScriptedPrompt::new(vec![ResolverChoice::Skip, ResolverChoice::Skip]);
        let mut resolver = InteractiveResolver::new(case("150.00", &[]));

        resolver.resolve(&prompt).unwrap();
        assert!(matches!(
            resolver.resolve(&prompt),
            Err(ResolverError::AlreadyResolved(_))
        ));
    }

    #[test]
    fn test_parse_manual_amount() {
        assert_eq!(parse_manual_amount("123.45"), Some(dec("123.45")));
        assert_eq!(parse_manual_amount("123,45"), Some(dec("123.45")));
        assert_eq!(parse_manual_amount("123"), Some(dec("123")));
        assert_eq!(parse_manual_amount(" 99,9 "), Some(dec("99.9")));
        assert_eq!(parse_manual_amount("abc"), None);
        assert_eq!(parse_manual_amount("-5"), None);
        assert_eq!(parse_manual_amount("1.234,56"), None);
        assert_eq!(parse_manual_amount("12,345"), None);
    }
}
