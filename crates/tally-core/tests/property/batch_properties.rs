use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_core::{
    AmountExtractor, AmountKind, AmountToken, DocumentId, ExtractionResult, Fingerprint,
    ReconciliationEngine, ReconciliationOutcome, ReportAggregator, TallyConfig,
};

fn token(cents: u32, kind: AmountKind) -> AmountToken {
    AmountToken {
        value: Decimal::new(cents as i64, 2),
        kind,
        span: (0, 0),
        source: String::new(),
    }
}

fn grand_total(cents: &[u32], order: Vec<usize>) -> Decimal {
    let mut aggregator = ReportAggregator::new();
    for i in order {
        aggregator
            .record(
                DocumentId::new(format!("doc-{}.txt", i)),
                &ReconciliationOutcome::AutoResolved {
                    total: Decimal::new(cents[i] as i64, 2),
                    applied_discount: None,
                },
            )
            .unwrap();
    }
    aggregator.finalize().grand_total
}

proptest! {
    #[test]
    fn fingerprint_is_deterministic(s in ".*") {
        prop_assert_eq!(Fingerprint::of_text(&s), Fingerprint::of_text(&s));
    }

    #[test]
    fn fingerprint_changes_with_content(s in ".{0,200}") {
        let extended = format!("{}x", s);
        prop_assert_ne!(Fingerprint::of_text(&s), Fingerprint::of_text(&extended));
    }

    #[test]
    fn extractor_reads_back_formatted_amounts(cents in 0u64..100_000_000u64) {
        let amount = Decimal::new(cents as i64, 2);
        let text = format!("Gesamtbetrag: {} €", amount);

        let extractor = AmountExtractor::new(&TallyConfig::default().currency).unwrap();
        let result = extractor.extract(&text);

        prop_assert_eq!(result.gross.len(), 1);
        prop_assert_eq!(result.gross[0].value, amount);
        prop_assert!(result.discounts.is_empty());
    }

    #[test]
    fn grand_total_ignores_entry_order(cents in prop::collection::vec(0u32..1_000_000u32, 0..16)) {
        let forward = grand_total(&cents, (0..cents.len()).collect());
        let reverse = grand_total(&cents, (0..cents.len()).rev().collect());
        prop_assert_eq!(forward, reverse);
    }

    #[test]
    fn auto_resolved_totals_are_confirmed_by_the_document(
        gross in prop::collection::vec(0u32..100_000u32, 0..8),
        discounts in prop::collection::vec(0u32..100_000u32, 0..4),
    ) {
        let extraction = ExtractionResult {
            gross: gross.iter().map(|&c| token(c, AmountKind::Gross)).collect(),
            discounts: discounts.iter().map(|&c| token(c, AmountKind::Discount)).collect(),
        };

        match ReconciliationEngine::new().reconcile(&extraction) {
            ReconciliationOutcome::AutoResolved { total, applied_discount: None } => {
                let max = extraction.gross.iter().map(|t| t.value).max().unwrap();
                prop_assert_eq!(total, max);
                prop_assert!(extraction.discounts.is_empty());
            }
            ReconciliationOutcome::AutoResolved { total, applied_discount: Some(applied) } => {
                let max_gross = extraction.gross.iter().map(|t| t.value).max().unwrap();
                let max_discount = extraction.discounts.iter().map(|t| t.value).max().unwrap();
                prop_assert_eq!(applied, max_discount);
                prop_assert_eq!(total, max_gross - max_discount);
                prop_assert!(extraction.gross.iter().any(|t| t.value == total));
            }
            ReconciliationOutcome::Ambiguous { .. } => {}
            ReconciliationOutcome::ManuallyResolved { .. } => {
                prop_assert!(false, "the engine never yields manual outcomes");
            }
        }
    }
}
