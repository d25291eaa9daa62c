//! End-to-end batch processing.

use tracing::{info, warn};

use crate::dedup::{resolve_duplicates, Fingerprinter};
use crate::error::Result;
use crate::extract::AmountExtractor;
use crate::models::config::TallyConfig;
use crate::models::document::SourceDocument;
use crate::reconcile::{ReconciliationEngine, ReconciliationOutcome};
use crate::report::{ReportAggregator, SummaryReport};
use crate::resolve::InteractiveResolver;
use crate::review::{AmbiguousCase, ReviewPrompt};

/// Runs a batch through duplicate review, extraction, reconciliation
/// and ambiguity resolution into a summary report.
pub struct BatchProcessor {
    extractor: AmountExtractor,
    engine: ReconciliationEngine,
}

impl BatchProcessor {
    /// Build a processor from configuration.
    pub fn new(config: &TallyConfig) -> Result<Self> {
        Ok(Self {
            extractor: AmountExtractor::new(&config.currency)?,
            engine: ReconciliationEngine::new(),
        })
    }

    /// Process documents in the order given.
    ///
    /// Duplicate review runs first over the whole batch. Ambiguous
    /// reconciliations are handed to the prompt one document at a
    /// time, in batch order.
    pub fn process<P: ReviewPrompt>(
        &self,
        documents: Vec<SourceDocument>,
        prompt: &P,
    ) -> Result<SummaryReport> {
        let fingerprinter = Fingerprinter::new();
        let documents = resolve_duplicates(&fingerprinter, documents, prompt);

        info!("processing {} documents", documents.len());
        let mut aggregator = ReportAggregator::new();

        for source in documents {
            match source {
                SourceDocument::Unreadable { id, reason } => {
                    warn!("{} is unreadable: {}", id, reason);
                    aggregator.record_unreadable(id, &reason)?;
                }
                SourceDocument::Loaded(doc) => {
                    let extraction = self.extractor.extract(&doc.text);
                    let outcome = self.engine.reconcile(&extraction);

                    match outcome {
                        ReconciliationOutcome::Ambiguous { candidate_total } => {
                            let case = AmbiguousCase {
                                document_id: doc.id.clone(),
                                candidate_total,
                                gross: extraction.gross,
                                discounts: extraction.discounts,
                            };
                            let mut resolver = InteractiveResolver::new(case);
                            let (total, method) = resolver.resolve(prompt)?;
                            aggregator.record(
                                doc.id,
                                &ReconciliationOutcome::ManuallyResolved { total, method },
                            )?;
                        }
                        outcome => {
                            aggregator.record(doc.id, &outcome)?;
                        }
                    }
                }
            }
        }

        Ok(aggregator.finalize())
    }
}
