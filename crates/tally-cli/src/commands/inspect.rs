//! Inspect command - show what the extractor sees in a single document.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use console::style;
use serde_json::json;

use tally_core::{
    AmountExtractor, AmountToken, ExtractionResult, ReconciliationEngine,
    ReconciliationOutcome, SourceDocument, TallyConfig,
};

use crate::convert;

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Document to inspect
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: InspectFormat,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum InspectFormat {
    /// Human readable breakdown
    Text,

    /// JSON document
    Json,
}

pub async fn run(args: InspectArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = if let Some(path) = config_path {
        TallyConfig::from_file(std::path::Path::new(path))?
    } else {
        TallyConfig::default()
    };

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let id = convert::file_id(&args.input);
    let document = match convert::load_document(&args.input, id, &config.conversion) {
        SourceDocument::Loaded(document) => document,
        SourceDocument::Unreadable { id, reason } => {
            match args.format {
                InspectFormat::Text => {
                    println!("{} {} is unreadable: {}", style("✗").red(), id, reason);
                }
                InspectFormat::Json => {
                    let value = json!({ "file": id, "error": reason });
                    println!("{}", serde_json::to_string_pretty(&value)?);
                }
            }
            return Ok(());
        }
    };

    let extractor = AmountExtractor::new(&config.currency)?;
    let extraction = extractor.extract(&document.text);
    let outcome = ReconciliationEngine::new().reconcile(&extraction);

    match args.format {
        InspectFormat::Text => {
            print_text(&document.id.to_string(), &extraction, &outcome, &config)
        }
        InspectFormat::Json => {
            let value = json!({
                "file": document.id,
                "extraction": extraction,
                "outcome": outcome,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }

    Ok(())
}

fn print_text(
    file: &str,
    extraction: &ExtractionResult,
    outcome: &ReconciliationOutcome,
    config: &TallyConfig,
) {
    let symbol = &config.currency.symbol;

    println!("File: {}", file);
    println!();
    println!("Gross amounts:");
    print_tokens(&extraction.gross, symbol);
    println!();
    println!("Discounts:");
    print_tokens(&extraction.discounts, symbol);
    println!();

    match outcome {
        ReconciliationOutcome::AutoResolved {
            total,
            applied_discount,
        } => {
            print!(
                "{} Resolves automatically to {:.2} {}",
                style("✓").green(),
                total,
                symbol
            );
            match applied_discount {
                Some(discount) => println!(" after a discount of {:.2} {}", discount, symbol),
                None => println!(),
            }
        }
        ReconciliationOutcome::Ambiguous { candidate_total } => {
            println!(
                "{} Needs manual review (highest amount found: {:.2} {})",
                style("⚠").yellow(),
                candidate_total,
                symbol
            );
        }
        ReconciliationOutcome::ManuallyResolved { total, .. } => {
            println!(
                "{} Resolved to {:.2} {}",
                style("✓").green(),
                total,
                symbol
            );
        }
    }
}

fn print_tokens(tokens: &[AmountToken], symbol: &str) {
    if tokens.is_empty() {
        println!("  (none)");
        return;
    }
    for token in tokens {
        println!(
            "  {:>10.2} {}  (matched \"{}\" at {}..{})",
            token.value, symbol, token.source, token.span.0, token.span.1
        );
    }
}
