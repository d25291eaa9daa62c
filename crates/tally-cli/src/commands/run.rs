//! Run command - summarize a batch of invoice documents.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use tally_core::{
    BatchProcessor, DocumentId, Resolution, SummaryReport, TallyConfig,
};

use crate::convert;
use crate::prompt::{HeadlessPrompt, TerminalPrompt};

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Directory or glob pattern of invoice documents
    #[arg(default_value = ".")]
    input: String,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Answer every question conservatively instead of asking
    #[arg(long)]
    non_interactive: bool,

    /// Do not open documents in the system viewer during review
    #[arg(long)]
    no_viewer: bool,
}

/// Report output format.
#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table
    Table,

    /// JSON document
    Json,

    /// CSV rows
    Csv,
}

pub async fn run(args: RunArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Load configuration
    let mut config = if let Some(path) = config_path {
        TallyConfig::from_file(std::path::Path::new(path))?
    } else {
        TallyConfig::default()
    };
    if args.non_interactive || args.no_viewer {
        config.review.open_viewer = false;
    }

    let files = convert::enumerate_inputs(&args.input)?;
    if files.is_empty() {
        anyhow::bail!("No invoice documents found in: {}", args.input);
    }

    eprintln!(
        "{} Found {} documents. Converting to text...",
        style("ℹ").blue(),
        files.len()
    );

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let ids = convert::document_ids(&files);
    let mut documents = Vec::with_capacity(files.len());
    for (path, id) in files.iter().zip(ids) {
        documents.push(convert::load_document(path, id, &config.conversion));
        pb.inc(1);
    }
    pb.finish_and_clear();

    let processor = BatchProcessor::new(&config)?;
    let report = if args.non_interactive {
        processor.process(documents, &HeadlessPrompt)?
    } else {
        let sources: HashMap<DocumentId, PathBuf> = documents
            .iter()
            .zip(&files)
            .map(|(doc, path)| (doc.id().clone(), path.clone()))
            .collect();
        let prompt = TerminalPrompt::new(
            sources,
            config.review.clone(),
            config.currency.symbol.clone(),
        );
        processor.process(documents, &prompt)?
    };

    let rendered = match args.format {
        OutputFormat::Table => format_report_table(&report, &config.currency.symbol),
        OutputFormat::Json => serde_json::to_string_pretty(&report)?,
        OutputFormat::Csv => format_report_csv(&report)?,
    };

    match &args.output {
        Some(path) => {
            fs::write(path, &rendered)?;
            eprintln!(
                "{} Report written to {}",
                style("✓").green(),
                path.display()
            );
        }
        None => println!("{}", rendered),
    }

    eprintln!(
        "{} Processed {} documents in {:?}",
        style("✓").green(),
        report.entries.len(),
        start.elapsed()
    );
    eprintln!(
        "   {} automatic, {} manual, {} unreadable",
        style(report.counts.auto + report.counts.auto_discounted).green(),
        style(report.counts.manual()).yellow(),
        style(report.counts.unreadable).red()
    );

    Ok(())
}

/// Render the report the way the summary has always looked: aligned
/// file, amount and note columns between dashed rules.
fn format_report_table(report: &SummaryReport, currency_symbol: &str) -> String {
    let mut output = String::new();
    let rule = "-".repeat(80);
    let amount_header = format!("Amount ({})", currency_symbol);

    output.push_str(&format!("{}\n", rule));
    output.push_str(&format!(
        "{:<25} {:>12} {}\n",
        "Invoice File", amount_header, "Notes"
    ));
    output.push_str(&format!("{}\n", rule));

    for entry in &report.entries {
        match entry.total {
            Some(total) => {
                output.push_str(&format!(
                    "{:<25} {:>12.2} {}\n",
                    entry.id, total, entry.note
                ));
            }
            None => {
                output.push_str(&format!(
                    "{:<25} {:>12} {}\n",
                    entry.id, "unreadable", entry.note
                ));
            }
        }
    }

    output.push_str(&format!("{}\n", rule));
    let label = format!("Grand Total ({} items)", report.entries.len());
    output.push_str(&format!("{:<25} {:>12.2}\n", label, report.grand_total));
    output.push_str(&rule);

    output
}

fn format_report_csv(report: &SummaryReport) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["file", "total", "resolution", "note"])?;

    for entry in &report.entries {
        let total = entry
            .total
            .map(|t| format!("{:.2}", t))
            .unwrap_or_default();
        let resolution = match &entry.resolution {
            Resolution::Auto => "auto".to_string(),
            Resolution::AutoDiscounted { .. } => "auto-discount".to_string(),
            Resolution::Manual { method } => format!("manual ({})", method),
            Resolution::Unreadable => "unreadable".to_string(),
        };
        wtr.write_record([
            entry.id.as_str(),
            total.as_str(),
            resolution.as_str(),
            entry.note.as_str(),
        ])?;
    }

    let grand_label = format!("Grand Total ({} items)", report.entries.len());
    let grand_value = format!("{:.2}", report.grand_total);
    wtr.write_record([grand_label.as_str(), grand_value.as_str(), "", ""])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use tally_core::{ManualMethod, ReconciliationOutcome, ReportAggregator};

    fn sample_report() -> SummaryReport {
        let mut aggregator = ReportAggregator::new();
        aggregator
            .record(
                DocumentId::new("alpha.txt"),
                &ReconciliationOutcome::AutoResolved {
                    total: Decimal::new(15000, 2),
                    applied_discount: None,
                },
            )
            .unwrap();
        aggregator
            .record(
                DocumentId::new("beta.txt"),
                &ReconciliationOutcome::AutoResolved {
                    total: Decimal::new(14500, 2),
                    applied_discount: Some(Decimal::new(500, 2)),
                },
            )
            .unwrap();
        aggregator
            .record(
                DocumentId::new("gamma.txt"),
                &ReconciliationOutcome::ManuallyResolved {
                    total: Decimal::new(9700, 2),
                    method: ManualMethod::Entered,
                },
            )
            .unwrap();
        aggregator
            .record_unreadable(DocumentId::new("broken.pdf"), "no extractable text")
            .unwrap();
        aggregator.finalize()
    }

    #[test]
    fn test_table_layout() {
        let table = format_report_table(&sample_report(), "€");

        assert!(table.contains("Invoice File"));
        assert!(table.contains("Amount (€)"));
        assert!(table.contains("Applied discount of -5.00."));
        assert!(table.contains("Grand Total (4 items)"));
        assert!(table.contains("392.00"));

        // Name column is 25 wide, amount column 12 wide and right aligned.
        let row = table
            .lines()
            .find(|line| line.starts_with("alpha.txt"))
            .unwrap();
        assert_eq!(&row[..25], format!("{:<25}", "alpha.txt"));
        assert_eq!(row[26..38].trim_start(), "150.00");

        let broken = table
            .lines()
            .find(|line| line.starts_with("broken.pdf"))
            .unwrap();
        assert_eq!(broken[26..38].trim_start(), "unreadable");
    }

    #[test]
    fn test_csv_layout() {
        let csv = format_report_csv(&sample_report()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "file,total,resolution,note");
        assert_eq!(lines[1], "alpha.txt,150.00,auto,");
        assert_eq!(lines[2], "beta.txt,145.00,auto-discount,Applied discount of -5.00.");
        assert_eq!(lines[3], "gamma.txt,97.00,manual (entered),Manually entered total.");
        assert_eq!(lines[4], "broken.pdf,,unreadable,no extractable text");
        assert_eq!(lines[5], "Grand Total (4 items),392.00,,");
    }
}
