//! Terminal prompts for duplicate and ambiguity review.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::Context;
use console::style;
use tracing::warn;

use tally_core::{
    parse_manual_amount, AmbiguousCase, DocumentId, DuplicateDecision, DuplicateGroup,
    ResolverChoice, ReviewConfig, ReviewPrompt,
};

/// Interactive prompt on stdin/stdout.
///
/// Knows where each document's source file lives so it can open it in
/// a viewer and delete it when the operator asks for that.
pub struct TerminalPrompt {
    sources: HashMap<DocumentId, PathBuf>,
    review: ReviewConfig,
    currency_symbol: String,
}

impl TerminalPrompt {
    pub fn new(
        sources: HashMap<DocumentId, PathBuf>,
        review: ReviewConfig,
        currency_symbol: String,
    ) -> Self {
        Self {
            sources,
            review,
            currency_symbol,
        }
    }

    /// Ask a question and read one trimmed line. None means stdin is
    /// closed, which callers treat as the conservative answer.
    fn ask(&self, question: &str) -> Option<String> {
        print!("{}", question);
        let _ = io::stdout().flush();

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }

    fn open_in_viewer(&self, id: &DocumentId) {
        if !self.review.open_viewer {
            return;
        }
        let path = match self.sources.get(id) {
            Some(path) => path,
            None => return,
        };

        let result = match &self.review.viewer {
            Some(program) => spawn_viewer(program, path),
            None => spawn_platform_viewer(path),
        };

        if let Err(e) = result {
            warn!("could not open {} in a viewer: {}", path.display(), e);
        }
    }

    fn delete_source(&self, id: &DocumentId) -> anyhow::Result<PathBuf> {
        let path = self
            .sources
            .get(id)
            .with_context(|| format!("no source file known for {}", id))?;
        fs::remove_file(path)
            .with_context(|| format!("failed to delete {}", path.display()))?;
        Ok(path.clone())
    }
}

impl ReviewPrompt for TerminalPrompt {
    fn review_duplicates(&self, group: &DuplicateGroup) -> DuplicateDecision {
        println!();
        println!("{}", style("=".repeat(80)).dim());
        println!("{}", style("Duplicate invoices detected").yellow().bold());
        println!("The following files have identical content:");
        for member in &group.members {
            println!("  - {}", member);
        }

        if self.review.open_viewer {
            println!("Opening the documents for review...");
            for member in &group.members {
                self.open_in_viewer(member);
            }
        }

        loop {
            let answer = match self.ask("Do you want to delete one of these files? [y/n]: ") {
                Some(answer) => answer.to_lowercase(),
                None => {
                    warn!("no answer on stdin, keeping all duplicates");
                    return DuplicateDecision::KeepAll;
                }
            };

            match answer.as_str() {
                "y" | "yes" => {
                    println!();
                    println!("Which file do you want to delete?");
                    for (i, member) in group.members.iter().enumerate() {
                        println!("  [{}] {}", i + 1, member);
                    }
                    println!("  [{}] Cancel", group.members.len() + 1);

                    let choice = match self.ask("Your choice: ") {
                        Some(choice) => choice,
                        None => return DuplicateDecision::KeepAll,
                    };
                    match choice.parse::<usize>() {
                        Ok(n) if (1..=group.members.len()).contains(&n) => {
                            let id = group.members[n - 1].clone();
                            match self.delete_source(&id) {
                                Ok(path) => {
                                    println!("Deleted: {}", path.display());
                                    return DuplicateDecision::Remove(id);
                                }
                                Err(e) => {
                                    eprintln!("{} {:#}", style("✗").red(), e);
                                }
                            }
                        }
                        Ok(n) if n == group.members.len() + 1 => {
                            println!("Deletion cancelled.");
                            return DuplicateDecision::KeepAll;
                        }
                        Ok(_) => println!("Invalid choice."),
                        Err(_) => println!("Invalid input. Please enter a number."),
                    }
                }
                "n" | "no" => return DuplicateDecision::KeepAll,
                _ => println!("Please answer y or n."),
            }
        }
    }

    fn review_ambiguity(&self, case: &AmbiguousCase) -> ResolverChoice {
        println!();
        println!("{}", style("=".repeat(80)).dim());
        println!(
            "{} {}",
            style("Manual review:").yellow().bold(),
            case.document_id
        );
        if case.gross.is_empty() {
            println!("No currency amounts were found in this invoice.");
        } else {
            println!("This invoice has discounts that could not be applied automatically.");
        }

        if self.review.open_viewer {
            println!("Opening the document for review...");
            self.open_in_viewer(&case.document_id);
        }

        println!();
        println!(
            "The highest amount found is: {:.2} {}",
            case.candidate_total, self.currency_symbol
        );
        println!();
        println!("How would you like to resolve this?");
        println!("  [E] Enter the final correct amount manually");
        println!("  [S] Skip (use original highest value)");
        for (i, discount) in case.discounts.iter().enumerate() {
            println!(
                "  [{}] Apply discount of {:.2} {}  {}",
                i + 1,
                discount.value,
                self.currency_symbol,
                style(format!("({})", discount.source)).dim()
            );
        }
        println!();
        println!("Enter 'E', 'S', or discount numbers separated by commas (e.g., 1,2).");

        loop {
            let choice = match self.ask("Your choice: ") {
                Some(choice) => choice.to_uppercase(),
                None => {
                    warn!("no answer on stdin, keeping the highest amount");
                    return ResolverChoice::Skip;
                }
            };

            match choice.as_str() {
                "E" => loop {
                    let raw = match self.ask("Enter the final correct amount (e.g., 123.45): ") {
                        Some(raw) => raw,
                        None => return ResolverChoice::Skip,
                    };
                    if let Some(amount) = parse_manual_amount(&raw) {
                        return ResolverChoice::Enter(amount);
                    }
                    println!("Invalid amount. Please enter a number.");
                },
                "S" => return ResolverChoice::Skip,
                _ => {
                    let parsed: Result<Vec<usize>, _> = choice
                        .split(',')
                        .map(|c| c.trim().parse::<usize>())
                        .collect();

                    match parsed {
                        Ok(numbers) if !case.discounts.is_empty() => {
                            if numbers
                                .iter()
                                .all(|n| (1..=case.discounts.len()).contains(n))
                            {
                                return ResolverChoice::ApplyDiscounts(
                                    numbers.iter().map(|n| n - 1).collect(),
                                );
                            }
                            println!(
                                "Invalid selection. Choices must be between 1 and {}.",
                                case.discounts.len()
                            );
                        }
                        _ => {
                            println!(
                                "Invalid input. Please enter 'E', 'S', or numbers separated by commas."
                            );
                        }
                    }
                }
            }
        }
    }
}

/// Non-interactive prompt answering conservatively.
///
/// Keeps every duplicate and settles every ambiguity by skipping, so
/// a batch always runs through without an operator.
pub struct HeadlessPrompt;

impl ReviewPrompt for HeadlessPrompt {
    fn review_duplicates(&self, group: &DuplicateGroup) -> DuplicateDecision {
        warn!(
            "keeping {} identical documents in non-interactive mode",
            group.members.len()
        );
        DuplicateDecision::KeepAll
    }

    fn review_ambiguity(&self, case: &AmbiguousCase) -> ResolverChoice {
        warn!(
            "keeping the highest amount for {} in non-interactive mode",
            case.document_id
        );
        ResolverChoice::Skip
    }
}

fn spawn_viewer(program: &str, path: &Path) -> io::Result<()> {
    Command::new(program)
        .arg(path)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
}

#[cfg(target_os = "linux")]
fn spawn_platform_viewer(path: &Path) -> io::Result<()> {
    spawn_viewer("xdg-open", path)
}

#[cfg(target_os = "macos")]
fn spawn_platform_viewer(path: &Path) -> io::Result<()> {
    spawn_viewer("open", path)
}

#[cfg(target_os = "windows")]
fn spawn_platform_viewer(path: &Path) -> io::Result<()> {
    spawn_viewer("explorer", path)
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
fn spawn_platform_viewer(_path: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "no known document viewer for this platform",
    ))
}
