//! Document conversion into batch members.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use glob::glob;
use tracing::{debug, warn};

use tally_core::{ConversionConfig, Document, DocumentId, SourceDocument};

/// Enumerate input files from a directory or glob pattern.
///
/// Results come back in sorted path order so batches process the same
/// way on every run.
pub fn enumerate_inputs(input: &str) -> anyhow::Result<Vec<PathBuf>> {
    let pattern = if Path::new(input).is_dir() {
        format!("{}/*", input.trim_end_matches('/'))
    } else {
        input.to_string()
    };

    let mut files: Vec<PathBuf> = glob(&pattern)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "pdf" | "txt")
        })
        .collect();
    files.sort();

    Ok(files)
}

/// Batch-unique identifiers for the enumerated files.
///
/// Identifiers are paths relative to the deepest directory shared by
/// the whole batch. A flat directory yields bare file names while a
/// recursive pattern keeps enough of the path to tell same-named
/// files in different directories apart.
pub fn document_ids(files: &[PathBuf]) -> Vec<DocumentId> {
    let base = common_parent(files);
    files
        .iter()
        .map(|path| {
            let relative = path.strip_prefix(&base).unwrap_or(path);
            DocumentId::new(relative.display().to_string())
        })
        .collect()
}

fn common_parent(files: &[PathBuf]) -> PathBuf {
    let mut dirs = files.iter().map(|p| p.parent().unwrap_or(Path::new("")));
    let Some(first) = dirs.next() else {
        return PathBuf::new();
    };

    let mut base = first.to_path_buf();
    for dir in dirs {
        while !dir.starts_with(&base) {
            match base.parent() {
                Some(parent) => base = parent.to_path_buf(),
                None => return PathBuf::new(),
            }
        }
    }
    base
}

/// Identifier for a single file addressed outside a batch.
pub fn file_id(path: &Path) -> DocumentId {
    DocumentId::new(
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string()),
    )
}

/// Convert one file into a batch member.
///
/// Conversion failures become unreadable markers so the batch keeps
/// going and the file still shows up in the report.
pub fn load_document(path: &Path, id: DocumentId, config: &ConversionConfig) -> SourceDocument {
    match read_text(path) {
        Ok(text) => {
            let visible = text.chars().filter(|c| !c.is_whitespace()).count();
            if visible >= config.min_text_chars {
                SourceDocument::Loaded(Document::new(id, text))
            } else {
                warn!("{} has no extractable text", path.display());
                SourceDocument::Unreadable {
                    id,
                    reason: "no extractable text".to_string(),
                }
            }
        }
        Err(e) => {
            warn!("failed to read {}: {:#}", path.display(), e);
            SourceDocument::Unreadable {
                id,
                reason: format!("{:#}", e),
            }
        }
    }
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "pdf" => {
            let data =
                fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
            extract_pdf_text(&data)
        }
        "txt" => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => anyhow::bail!("unsupported file format: {}", extension),
    }
}

/// Extract embedded text from PDF bytes.
pub fn extract_pdf_text(data: &[u8]) -> anyhow::Result<String> {
    let mut doc = lopdf::Document::load_mem(data).context("failed to parse PDF")?;

    // Handle PDFs with empty password encryption
    let raw_data = if doc.is_encrypted() {
        if doc.decrypt("").is_err() {
            anyhow::bail!("PDF is encrypted");
        }
        debug!("decrypted PDF with empty password");

        let mut decrypted = Vec::new();
        doc.save_to(&mut decrypted)
            .context("failed to save decrypted PDF")?;
        decrypted
    } else {
        data.to_vec()
    };

    if doc.get_pages().is_empty() {
        anyhow::bail!("PDF has no pages");
    }

    pdf_extract::extract_text_from_mem(&raw_data).context("failed to extract text")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ConversionConfig {
        ConversionConfig::default()
    }

    #[test]
    fn test_enumerate_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("c.pdf"), "not a real pdf").unwrap();
        fs::write(dir.path().join("skip.png"), "binary").unwrap();

        let files = enumerate_inputs(dir.path().to_str().unwrap()).unwrap();

        let names: Vec<&str> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.pdf"]);
    }

    #[test]
    fn test_ids_in_flat_directory_are_file_names() {
        let files = vec![PathBuf::from("batch/a.txt"), PathBuf::from("batch/b.txt")];

        let ids = document_ids(&files);

        assert_eq!(ids, vec![DocumentId::new("a.txt"), DocumentId::new("b.txt")]);
    }

    #[test]
    fn test_ids_keep_subdirectories_for_same_named_files() {
        let files = vec![
            PathBuf::from("invoices/2024-01/invoice.txt"),
            PathBuf::from("invoices/2024-02/invoice.txt"),
        ];

        let ids = document_ids(&files);

        assert_eq!(
            ids,
            vec![
                DocumentId::new("2024-01/invoice.txt"),
                DocumentId::new("2024-02/invoice.txt"),
            ]
        );
    }

    #[test]
    fn test_ids_with_mixed_depths_stay_distinct() {
        let files = vec![
            PathBuf::from("invoices/extra/invoice.txt"),
            PathBuf::from("invoices/invoice.txt"),
        ];

        let ids = document_ids(&files);

        assert_eq!(
            ids,
            vec![
                DocumentId::new("extra/invoice.txt"),
                DocumentId::new("invoice.txt"),
            ]
        );
    }

    #[test]
    fn test_load_text_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoice.txt");
        fs::write(&path, "Gesamtbetrag: 150,00 €").unwrap();

        match load_document(&path, file_id(&path), &config()) {
            SourceDocument::Loaded(doc) => {
                assert_eq!(doc.id.as_str(), "invoice.txt");
                assert!(doc.text.contains("150,00"));
            }
            other => panic!("expected loaded document, got {:?}", other),
        }
    }

    #[test]
    fn test_whitespace_only_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.txt");
        fs::write(&path, "  \n\t\n").unwrap();

        match load_document(&path, file_id(&path), &config()) {
            SourceDocument::Unreadable { reason, .. } => {
                assert_eq!(reason, "no extractable text");
            }
            other => panic!("expected unreadable document, got {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_extension_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        fs::write(&path, "binary").unwrap();

        match load_document(&path, file_id(&path), &config()) {
            SourceDocument::Unreadable { reason, .. } => {
                assert!(reason.contains("unsupported file format"));
            }
            other => panic!("expected unreadable document, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.txt");

        assert!(matches!(
            load_document(&path, file_id(&path), &config()),
            SourceDocument::Unreadable { .. }
        ));
    }

    #[test]
    fn test_garbage_pdf_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        fs::write(&path, "this is not a pdf").unwrap();

        match load_document(&path, file_id(&path), &config()) {
            SourceDocument::Unreadable { reason, .. } => {
                assert!(reason.contains("failed to parse PDF"));
            }
            other => panic!("expected unreadable document, got {:?}", other),
        }
    }
}
