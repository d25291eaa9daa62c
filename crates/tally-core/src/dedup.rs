//! Content-based duplicate detection.

use std::collections::{HashMap, HashSet};
use std::fmt;

use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::models::document::{Document, DocumentId, SourceDocument};
use crate::review::{DuplicateDecision, ReviewPrompt};

/// SHA-256 digest of a document's text content.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Fingerprint the given text.
    pub fn of_text(text: &str) -> Self {
        Self(Sha256::digest(text.as_bytes()).into())
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self)
    }
}

/// Documents whose text content is byte-identical.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateGroup {
    /// Content fingerprint shared by all members.
    pub fingerprint: Fingerprint,

    /// Member identifiers in order of appearance in the batch.
    pub members: Vec<DocumentId>,
}

/// Detects content duplicates within a batch.
///
/// Digests follow text content alone, so two documents that happen to
/// share an identifier never alias each other's fingerprint.
pub struct Fingerprinter;

impl Fingerprinter {
    pub fn new() -> Self {
        Self
    }

    /// Fingerprint of a document's text content.
    pub fn fingerprint(&self, document: &Document) -> Fingerprint {
        Fingerprint::of_text(&document.text)
    }

    /// Group loaded documents that share identical text content.
    ///
    /// Groups are returned in order of their first member's appearance
    /// and always have at least two members. Unreadable documents are
    /// never grouped.
    pub fn group_by_fingerprint(&self, documents: &[SourceDocument]) -> Vec<DuplicateGroup> {
        let mut order: Vec<Fingerprint> = Vec::new();
        let mut members: HashMap<Fingerprint, Vec<DocumentId>> = HashMap::new();

        for source in documents {
            if let SourceDocument::Loaded(doc) = source {
                let fp = self.fingerprint(doc);
                members
                    .entry(fp)
                    .or_insert_with(|| {
                        order.push(fp);
                        Vec::new()
                    })
                    .push(doc.id.clone());
            }
        }

        let mut groups = Vec::new();
        for fp in order {
            if let Some(ids) = members.remove(&fp) {
                if ids.len() >= 2 {
                    groups.push(DuplicateGroup {
                        fingerprint: fp,
                        members: ids,
                    });
                }
            }
        }

        groups
    }
}

/// Run duplicate review over a batch and drop removed documents.
///
/// Each group is offered again until fewer than two members remain or
/// the reviewer keeps the rest. A removal only drops the document from
/// the batch; deleting the underlying file is the reviewer's concern.
pub fn resolve_duplicates<P: ReviewPrompt>(
    fingerprinter: &Fingerprinter,
    documents: Vec<SourceDocument>,
    prompt: &P,
) -> Vec<SourceDocument> {
    let groups = fingerprinter.group_by_fingerprint(&documents);
    if groups.is_empty() {
        return documents;
    }

    info!("found {} group(s) of identical documents", groups.len());
    let mut removed: HashSet<DocumentId> = HashSet::new();

    for mut group in groups {
        while group.members.len() >= 2 {
            match prompt.review_duplicates(&group) {
                DuplicateDecision::KeepAll => break,
                DuplicateDecision::Remove(id) => {
                    if let Some(pos) = group.members.iter().position(|m| *m == id) {
                        group.members.remove(pos);
                        info!("removed duplicate {}", id);
                        removed.insert(id);
                    } else {
                        warn!("ignoring removal of {} which is not part of the group", id);
                    }
                }
            }
        }
    }

    documents
        .into_iter()
        .filter(|doc| !removed.contains(doc.id()))
        .collect()
}
