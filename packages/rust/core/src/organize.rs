//! Per-document organization into the run-scoped book assembly.
//!
//! [`BookAssembly`] is the explicit context object threaded through every
//! pipeline stage: it owns the accumulated content parts, the shared
//! `part_extra` numbering, the chapter index, and the attachment
//! deduplication map. One assembly exists per run.

use std::collections::HashMap;

use tracing::{debug, instrument};

use serialbind_content::{DEFAULT_END_MARKER, correct_html, split_chapter_ending, split_parts};
use serialbind_fetch::{Fetcher, document_title, extract_article};
use serialbind_shared::{ContentPart, Result, SeparateFile, SourceDocument, extra_filename};

use crate::attachments::resolve_attachments;

/// Run-scoped accumulation state for one book build.
#[derive(Debug, Default)]
pub struct BookAssembly {
    /// Ordered content parts; position defines spine order.
    pub parts: Vec<ContentPart>,
    /// Separate files (endings and attachments) in their shared numbering.
    pub separates: Vec<SeparateFile>,
    /// Indices into `parts` where navigation entries point.
    pub chapters: Vec<usize>,
    /// Resolved source URL -> assigned `part_extra` filename.
    pub downloaded: HashMap<String, String>,
}

impl BookAssembly {
    /// Create an empty assembly.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a separate file and return its assigned filename.
    pub fn push_separate(&mut self, file: SeparateFile) -> String {
        let name = extra_filename(self.separates.len() + 1, file.extension());
        self.separates.push(file);
        name
    }
}

/// Organize one fetched document into the assembly: extract the article,
/// normalize it, resolve attachments, split it at the chapter-end marker,
/// and record its chapter boundary.
#[instrument(skip_all, fields(url = %doc.url, index = doc_index))]
pub async fn organize_document(
    fetcher: &Fetcher,
    doc: &SourceDocument,
    doc_index: usize,
    doc_count: usize,
    assembly: &mut BookAssembly,
) -> Result<()> {
    if let Some(title) = document_title(&doc.html) {
        debug!(%title, "organizing chapter");
    }

    let article = extract_article(&doc.html)?;
    let normalized = correct_html(&article);
    let resolved = resolve_attachments(fetcher, &doc.url, &normalized, assembly).await?;
    let split = split_chapter_ending(&resolved);

    let parts_before = assembly.parts.len();
    for fragment in split_parts(&split.body) {
        assembly.parts.push(ContentPart { body: fragment });
    }

    if doc_count == 1 {
        // Single-document book: the ending joins the main flow and every
        // part gets its own navigation entry.
        let ending = split
            .ending
            .unwrap_or_else(|| DEFAULT_END_MARKER.to_string());
        assembly.parts.push(ContentPart { body: ending });
        assembly.chapters = (0..assembly.parts.len()).collect();
        return Ok(());
    }

    match split.ending {
        // A genuine ending on a non-final chapter is packaged as its own
        // non-linear file; the main flow gets a synthesized end marker with
        // a link across to it.
        Some(ending) if doc_index + 1 < doc_count => {
            let name = assembly.push_separate(SeparateFile::Text { markup: ending });
            let body = format!(
                "{DEFAULT_END_MARKER}<br /><a href=\"{name}\">Click here to read the end-of-chapter notes.</a>"
            );
            assembly.parts.push(ContentPart { body });
        }
        other => {
            assembly.parts.push(ContentPart {
                body: other.unwrap_or_else(|| DEFAULT_END_MARKER.to_string()),
            });
        }
    }

    // One navigation entry per document, at its first content part.
    assembly.chapters.push(parts_before);
    Ok(())
}
