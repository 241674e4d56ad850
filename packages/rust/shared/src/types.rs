//! Core domain types for Serialbind book assembly.

use url::Url;

/// Media type of the ending sections packaged as standalone XHTML files.
pub const XHTML_MEDIA_TYPE: &str = "application/xhtml+xml";

// ---------------------------------------------------------------------------
// SourceDocument
// ---------------------------------------------------------------------------

/// A fetched chapter page: its URL and raw HTML text.
///
/// Immutable once fetched; consumed exactly once during organization.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// The URL the document was fetched from.
    pub url: Url,
    /// Raw HTML body as returned by the server.
    pub html: String,
}

// ---------------------------------------------------------------------------
// ContentPart
// ---------------------------------------------------------------------------

/// One unit of assembled chapter text, destined for one `part_NNN.xhtml`
/// file. Position within the part sequence defines spine order.
#[derive(Debug, Clone)]
pub struct ContentPart {
    /// XHTML-legal body markup for this part.
    pub body: String,
}

// ---------------------------------------------------------------------------
// SeparateFile
// ---------------------------------------------------------------------------

/// A non-chapter packaged resource, numbered in a single shared
/// `part_extra_NNN` sequence in discovery order.
#[derive(Debug, Clone)]
pub enum SeparateFile {
    /// An ending section packaged as its own non-linear XHTML file.
    Text {
        /// XHTML-legal markup of the section.
        markup: String,
    },
    /// A downloaded image attachment (manifest-only, never in the spine).
    Binary {
        /// Raw bytes as fetched.
        data: Vec<u8>,
        /// Media type reported by the server, e.g. `image/png`.
        media_type: String,
    },
}

impl SeparateFile {
    /// The manifest media type for this file.
    pub fn media_type(&self) -> &str {
        match self {
            SeparateFile::Text { .. } => XHTML_MEDIA_TYPE,
            SeparateFile::Binary { media_type, .. } => media_type,
        }
    }

    /// The filename extension, derived from the media subtype for binaries.
    pub fn extension(&self) -> &str {
        match self {
            SeparateFile::Text { .. } => "xhtml",
            SeparateFile::Binary { media_type, .. } => media_subtype(media_type),
        }
    }

    /// Whether this file joins the spine (non-linear). Only XHTML files do.
    pub fn is_xhtml(&self) -> bool {
        matches!(self, SeparateFile::Text { .. })
    }
}

/// Extract the subtype of a media type, dropping any parameters:
/// `image/png` -> `png`, `image/jpeg; charset=x` -> `jpeg`.
pub fn media_subtype(media_type: &str) -> &str {
    let after_slash = media_type
        .split_once('/')
        .map(|(_, sub)| sub)
        .unwrap_or(media_type);
    after_slash
        .split_once(';')
        .map(|(sub, _)| sub)
        .unwrap_or(after_slash)
        .trim()
}

// ---------------------------------------------------------------------------
// BookMetadata
// ---------------------------------------------------------------------------

/// Caller-supplied metadata for the produced package.
#[derive(Debug, Clone)]
pub struct BookMetadata {
    /// Display title, also the source of the package uid.
    pub title: String,
    /// Author name for the `dc:creator` element.
    pub author: String,
    /// Publication date, used verbatim as the `dcterms:modified` value.
    pub date: String,
    /// Series/story title, the primary source of the output filename.
    pub story_title: String,
    /// Optional per-chapter display titles, aligned with the chapter index.
    /// Missing or empty entries fall back to a generated "Part N" label.
    pub chapter_titles: Vec<String>,
}

// ---------------------------------------------------------------------------
// Filename helpers
// ---------------------------------------------------------------------------

/// Zero-pad an ordinal to at least three digits.
pub fn pad3(n: usize) -> String {
    format!("{n:03}")
}

/// Filename of the content part with the given 1-based ordinal.
pub fn part_filename(ordinal: usize) -> String {
    format!("part_{}.xhtml", pad3(ordinal))
}

/// Filename of the separate file with the given 1-based ordinal.
pub fn extra_filename(ordinal: usize, extension: &str) -> String {
    format!("part_extra_{}.{extension}", pad3(ordinal))
}
