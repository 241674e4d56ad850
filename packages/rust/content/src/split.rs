//! Chapter-end detection and divider splitting.
//!
//! Chapters on the source site end with two dividers in immediate
//! succession followed by an "END OF CHAPTER"-style line, then attribution
//! notes. Single dividers inside the body separate scene fragments.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::normalize::close_dividers;

/// Synthetic end marker appended when a document has no ending section.
pub const DEFAULT_END_MARKER: &str =
    "<hr /><hr /><p><strong>++END CHAPTER++</strong></p><hr /><hr />";

/// How far past a double-divider candidate to look for the marker tokens.
const ENDING_WINDOW: usize = 64;

/// Two dividers in immediate succession, bare or self-closed.
static DOUBLE_DIVIDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<hr\s*/?>[ \n]*<hr\s*/?>").expect("valid regex"));

/// A single divider, bare or self-closed.
static DIVIDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<hr\s*/?>").expect("valid regex"));

/// A document split at its end-of-chapter marker.
#[derive(Debug, Clone)]
pub struct SplitDocument {
    /// Everything before the marker (the whole input when none was found).
    pub body: String,
    /// Everything from the marker onward, trimmed, dividers self-closed.
    /// `None` when no marker was accepted.
    pub ending: Option<String>,
}

/// Scan for the end-of-chapter marker and split the document there.
///
/// A double divider only counts as the marker when the window of text
/// starting at it contains both "end" and "chapter" (case-insensitive);
/// double dividers are also used mid-body for scene breaks. The first
/// accepted candidate wins. Rejected candidates are skipped over, never
/// rescanned.
pub fn split_chapter_ending(text: &str) -> SplitDocument {
    for candidate in DOUBLE_DIVIDER_RE.find_iter(text) {
        let window = ending_window(text, candidate.start()).to_lowercase();
        if window.contains("end") && window.contains("chapter") {
            debug!(at = candidate.start(), "end-of-chapter marker found");
            let ending = close_dividers(text[candidate.start()..].trim());
            return SplitDocument {
                body: text[..candidate.start()].to_string(),
                ending: Some(ending),
            };
        }
    }

    SplitDocument {
        body: text.to_string(),
        ending: None,
    }
}

/// Split body text on every divider, dropping fragments that are empty
/// after trimming. Each surviving fragment becomes one content part.
pub fn split_parts(body: &str) -> Vec<String> {
    DIVIDER_RE
        .split(body)
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(String::from)
        .collect()
}

/// The inspection window starting at `start`, clamped to a char boundary.
fn ending_window(text: &str, start: usize) -> &str {
    let mut end = (start + ENDING_WINDOW).min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[start..end]
}
