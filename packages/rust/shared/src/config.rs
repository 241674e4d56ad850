//! The book manifest: the caller-facing description of one binding run.
//!
//! A manifest is a TOML file listing the chapter URLs and package metadata.
//! CLI flags override manifest values where both exist.

use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, SerialbindError};
use crate::types::BookMetadata;

/// A book manifest, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookManifest {
    /// Display title of the book.
    pub title: String,

    /// Author name.
    pub author: String,

    /// Base URL of the source site; the shared stylesheet is fetched from
    /// `<base_url>/css/styles.css`.
    pub base_url: String,

    /// Ordered chapter page URLs.
    pub urls: Vec<String>,

    /// Series/story title used for the output filename. Defaults to `title`.
    #[serde(default)]
    pub story_title: Option<String>,

    /// Publication date, used verbatim as the package modification
    /// timestamp. Defaults to the current UTC time.
    #[serde(default)]
    pub date: Option<String>,

    /// Per-chapter display titles for the navigation document, aligned with
    /// the chapter list. Positions without a title get a "Part N" label.
    #[serde(default)]
    pub chapter_titles: Vec<String>,

    /// Path to a cover image file, relative to the manifest.
    #[serde(default)]
    pub cover: Option<String>,
}

impl BookManifest {
    /// Validate field contents beyond what deserialization enforces.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(SerialbindError::config("title must not be empty"));
        }
        if self.urls.is_empty() {
            return Err(SerialbindError::config(
                "urls must list at least one chapter page",
            ));
        }
        self.parsed_base_url()?;
        self.parsed_urls()?;
        Ok(())
    }

    /// The base URL, parsed.
    pub fn parsed_base_url(&self) -> Result<Url> {
        Url::parse(&self.base_url)
            .map_err(|e| SerialbindError::config(format!("invalid base_url '{}': {e}", self.base_url)))
    }

    /// The chapter URLs, parsed, in manifest order.
    pub fn parsed_urls(&self) -> Result<Vec<Url>> {
        self.urls
            .iter()
            .map(|u| {
                Url::parse(u).map_err(|e| SerialbindError::config(format!("invalid url '{u}': {e}")))
            })
            .collect()
    }

    /// Build the package metadata, filling defaulted fields.
    pub fn metadata(&self) -> BookMetadata {
        BookMetadata {
            title: self.title.clone(),
            author: self.author.clone(),
            date: self
                .date
                .clone()
                .unwrap_or_else(|| Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()),
            story_title: self.story_title.clone().unwrap_or_else(|| self.title.clone()),
            chapter_titles: self.chapter_titles.clone(),
        }
    }
}

/// Load and validate a manifest from a TOML file on disk.
pub fn load_manifest(path: &Path) -> Result<BookManifest> {
    let content = std::fs::read_to_string(path).map_err(|e| SerialbindError::io(path, e))?;
    tracing::debug!(path = %path.display(), "loaded book manifest");
    load_manifest_str(&content)
}

/// Parse and validate a manifest from TOML text.
pub fn load_manifest_str(content: &str) -> Result<BookManifest> {
    let manifest: BookManifest = toml::from_str(content)
        .map_err(|e| SerialbindError::config(format!("failed to parse manifest: {e}")))?;
    manifest.validate()?;
    Ok(manifest)
}

/// A commented sample manifest, written by `serialbind init`.
pub fn sample_manifest() -> String {
    r#"# Serialbind book manifest.

title = "Book One"
author = "Author Name"
base_url = "https://serial.example.com/"
urls = [
  "https://serial.example.com/book/chapter-1.html",
  "https://serial.example.com/book/chapter-2.html",
]

# Optional fields:
# story_title = "The Whole Series"
# date = "2025-01-01T00:00:00Z"
# chapter_titles = ["Chapter 1", "Chapter 2"]
# cover = "cover.jpg"
"#
    .to_string()
}
