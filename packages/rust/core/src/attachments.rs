//! Image attachment resolution.
//!
//! Scans normalized article markup for `<img>` references, downloads each
//! distinct image once, assigns it the next `part_extra_NNN.<ext>` name,
//! and rewrites the references to the packaged copy. Fetches run strictly
//! one at a time so filename assignment is reproducible.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;
use url::Url;

use serialbind_fetch::Fetcher;
use serialbind_shared::{Result, SeparateFile, SerialbindError};

use crate::organize::BookAssembly;

static IMG_SRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<img[^>]*?src="([^"]*)""#).expect("valid regex"));

/// Resolve every image reference in `markup`, returning the rewritten text.
///
/// The deduplication map in `assembly` is keyed by the resolved source URL;
/// a URL already seen in this run is rewritten without a new fetch, even
/// across documents.
pub async fn resolve_attachments(
    fetcher: &Fetcher,
    doc_url: &Url,
    markup: &str,
    assembly: &mut BookAssembly,
) -> Result<String> {
    let sources: Vec<String> = IMG_SRC_RE
        .captures_iter(markup)
        .map(|c| c[1].to_string())
        .filter(|src| !src.is_empty())
        .collect();

    if sources.is_empty() {
        return Ok(markup.to_string());
    }

    let mut result = markup.to_string();

    for src in sources {
        let key = resolve_src(&src, doc_url);

        let assigned = match assembly.downloaded.get(&key) {
            Some(name) => name.clone(),
            None => {
                let payload = fetcher
                    .fetch_binary(&fetch_target(&key, doc_url))
                    .await
                    .map_err(SerialbindError::attachment)?;
                let name = assembly.push_separate(SeparateFile::Binary {
                    data: payload.data,
                    media_type: payload.media_type,
                });
                debug!(source = %key, file = %name, "attachment downloaded");
                assembly.downloaded.insert(key, name.clone());
                name
            }
        };

        result = result.replace(&format!("src=\"{src}\""), &format!("src=\"{assigned}\""));
    }

    Ok(result)
}

/// The deduplication key for an image source.
///
/// Absolute `http(s)://` and root-relative `/…` sources pass through
/// unchanged; anything else resolves against the document's own URL.
fn resolve_src(src: &str, doc_url: &Url) -> String {
    if src.starts_with("http://") || src.starts_with("https://") || src.starts_with('/') {
        return src.to_string();
    }

    doc_url
        .join(src)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| src.to_string())
}

/// The URL actually requested for a dedup key. Root-relative keys resolve
/// against the document URL here, at request time only.
fn fetch_target(key: &str, doc_url: &Url) -> String {
    if !key.starts_with('/') {
        return key.to_string();
    }

    doc_url
        .join(key)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| key.to_string())
}
