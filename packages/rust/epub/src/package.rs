//! Package document, navigation document, and output file set assembly.

use tracing::{debug, info};

use serialbind_shared::{
    BookMetadata, ContentPart, SeparateFile, extra_filename, part_filename,
};

use crate::xhtml::{cover_page, escape_xml, wrap_document};

/// Fixed container descriptor pointing readers at the package document.
const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container xmlns="urn:oasis:names:tc:opendocument:xmlns:container" version="1.0">
<rootfiles>
<rootfile full-path="content/info.opf" media-type="application/oebps-package+xml"/>
</rootfiles>
</container>"#;

// ---------------------------------------------------------------------------
// Output file set
// ---------------------------------------------------------------------------

/// Payload of one produced file.
#[derive(Debug, Clone)]
pub enum FileData {
    /// UTF-8 text content (XML, XHTML, CSS).
    Text(String),
    /// Raw bytes (images).
    Binary(Vec<u8>),
}

/// One file of the produced package.
#[derive(Debug, Clone)]
pub struct PackageFile {
    /// Archive-relative path, e.g. `content/part_001.xhtml`.
    pub path: String,
    /// Manifest media type.
    pub media_type: String,
    /// File payload.
    pub data: FileData,
    /// Whether this file is a linear spine member.
    pub linear: bool,
}

/// Everything the package builder consumes.
#[derive(Debug)]
pub struct PackageInputs<'a> {
    /// Caller-supplied book metadata.
    pub metadata: &'a BookMetadata,
    /// Ordered content parts; order defines spine order.
    pub parts: &'a [ContentPart],
    /// Separate files in their shared numbering order.
    pub separates: &'a [SeparateFile],
    /// Chapter start indices into `parts`.
    pub chapters: &'a [usize],
    /// The corrected stylesheet.
    pub stylesheet: &'a str,
    /// Optional cover image bytes (packaged as JPEG regardless of source).
    pub cover: Option<&'a [u8]>,
}

/// The produced file set plus the derived output filename.
#[derive(Debug)]
pub struct BuiltPackage {
    /// All files, in archive order; `mimetype` is always first.
    pub files: Vec<PackageFile>,
    /// Output filename, e.g. `BookOne.epub`.
    pub filename: String,
}

impl BuiltPackage {
    /// Whether the file set contains the given archive path.
    pub fn contains(&self, path: &str) -> bool {
        self.files.iter().any(|f| f.path == path)
    }
}

// ---------------------------------------------------------------------------
// Package assembly
// ---------------------------------------------------------------------------

/// Build the complete EPUB file set from the assembled book content.
pub fn build_package(inputs: &PackageInputs<'_>) -> BuiltPackage {
    let meta = inputs.metadata;
    let mut files = Vec::new();

    // The mimetype entry must be first so the archiver can store it first.
    files.push(PackageFile {
        path: "mimetype".into(),
        media_type: "application/epub+zip".into(),
        data: FileData::Text("application/epub+zip".into()),
        linear: false,
    });

    files.push(PackageFile {
        path: "META-INF/container.xml".into(),
        media_type: "application/oebps-package+xml".into(),
        data: FileData::Text(CONTAINER_XML.into()),
        linear: false,
    });

    for (i, part) in inputs.parts.iter().enumerate() {
        files.push(PackageFile {
            path: format!("content/{}", part_filename(i + 1)),
            media_type: "application/xhtml+xml".into(),
            data: FileData::Text(wrap_document(&meta.title, &part.body, false)),
            linear: true,
        });
    }

    for (i, separate) in inputs.separates.iter().enumerate() {
        let path = format!("content/{}", extra_filename(i + 1, separate.extension()));
        let data = match separate {
            SeparateFile::Text { markup } => {
                FileData::Text(wrap_document(&meta.title, markup, false))
            }
            SeparateFile::Binary { data, .. } => FileData::Binary(data.clone()),
        };
        files.push(PackageFile {
            path,
            media_type: separate.media_type().to_string(),
            data,
            linear: false,
        });
    }

    if let Some(cover) = inputs.cover {
        files.push(PackageFile {
            path: "content/cover.jpeg".into(),
            media_type: "image/jpeg".into(),
            data: FileData::Binary(cover.to_vec()),
            linear: false,
        });
        files.push(PackageFile {
            path: "content/cover.xhtml".into(),
            media_type: "application/xhtml+xml".into(),
            data: FileData::Text(cover_page(&meta.title)),
            linear: false,
        });
    }

    files.push(PackageFile {
        path: "content/info.opf".into(),
        media_type: "application/oebps-package+xml".into(),
        data: FileData::Text(build_opf(
            meta,
            inputs.parts.len(),
            inputs.separates,
            inputs.cover.is_some(),
        )),
        linear: false,
    });

    files.push(PackageFile {
        path: "content/nav.xhtml".into(),
        media_type: "application/xhtml+xml".into(),
        data: FileData::Text(wrap_document(
            &meta.title,
            &build_nav(inputs.chapters, &meta.chapter_titles),
            true,
        )),
        linear: false,
    });

    files.push(PackageFile {
        path: "content/css/css.css".into(),
        media_type: "text/css".into(),
        data: FileData::Text(inputs.stylesheet.to_string()),
        linear: false,
    });

    let filename = output_filename(&meta.story_title, &meta.title);

    info!(
        parts = inputs.parts.len(),
        separates = inputs.separates.len(),
        chapters = inputs.chapters.len(),
        cover = inputs.cover.is_some(),
        %filename,
        "package assembled"
    );

    BuiltPackage { files, filename }
}

// ---------------------------------------------------------------------------
// Package document (OPF)
// ---------------------------------------------------------------------------

/// Generate `info.opf`: metadata, manifest, and spine.
fn build_opf(
    meta: &BookMetadata,
    part_count: usize,
    separates: &[SeparateFile],
    has_cover: bool,
) -> String {
    let mut opf = vec![
        r#"<?xml version="1.0" encoding="UTF-8"?>"#.to_string(),
        r#"<package xmlns="http://www.idpf.org/2007/opf" version="3.0" xml:lang="en" unique-identifier="uid">"#
            .to_string(),
        r#"<metadata xmlns:dc="http://purl.org/dc/elements/1.1/">"#.to_string(),
        format!("<dc:title>{}</dc:title>", escape_xml(&meta.title)),
        format!("<dc:creator>{}</dc:creator>", escape_xml(&meta.author)),
        "<dc:language>en-US</dc:language>".to_string(),
        format!(
            r#"<dc:identifier id="uid">{}</dc:identifier>"#,
            title_uid(&meta.title)
        ),
        format!(
            r#"<meta property="dcterms:modified">{}</meta>"#,
            escape_xml(&meta.date)
        ),
        "</metadata>".to_string(),
        "<manifest>".to_string(),
    ];

    for i in 0..part_count {
        opf.push(format!(
            r#"<item id="part{}" href="{}" media-type="application/xhtml+xml" />"#,
            i + 1,
            part_filename(i + 1)
        ));
    }

    for (i, separate) in separates.iter().enumerate() {
        opf.push(format!(
            r#"<item id="part_extra{}" href="{}" media-type="{}" />"#,
            i + 1,
            extra_filename(i + 1, separate.extension()),
            escape_xml(separate.media_type())
        ));
    }

    opf.push(
        r#"<item id="nav" href="nav.xhtml" media-type="application/xhtml+xml" properties="nav" />"#
            .to_string(),
    );
    opf.push(r#"<item id="css" href="css/css.css" media-type="text/css" />"#.to_string());

    if has_cover {
        opf.push(
            r#"<item id="cover-image" href="cover.jpeg" media-type="image/jpeg" properties="cover-image" />"#
                .to_string(),
        );
        opf.push(
            r#"<item id="cover" href="cover.xhtml" media-type="application/xhtml+xml" />"#
                .to_string(),
        );
    }

    opf.push("</manifest>".to_string());
    opf.push("<spine>".to_string());

    if has_cover {
        opf.push(r#"<itemref idref="cover" linear="no" />"#.to_string());
    }

    for i in 0..part_count {
        opf.push(format!(r#"<itemref idref="part{}" />"#, i + 1));
    }

    // Binary attachments are manifest-only; only XHTML separates join the
    // spine, and never as linear reading order.
    for (i, separate) in separates.iter().enumerate() {
        if !separate.is_xhtml() {
            continue;
        }
        opf.push(format!(
            r#"<itemref idref="part_extra{}" linear="no" />"#,
            i + 1
        ));
    }

    opf.push("</spine>".to_string());
    opf.push("</package>".to_string());

    opf.join("\n")
}

// ---------------------------------------------------------------------------
// Navigation document
// ---------------------------------------------------------------------------

/// Generate the `<nav>` element body: one entry per chapter boundary.
fn build_nav(chapters: &[usize], chapter_titles: &[String]) -> String {
    let mut nav = vec![r#"<nav epub:type="toc" id="toc"><ol>"#.to_string()];

    for (i, &part_index) in chapters.iter().enumerate() {
        let href = part_filename(part_index + 1);
        let label = chapter_titles
            .get(i)
            .filter(|t| !t.trim().is_empty())
            .map(|t| escape_xml(t))
            .unwrap_or_else(|| format!("Part {}", i + 1));
        nav.push(format!(r#"<li><a href="{href}">{label}</a></li>"#));
    }

    nav.push("</ol></nav>".to_string());
    debug!(entries = chapters.len(), "navigation document built");
    nav.join("\n")
}

// ---------------------------------------------------------------------------
// Naming helpers
// ---------------------------------------------------------------------------

/// Derive the package uid from the title: every non-alphanumeric character
/// becomes a hyphen.
fn title_uid(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

/// Derive the output filename: the story title stripped of
/// non-alphanumerics, with the display title appended (also stripped) only
/// when it differs.
fn output_filename(story_title: &str, title: &str) -> String {
    let mut name: String = strip_non_alphanumeric(story_title);
    if title != story_title {
        name.push_str(&strip_non_alphanumeric(title));
    }
    format!("{name}.epub")
}

fn strip_non_alphanumeric(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
