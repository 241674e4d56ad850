//! End-to-end build pipeline: stylesheet → documents → organization →
//! package → archive.
//!
//! The whole run is one logical task. Fetches are awaited one at a time in
//! input order; the first error aborts the run and nothing partial is
//! returned.

use std::time::{Duration, Instant};

use tracing::{info, instrument};
use url::Url;

use serialbind_content::correct_css;
use serialbind_epub::{PackageInputs, build_package, write_archive};
use serialbind_fetch::Fetcher;
use serialbind_shared::{BookMetadata, Result, SerialbindError, SourceDocument};

use crate::organize::{BookAssembly, organize_document};

/// Site-relative path of the shared stylesheet.
const STYLESHEET_PATH: &str = "css/styles.css";

/// Configuration for one build run.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Base URL of the source site.
    pub base_url: Url,
    /// Ordered chapter page URLs.
    pub urls: Vec<Url>,
    /// Package metadata.
    pub metadata: BookMetadata,
    /// Optional cover image bytes.
    pub cover: Option<Vec<u8>>,
}

/// Result of a completed build.
#[derive(Debug)]
pub struct BuildResult {
    /// Derived output filename, e.g. `TheSeries.epub`.
    pub filename: String,
    /// The finished EPUB archive.
    pub data: Vec<u8>,
    /// Number of content parts packaged.
    pub part_count: usize,
    /// Number of navigation entries.
    pub chapter_count: usize,
    /// Number of downloaded image attachments.
    pub attachment_count: usize,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each document fetch during the download phase.
    fn document_fetched(&self, url: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &BuildResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn document_fetched(&self, _url: &str, _current: usize, _total: usize) {}
    fn done(&self, _result: &BuildResult) {}
}

/// Run the full build pipeline.
///
/// 1. Fetch and correct the shared stylesheet
/// 2. Fetch every chapter page, in order
/// 3. Organize each document (normalize, attachments, split)
/// 4. Build the package file set
/// 5. Serialize the archive
#[instrument(skip_all, fields(title = %config.metadata.title, documents = config.urls.len()))]
pub async fn build_epub(
    config: &BuildConfig,
    progress: &dyn ProgressReporter,
) -> Result<BuildResult> {
    let start = Instant::now();
    let fetcher = Fetcher::new()?;

    info!(base_url = %config.base_url, "starting build");

    // --- Phase 1: Stylesheet ---
    progress.phase("Fetching stylesheet");
    let css_url = config
        .base_url
        .join(STYLESHEET_PATH)
        .map_err(|e| SerialbindError::config(format!("invalid base_url: {e}")))?;
    let stylesheet = correct_css(&fetcher.fetch_text(css_url.as_str()).await?);

    // --- Phase 2: Documents, strictly in input order ---
    progress.phase("Downloading documents");
    let total = config.urls.len();
    let mut documents = Vec::with_capacity(total);

    for (i, url) in config.urls.iter().enumerate() {
        let html = fetcher.fetch_text(url.as_str()).await?;
        progress.document_fetched(url.as_str(), i + 1, total);
        documents.push(SourceDocument {
            url: url.clone(),
            html,
        });
    }

    // --- Phase 3: Organization ---
    progress.phase("Creating EPUB");
    // Give the progress indicator one chance to repaint before CPU-bound
    // assembly work begins. Carries no correctness requirement.
    tokio::task::yield_now().await;

    let mut assembly = BookAssembly::new();
    for (i, doc) in documents.iter().enumerate() {
        organize_document(&fetcher, doc, i, total, &mut assembly).await?;
    }

    // --- Phase 4: Package + archive ---
    progress.phase("Packaging archive");
    let package = build_package(&PackageInputs {
        metadata: &config.metadata,
        parts: &assembly.parts,
        separates: &assembly.separates,
        chapters: &assembly.chapters,
        stylesheet: &stylesheet,
        cover: config.cover.as_deref(),
    });
    let data = write_archive(&package.files)?;

    let attachment_count = assembly.separates.iter().filter(|s| !s.is_xhtml()).count();
    let result = BuildResult {
        filename: package.filename,
        data,
        part_count: assembly.parts.len(),
        chapter_count: assembly.chapters.len(),
        attachment_count,
        elapsed: start.elapsed(),
    };

    progress.done(&result);

    info!(
        filename = %result.filename,
        parts = result.part_count,
        chapters = result.chapter_count,
        attachments = result.attachment_count,
        size = result.data.len(),
        elapsed_ms = result.elapsed.as_millis(),
        "build complete"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use zip::ZipArchive;

    const CSS: &str = "body { color: #333333; margin: 0; }\nblockquote::before { position:absolute; }";

    async fn mount_page(server: &MockServer, at: &str, article_body: &str) {
        let html = format!("<html><body><article>{article_body}</article></body></html>");
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(ResponseTemplate::new(200).set_body_string(html))
            .mount(server)
            .await;
    }

    async fn mount_site(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/css/styles.css"))
            .respond_with(ResponseTemplate::new(200).set_body_string(CSS))
            .mount(server)
            .await;
    }

    fn metadata() -> BookMetadata {
        BookMetadata {
            title: "Book One".into(),
            author: "Author Name".into(),
            date: "2024-06-01T12:00:00Z".into(),
            story_title: "The Series".into(),
            chapter_titles: vec![],
        }
    }

    fn config(server: &MockServer, pages: &[&str], cover: Option<Vec<u8>>) -> BuildConfig {
        BuildConfig {
            base_url: Url::parse(&server.uri()).unwrap(),
            urls: pages
                .iter()
                .map(|p| Url::parse(&format!("{}{p}", server.uri())).unwrap())
                .collect(),
            metadata: metadata(),
            cover,
        }
    }

    fn read_archive(data: Vec<u8>) -> ZipArchive<Cursor<Vec<u8>>> {
        ZipArchive::new(Cursor::new(data)).unwrap()
    }

    fn entry_text(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
        let mut text = String::new();
        archive
            .by_name(name)
            .unwrap_or_else(|_| panic!("missing entry {name}"))
            .read_to_string(&mut text)
            .unwrap();
        text
    }

    #[tokio::test]
    async fn full_build_produces_valid_archive() {
        let server = MockServer::start().await;
        mount_site(&server).await;
        mount_page(&server, "/book/ch1.html", "<p>one&nbsp;alpha</p><hr><p>two</p>").await;
        mount_page(&server, "/book/ch2.html", "<p>three</p>").await;
        mount_page(&server, "/book/ch3.html", "<p>four</p>").await;

        let config = config(&server, &["/book/ch1.html", "/book/ch2.html", "/book/ch3.html"], None);
        let result = build_epub(&config, &SilentProgress).await.unwrap();

        // One chapter entry per document, each at its first part.
        assert_eq!(result.chapter_count, 3);
        assert_eq!(result.filename, "TheSeriesBookOne.epub");
        // ch1: 2 fragments + ending; ch2/ch3: 1 fragment + ending each.
        assert_eq!(result.part_count, 7);

        let mut archive = read_archive(result.data);
        assert_eq!(archive.by_index(0).unwrap().name(), "mimetype");

        let part1 = entry_text(&mut archive, "content/part_001.xhtml");
        assert!(part1.contains("one alpha"), "nbsp normalized: {part1}");
        assert!(!part1.contains("&nbsp;"));

        let css = entry_text(&mut archive, "content/css/css.css");
        assert!(!css.contains("#333333"));
        assert!(!css.contains("position:absolute"));
        assert!(css.contains("margin: 0;"));

        // ch1 holds parts 1-3 (two fragments + ending), so ch2 and ch3
        // start at parts 4 and 6.
        let nav = entry_text(&mut archive, "content/nav.xhtml");
        assert!(nav.contains(r#"<a href="part_001.xhtml">Part 1</a>"#));
        assert!(nav.contains(r#"<a href="part_004.xhtml">Part 2</a>"#));
        assert!(nav.contains(r#"<a href="part_006.xhtml">Part 3</a>"#));
    }

    #[tokio::test]
    async fn attachments_are_packaged_and_referenced() {
        let server = MockServer::start().await;
        mount_site(&server).await;
        Mock::given(method("GET"))
            .and(path("/book/img/map.png"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(vec![0x89, b'P', b'N', b'G'])
                    .insert_header("content-type", "image/png"),
            )
            .mount(&server)
            .await;
        mount_page(
            &server,
            "/book/ch1.html",
            r#"<p>see the map</p><img src="img/map.png">"#,
        )
        .await;
        mount_page(
            &server,
            "/book/ch2.html",
            r#"<p>the map again</p><img src="img/map.png">"#,
        )
        .await;

        let config = config(&server, &["/book/ch1.html", "/book/ch2.html"], None);
        let result = build_epub(&config, &SilentProgress).await.unwrap();

        assert_eq!(result.attachment_count, 1, "identical URL downloaded once");

        let mut archive = read_archive(result.data);
        let mut image = Vec::new();
        archive
            .by_name("content/part_extra_001.png")
            .unwrap()
            .read_to_end(&mut image)
            .unwrap();
        assert_eq!(image, vec![0x89, b'P', b'N', b'G']);

        // Both documents reference the single packaged copy.
        let part1 = entry_text(&mut archive, "content/part_001.xhtml");
        let part3 = entry_text(&mut archive, "content/part_003.xhtml");
        assert!(part1.contains(r#"src="part_extra_001.png""#));
        assert!(part3.contains(r#"src="part_extra_001.png""#));

        let opf = entry_text(&mut archive, "content/info.opf");
        assert!(opf.contains(r#"href="part_extra_001.png" media-type="image/png""#));
        assert!(!opf.contains(r#"idref="part_extra1""#), "image stays out of the spine");
    }

    #[tokio::test]
    async fn cover_run_spine_starts_with_cover() {
        let server = MockServer::start().await;
        mount_site(&server).await;
        mount_page(&server, "/book/ch1.html", "<p>content</p>").await;

        let config = config(&server, &["/book/ch1.html"], Some(vec![0xFF, 0xD8, 0xFF, 0xE0]));
        let result = build_epub(&config, &SilentProgress).await.unwrap();

        let mut archive = read_archive(result.data);
        let opf = entry_text(&mut archive, "content/info.opf");
        let spine = &opf[opf.find("<spine>").unwrap()..];
        assert!(spine.contains(r#"<itemref idref="cover" linear="no" />"#));
        assert!(
            spine.find(r#"idref="cover""#).unwrap() < spine.find(r#"idref="part1""#).unwrap()
        );
        assert_eq!(opf.matches(r#"properties="cover-image""#).count(), 1);

        let mut cover = Vec::new();
        archive
            .by_name("content/cover.jpeg")
            .unwrap()
            .read_to_end(&mut cover)
            .unwrap();
        assert_eq!(cover, vec![0xFF, 0xD8, 0xFF, 0xE0]);
    }

    #[tokio::test]
    async fn ending_section_becomes_linked_separate_file() {
        let server = MockServer::start().await;
        mount_site(&server).await;
        mount_page(
            &server,
            "/book/ch1.html",
            "<p>scene</p><hr><hr><p>END CHAPTER</p><p>supporter notes</p>",
        )
        .await;
        mount_page(&server, "/book/ch2.html", "<p>final</p>").await;

        let config = config(&server, &["/book/ch1.html", "/book/ch2.html"], None);
        let result = build_epub(&config, &SilentProgress).await.unwrap();

        let mut archive = read_archive(result.data);
        let extra = entry_text(&mut archive, "content/part_extra_001.xhtml");
        assert!(extra.contains("supporter notes"));

        let part2 = entry_text(&mut archive, "content/part_002.xhtml");
        assert!(part2.contains(r#"href="part_extra_001.xhtml""#));

        let opf = entry_text(&mut archive, "content/info.opf");
        assert!(opf.contains(r#"<itemref idref="part_extra1" linear="no" />"#));

        drop(archive);
        assert_eq!(result.chapter_count, 2);
    }

    #[tokio::test]
    async fn document_fetch_failure_aborts() {
        let server = MockServer::start().await;
        mount_site(&server).await;
        mount_page(&server, "/book/ch1.html", "<p>fine</p>").await;
        Mock::given(method("GET"))
            .and(path("/book/ch2.html"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let config = config(&server, &["/book/ch1.html", "/book/ch2.html"], None);
        let err = build_epub(&config, &SilentProgress).await.unwrap_err();
        assert!(err.to_string().contains("ch2.html"));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn missing_stylesheet_aborts() {
        let server = MockServer::start().await;
        mount_page(&server, "/book/ch1.html", "<p>fine</p>").await;

        let config = config(&server, &["/book/ch1.html"], None);
        let err = build_epub(&config, &SilentProgress).await.unwrap_err();
        assert!(err.to_string().contains("css/styles.css"));
    }

    #[tokio::test]
    async fn progress_reports_each_document() {
        use std::sync::Mutex;

        struct Recording {
            events: Mutex<Vec<String>>,
        }

        impl ProgressReporter for Recording {
            fn phase(&self, name: &str) {
                self.events.lock().unwrap().push(format!("phase:{name}"));
            }
            fn document_fetched(&self, _url: &str, current: usize, total: usize) {
                self.events
                    .lock()
                    .unwrap()
                    .push(format!("doc:{current}/{total}"));
            }
            fn done(&self, _result: &BuildResult) {
                self.events.lock().unwrap().push("done".into());
            }
        }

        let server = MockServer::start().await;
        mount_site(&server).await;
        mount_page(&server, "/book/ch1.html", "<p>a</p>").await;
        mount_page(&server, "/book/ch2.html", "<p>b</p>").await;

        let recorder = Recording {
            events: Mutex::new(Vec::new()),
        };
        let config = config(&server, &["/book/ch1.html", "/book/ch2.html"], None);
        build_epub(&config, &recorder).await.unwrap();

        let events = recorder.events.into_inner().unwrap();
        assert!(events.contains(&"doc:1/2".to_string()));
        assert!(events.contains(&"doc:2/2".to_string()));
        assert_eq!(events.last().unwrap(), "done");
        assert!(events.iter().any(|e| e == "phase:Creating EPUB"));
    }
}
