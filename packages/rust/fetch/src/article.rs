//! Chapter content extraction.
//!
//! Source pages wrap the chapter body in a single `<article>` element; the
//! rest of the page (site chrome, navigation) is discarded.

use scraper::{Html, Selector};

use serialbind_shared::{Result, SerialbindError};

/// Extract the inner markup of the page's `<article>` element.
pub fn extract_article(html: &str) -> Result<String> {
    let doc = Html::parse_document(html);
    let article_sel = Selector::parse("article").unwrap();

    doc.select(&article_sel)
        .next()
        .map(|el| el.inner_html())
        .ok_or_else(|| SerialbindError::parse("no <article> element found in document"))
}

/// Extract the chapter heading (first `<h1>` inside the article), if any.
/// Used only for log output.
pub fn document_title(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let h1_sel = Selector::parse("article h1").unwrap();

    doc.select(&h1_sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_article_inner_markup() {
        let html = r#"<html><body>
            <nav><a href="/">Home</a></nav>
            <article><h1>Chapter 1</h1><p>It begins.</p></article>
            <footer>site footer</footer>
        </body></html>"#;

        let markup = extract_article(html).unwrap();
        assert!(markup.contains("<p>It begins.</p>"));
        assert!(!markup.contains("<article>"));
        assert!(!markup.contains("site footer"));
    }

    #[test]
    fn missing_article_is_a_parse_error() {
        let html = "<html><body><main><p>No article here.</p></main></body></html>";
        let err = extract_article(html).unwrap_err();
        assert!(err.to_string().contains("no <article> element"));
    }

    #[test]
    fn first_article_wins() {
        let html = "<article><p>one</p></article><article><p>two</p></article>";
        let markup = extract_article(html).unwrap();
        assert!(markup.contains("one"));
        assert!(!markup.contains("two"));
    }

    #[test]
    fn title_from_article_heading() {
        let html = "<article><h1> Chapter 12: The Gate </h1><p>Body.</p></article>";
        assert_eq!(document_title(html).as_deref(), Some("Chapter 12: The Gate"));

        let html = "<article><p>No heading.</p></article>";
        assert_eq!(document_title(html), None);
    }
}
