//! XHTML normalization passes for fetched chapter markup.
//!
//! Each pass is a function `&str -> String` applied in sequence. Source
//! pages are HTML5, where void elements may be left open and `&nbsp;` is
//! routine; neither survives in an EPUB content document.

use std::sync::LazyLock;

use regex::Regex;

/// Run the full normalization pipeline on article markup.
pub fn correct_html(text: &str) -> String {
    let mut result = close_line_breaks(text);
    result = close_dividers(&result);
    result = close_images(&result);
    result = strip_nbsp(&result);
    result
}

// ---------------------------------------------------------------------------
// Pass 1: Self-close line breaks
// ---------------------------------------------------------------------------

/// Rewrite bare `<br>` tags as self-closing.
fn close_line_breaks(text: &str) -> String {
    static BR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<br\s*>").expect("valid regex"));

    BR_RE.replace_all(text, "<br/>").to_string()
}

// ---------------------------------------------------------------------------
// Pass 2: Self-close dividers
// ---------------------------------------------------------------------------

/// Rewrite bare `<hr>` tags as self-closing.
///
/// The chapter splitter accepts both forms, so this pass and the splitter
/// can run in either order.
pub fn close_dividers(text: &str) -> String {
    static HR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<hr\s*>").expect("valid regex"));

    HR_RE.replace_all(text, "<hr />").to_string()
}

// ---------------------------------------------------------------------------
// Pass 3: Self-close images
// ---------------------------------------------------------------------------

/// Give every `<img>` tag a self-closing terminator, attributes intact.
/// Already-terminated tags are left with a single terminator.
fn close_images(text: &str) -> String {
    static IMG_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<img([^>]*?)\s*/?>").expect("valid regex"));

    IMG_RE.replace_all(text, "<img$1 />").to_string()
}

// ---------------------------------------------------------------------------
// Pass 4: Remove non-breaking-space entities
// ---------------------------------------------------------------------------

/// Replace `&nbsp;` with a literal space; the named entity is not defined
/// in the XHTML content documents EPUB readers parse.
fn strip_nbsp(text: &str) -> String {
    text.replace("&nbsp;", " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_br_becomes_self_closing() {
        assert_eq!(close_line_breaks("a<br>b<br >c"), "a<br/>b<br/>c");
    }

    #[test]
    fn self_closed_br_untouched() {
        assert_eq!(close_line_breaks("a<br/>b"), "a<br/>b");
    }

    #[test]
    fn bare_hr_becomes_self_closing() {
        assert_eq!(close_dividers("a<hr>b"), "a<hr />b");
        assert_eq!(close_dividers("a<hr />b"), "a<hr />b");
    }

    #[test]
    fn img_gains_terminator_with_attributes() {
        assert_eq!(
            close_images(r#"<img src="x.png" alt="x">"#),
            r#"<img src="x.png" alt="x" />"#
        );
        assert_eq!(close_images("<img>"), "<img />");
    }

    #[test]
    fn img_terminator_not_doubled() {
        assert_eq!(close_images(r#"<img src="x.png" />"#), r#"<img src="x.png" />"#);
        assert_eq!(close_images(r#"<img src="x.png"/>"#), r#"<img src="x.png" />"#);
    }

    #[test]
    fn nbsp_becomes_space() {
        assert_eq!(strip_nbsp("a&nbsp;b&nbsp;c"), "a b c");
    }

    #[test]
    fn full_pipeline_leaves_no_html5_shorthand() {
        let input = r#"<p>one&nbsp;two<br></p><hr><img src="pic.jpg" alt="a picture">"#;
        let result = correct_html(input);

        assert!(!result.contains("<br>"));
        assert!(!result.contains("<hr>"));
        assert!(!result.contains("&nbsp;"));
        assert!(result.contains(r#"<img src="pic.jpg" alt="a picture" />"#));
        assert!(result.contains("<br/>"));
    }
}
