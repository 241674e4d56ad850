//! Stylesheet corrections for e-reader compatibility.
//!
//! Applied once to the site's shared stylesheet before packaging. All
//! substitutions are best-effort; absent matches are no-ops.

use std::sync::LazyLock;

use regex::Regex;

/// Run all stylesheet corrections.
pub fn correct_css(css: &str) -> String {
    let mut result = strip_body_color(css);
    result = strip_blockquote_before(&result);
    result = strip_absolute_positioning(&result);
    result
}

/// Remove the `#333333` body-text color; several Kindle models render it
/// nearly unreadable in night mode.
fn strip_body_color(css: &str) -> String {
    css.replace("color: #333333;", "")
}

/// Remove every `blockquote::before` rule block. The site uses it for a
/// decorative quotation mark positioned with `position:absolute;`, which is
/// not allowed in EPUB.
fn strip_blockquote_before(css: &str) -> String {
    static RULE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"blockquote::before\s*\{[^}]*\}").expect("valid regex"));

    RULE_RE.replace_all(css, "").to_string()
}

/// Remove stray `position:absolute;` declarations outside the blockquote rule.
fn strip_absolute_positioning(css: &str) -> String {
    static DECL_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"position:\s*absolute;").expect("valid regex"));

    DECL_RE.replace_all(css, "").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_color_removed() {
        let css = "body { color: #333333; font-size: 1em; }";
        let result = correct_css(css);
        assert!(!result.contains("#333333"));
        assert!(result.contains("font-size: 1em;"));
    }

    #[test]
    fn blockquote_before_rule_removed_entirely() {
        let css = concat!(
            "blockquote { margin: 1em; }\n",
            "blockquote::before {\n  content: \"\\201C\";\n  position:absolute;\n  left: -0.5em;\n}\n",
            "p { margin: 0; }",
        );
        let result = correct_css(css);
        assert!(!result.contains("blockquote::before"));
        assert!(!result.contains("content:"));
        assert!(result.contains("blockquote { margin: 1em; }"));
        assert!(result.contains("p { margin: 0; }"));
    }

    #[test]
    fn stray_absolute_positioning_removed() {
        let css = ".badge { position:absolute; top: 0; } .note { position: absolute; }";
        let result = correct_css(css);
        assert!(!result.contains("absolute"));
        assert!(result.contains("top: 0;"));
    }

    #[test]
    fn unrelated_rules_untouched() {
        let css = "article img { max-width: 100%; position: relative; }";
        assert_eq!(correct_css(css), css);
    }
}
