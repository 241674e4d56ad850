//! The fixed XHTML shell for content documents.

/// XML namespace declared by the navigation document.
const EPUB_OPS_NS: &str = r#" xmlns:epub="http://www.idpf.org/2007/ops""#;

/// Wrap body markup in the shared XHTML shell.
///
/// Every packaged content document (parts, text separates, nav) uses this
/// wrapper: XML declaration, head with the book title and stylesheet link,
/// and a `<body><article>` content well. The navigation document
/// additionally declares the EPUB ops namespace for `epub:type`.
pub fn wrap_document(title: &str, content: &str, is_nav: bool) -> String {
    let nav_ns = if is_nav { EPUB_OPS_NS } else { "" };

    [
        r#"<?xml version="1.0" encoding="UTF-8"?>"#.to_string(),
        format!(r#"<html xmlns="http://www.w3.org/1999/xhtml"{nav_ns}>"#),
        format!("<head><title>{}</title>", escape_xml(title)),
        r#"<meta charset="utf-8" />"#.to_string(),
        r#"<link rel="stylesheet" type="text/css" href="css/css.css" />"#.to_string(),
        "</head>".to_string(),
        "<body><article>".to_string(),
        content.to_string(),
        "</article></body>".to_string(),
        "</html>".to_string(),
    ]
    .join("\n")
}

/// The generated cover wrapper page, displaying `cover.jpeg` full-page.
pub fn cover_page(title: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">"#,
            "<head><title>{title}</title>",
            r#"<meta charset="utf-8"/></head>"#,
            r#"<body><img src="cover.jpeg"/></body></html>"#,
        ),
        title = escape_xml(title)
    )
}

/// Escape XML special characters.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
