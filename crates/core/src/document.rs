//! HTML document assembly from ordered fragment lists.

/// Sections of the final HTML document, each an ordered list of fragments.
///
/// Fragment order inside a section is significant: the client runtime executes
/// body-append scripts in the order they appear here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlContext {
    /// Whether this document belongs to an island request.
    pub island: bool,
    pub html_attrs: Vec<String>,
    pub head: Vec<String>,
    pub body_attrs: Vec<String>,
    pub body_prepend: Vec<String>,
    pub body: Vec<String>,
    pub body_append: Vec<String>,
}

/// Drop absent and blank fragments and trim the rest, preserving order.
pub fn normalize_chunks<I, S>(chunks: I) -> Vec<String>
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    chunks
        .into_iter()
        .flatten()
        .map(|chunk| chunk.as_ref().trim().to_string())
        .filter(|chunk| !chunk.is_empty())
        .collect()
}

fn join_attrs(attrs: &[String]) -> String {
    attrs.join(" ")
}

fn join_tags(tags: &[String]) -> String {
    tags.concat()
}

/// Serialize the document.
///
/// Attribute lists are space-joined and always preceded by a space, so an
/// empty list renders as `<body >`.
pub fn render_html_document(html: &HtmlContext) -> String {
    format!(
        "<!DOCTYPE html><html {}><head>{}</head><body {}>{}{}{}</body></html>",
        join_attrs(&html.html_attrs),
        join_tags(&html.head),
        join_attrs(&html.body_attrs),
        join_tags(&html.body_prepend),
        join_tags(&html.body),
        join_tags(&html.body_append),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_chunks_drops_empty_and_trims() {
        let chunks = normalize_chunks([Some(" <a> "), None, Some("")]);
        assert_eq!(chunks, vec!["<a>".to_string()]);
    }

    #[test]
    fn test_normalize_chunks_drops_whitespace_only() {
        let chunks = normalize_chunks([Some("  \n "), Some("<b>")]);
        assert_eq!(chunks, vec!["<b>".to_string()]);
    }

    #[test]
    fn test_normalize_chunks_preserves_order() {
        let chunks = normalize_chunks([
            Some("<script>first</script>".to_string()),
            None,
            Some("<script>second</script>".to_string()),
            Some("<script>third</script>".to_string()),
        ]);
        assert_eq!(
            chunks,
            vec![
                "<script>first</script>",
                "<script>second</script>",
                "<script>third</script>"
            ]
        );
    }

    #[test]
    fn test_render_html_document() {
        let html = HtmlContext {
            html_attrs: vec![r#"lang="en""#.to_string()],
            head: vec!["<title>T</title>".to_string()],
            body: vec!["<div>X</div>".to_string()],
            ..Default::default()
        };

        assert_eq!(
            render_html_document(&html),
            r#"<!DOCTYPE html><html lang="en"><head><title>T</title></head><body ><div>X</div></body></html>"#
        );
    }

    #[test]
    fn test_render_html_document_joins_sections() {
        let html = HtmlContext {
            island: false,
            html_attrs: vec![r#"lang="en""#.to_string(), r#"dir="ltr""#.to_string()],
            head: vec![
                r#"<meta charset="utf-8">"#.to_string(),
                "<title>T</title>".to_string(),
            ],
            body_attrs: vec![r#"class="dark""#.to_string()],
            body_prepend: vec!["<noscript>js</noscript>".to_string()],
            body: vec!["<main></main>".to_string()],
            body_append: vec!["<script>a</script>".to_string(), "<script>b</script>".to_string()],
        };

        assert_eq!(
            render_html_document(&html),
            concat!(
                r#"<!DOCTYPE html><html lang="en" dir="ltr"><head><meta charset="utf-8"><title>T</title></head>"#,
                r#"<body class="dark"><noscript>js</noscript><main></main><script>a</script><script>b</script></body></html>"#
            )
        );
    }
}
