//! Self-contained HTML export.

use crate::highlight::{SyntectHighlighter, Theme, escape_html};

/// Title used when the document has no name.
pub const DEFAULT_TITLE: &str = "Markdown Document";

const EXPORT_STYLES: &str = r"
:root {
    --text: #1e293b;
    --muted: #64748b;
    --accent: #3b82f6;
    --surface: #f8fafc;
    --border: #e2e8f0;
    --background: #fefefe;
}
* { box-sizing: border-box; }
body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    background: var(--background);
    color: var(--text);
    line-height: 1.7;
    max-width: 800px;
    margin: 0 auto;
    padding: 2rem;
}
h1, h2, h3, h4, h5, h6 { margin: 1.5rem 0 0.75rem; font-weight: 600; line-height: 1.3; }
h1 { font-size: 2rem; }
h2 { font-size: 1.5rem; }
h3 { font-size: 1.25rem; }
p, ul, ol { margin: 0 0 1rem; }
ul, ol { padding-left: 2rem; }
blockquote {
    border-left: 4px solid var(--accent);
    margin: 1rem 0;
    padding-left: 1rem;
    color: var(--muted);
    font-style: italic;
}
code {
    background: var(--surface);
    border-radius: 0.25rem;
    padding: 0.125rem 0.375rem;
    font-family: 'Fira Code', Consolas, monospace;
    font-size: 0.875em;
}
pre { background: var(--surface); border-radius: 0.5rem; padding: 1rem; overflow-x: auto; }
pre code { background: none; padding: 0; }
table { width: 100%; border-collapse: collapse; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem; text-align: left; }
th { background: var(--surface); }
a { color: var(--accent); text-decoration: none; }
a:hover { text-decoration: underline; }
img { max-width: 100%; height: auto; border-radius: 0.5rem; }
figure { margin: 1rem 0; }
figcaption { text-align: center; color: var(--muted); font-size: 0.875rem; margin-top: 0.5rem; }
hr { border: none; border-top: 1px solid var(--border); margin: 2rem 0; }
";

/// `name` without a trailing `.md` or `.markdown`.
pub fn strip_markdown_extension(name: &str) -> &str {
    name.strip_suffix(".md")
        .or_else(|| name.strip_suffix(".markdown"))
        .unwrap_or(name)
}

/// Download name for the exported file.
pub fn export_file_name(name: Option<&str>) -> String {
    format!("{}.html", strip_markdown_extension(name.unwrap_or("document")))
}

/// `<title>` of the exported page.
pub fn export_title(name: Option<&str>) -> String {
    name.map_or_else(
        || DEFAULT_TITLE.to_string(),
        |name| strip_markdown_extension(name).to_string(),
    )
}

/// Wrap a rendered body in a complete page with the stylesheet and the
/// syntax colors of `theme` embedded.
pub fn export_document(body_html: &str, title: &str, theme: Theme) -> String {
    let syntax_css = SyntectHighlighter::stylesheet(theme);
    format!(
        "<!DOCTYPE html>
<html lang=\"en\">
<head>
    <meta charset=\"UTF-8\">
    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">
    <title>{title}</title>
    <style>{EXPORT_STYLES}
{syntax_css}
    </style>
</head>
<body>
{body_html}
</body>
</html>
",
        title = escape_html(title),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name(Some("notes.md")), "notes.html");
        assert_eq!(export_file_name(Some("notes.markdown")), "notes.html");
        assert_eq!(export_file_name(Some("notes.txt")), "notes.txt.html");
        assert_eq!(export_file_name(None), "document.html");
    }

    #[test]
    fn test_only_trailing_extension_is_stripped() {
        assert_eq!(strip_markdown_extension("a.md.md"), "a.md");
        assert_eq!(strip_markdown_extension("a.mdx"), "a.mdx");
    }

    #[test]
    fn test_export_title() {
        assert_eq!(export_title(Some("Guide.md")), "Guide");
        assert_eq!(export_title(None), "Markdown Document");
    }

    #[test]
    fn test_export_document_is_self_contained() {
        let page = export_document("<h1>Hi</h1>", "A <b> title", Theme::Light);
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>A &lt;b&gt; title</title>"));
        assert!(page.contains("<h1>Hi</h1>"));
        assert!(page.contains("figcaption"));
        assert!(!page.contains("<link"), "no external stylesheets");
        assert!(page.trim_end().ends_with("</html>"));
    }
}
