use crate::highlight::escape_html;

/// Overridable emission of links and images.
///
/// `text_html` is the already-rendered HTML of the link's children, `alt` is
/// the image's plain-text description. An empty `title` means none was
/// given.
pub trait RenderRules {
    fn link(&self, href: &str, title: &str, text_html: &str) -> String {
        let mut out = format!("<a href=\"{}\"", escape_html(href));
        push_title(&mut out, title);
        out.push('>');
        out.push_str(text_html);
        out.push_str("</a>");
        out
    }

    fn image(&self, src: &str, title: &str, alt: &str) -> String {
        let mut out = format!(
            "<img src=\"{}\" alt=\"{}\"",
            escape_html(src),
            escape_html(alt)
        );
        push_title(&mut out, title);
        out.push_str(" />");
        out
    }
}

/// Plain CommonMark-style output.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRules;

impl RenderRules for DefaultRules {}

/// Rules used by the live preview and export.
///
/// Absolute links open in a new browsing context without referrer or
/// opener, and every image is wrapped in a `<figure>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreviewRules;

impl PreviewRules {
    /// Literal, case-sensitive prefix check: `HTTP://x` and `//cdn` are not
    /// treated as external.
    pub fn is_external(href: &str) -> bool {
        href.starts_with("http")
    }
}

impl RenderRules for PreviewRules {
    fn link(&self, href: &str, title: &str, text_html: &str) -> String {
        let mut out = format!("<a href=\"{}\"", escape_html(href));
        if Self::is_external(href) {
            out.push_str(" target=\"_blank\" rel=\"noopener noreferrer\"");
        }
        push_title(&mut out, title);
        out.push('>');
        out.push_str(text_html);
        out.push_str("</a>");
        out
    }

    fn image(&self, src: &str, title: &str, alt: &str) -> String {
        let mut out = String::from("<figure>");
        out.push_str(&DefaultRules.image(src, title, alt));
        if !title.is_empty() {
            out.push_str("<figcaption>");
            out.push_str(&escape_html(title));
            out.push_str("</figcaption>");
        }
        out.push_str("</figure>");
        out
    }
}

fn push_title(out: &mut String, title: &str) {
    if !title.is_empty() {
        out.push_str(" title=\"");
        out.push_str(&escape_html(title));
        out.push('"');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_link_opens_new_context() {
        let html = PreviewRules.link("http://x.com", "", "t");
        assert_eq!(
            html,
            "<a href=\"http://x.com\" target=\"_blank\" rel=\"noopener noreferrer\">t</a>"
        );
    }

    #[test]
    fn test_https_link_is_external() {
        assert!(PreviewRules.link("https://x.com", "", "t").contains("target=\"_blank\""));
    }

    #[test]
    fn test_relative_link_has_no_target() {
        let html = PreviewRules.link("/relative", "", "t");
        assert_eq!(html, "<a href=\"/relative\">t</a>");
    }

    #[test]
    fn test_prefix_check_is_literal() {
        assert!(!PreviewRules::is_external("HTTPS://X.COM"));
        assert!(!PreviewRules::is_external("//cdn.example.com/x"));
        assert!(!PreviewRules::is_external("mailto:a@b.c"));
    }

    #[test]
    fn test_link_title_only_when_present() {
        let with = PreviewRules.link("/a", "About", "a");
        assert!(with.contains("title=\"About\""));
        let without = PreviewRules.link("/a", "", "a");
        assert!(!without.contains("title="));
    }

    #[test]
    fn test_image_figure_without_caption() {
        let html = PreviewRules.image("cat.png", "", "a cat");
        assert_eq!(
            html,
            "<figure><img src=\"cat.png\" alt=\"a cat\" /></figure>"
        );
    }

    #[test]
    fn test_image_figure_with_caption() {
        let html = PreviewRules.image("cat.png", "Felix", "a cat");
        assert!(html.starts_with("<figure><img src=\"cat.png\" alt=\"a cat\" title=\"Felix\" />"));
        assert!(html.ends_with("<figcaption>Felix</figcaption></figure>"));
    }

    #[test]
    fn test_attributes_are_escaped() {
        let html = DefaultRules.image("a\"b.png", "", "<x>");
        assert!(html.contains("src=\"a&quot;b.png\""));
        assert!(html.contains("alt=\"&lt;x&gt;\""));
    }
}
