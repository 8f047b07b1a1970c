//! Markdown to HTML with comrak.
//!
//! comrak parses into an arena AST. Before formatting, code blocks, links
//! and images are rewritten in place into raw HTML nodes produced by the
//! highlighter and the [`RenderRules`], so the rest of the document keeps
//! comrak's own output.

use comrak::nodes::{AstNode, NodeHtmlBlock, NodeValue};
use comrak::{Arena, format_html, parse_document};

use super::rules::{PreviewRules, RenderRules};
use crate::highlight::{Highlighter, SyntectHighlighter, escape_html, highlight_fragment};

/// Class prefix for the language annotation on `<code>` elements.
pub const DEFAULT_LANG_PREFIX: &str = "hljs language-";

/// Attribute marking code blocks produced by the transformer.
pub const CODE_BLOCK_ATTR: &str = "data-code-block";

/// Grammar and output switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOptions {
    /// Treat a single newline as a line break.
    pub breaks: bool,
    /// Enable tables, strikethrough, autolinks and task lists.
    pub gfm: bool,
    pub lang_prefix: String,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            breaks: true,
            gfm: true,
            lang_prefix: DEFAULT_LANG_PREFIX.to_string(),
        }
    }
}

/// A fenced or indented code block found during transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// First word of the info string, if any.
    pub language: Option<String>,
    /// Raw block content, exactly as written.
    pub text: String,
}

/// Transformer output.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transformed {
    pub html: String,
    /// Code blocks in document order; the `n`th one carries
    /// `data-code-block="n"` in the HTML.
    pub code_blocks: Vec<CodeBlock>,
}

/// Markup-to-HTML collaborator driven by the render pipeline.
pub trait Transformer {
    fn transform(&self, source: &str) -> Transformed;
}

/// comrak-backed [`Transformer`] with pluggable link/image rules and
/// highlighter.
pub struct MarkdownTransformer {
    options: TransformOptions,
    rules: Box<dyn RenderRules + Send>,
    highlighter: Box<dyn Highlighter + Send>,
}

impl MarkdownTransformer {
    /// Preview rules, syntect highlighting, default options.
    pub fn new() -> Self {
        Self {
            options: TransformOptions::default(),
            rules: Box::new(PreviewRules),
            highlighter: Box::new(SyntectHighlighter::new()),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: TransformOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_rules(mut self, rules: impl RenderRules + Send + 'static) -> Self {
        self.rules = Box::new(rules);
        self
    }

    #[must_use]
    pub fn with_highlighter(mut self, highlighter: impl Highlighter + Send + 'static) -> Self {
        self.highlighter = Box::new(highlighter);
        self
    }

    pub const fn options(&self) -> &TransformOptions {
        &self.options
    }

    fn code_block_html(&self, index: usize, language: Option<&str>, code: &str) -> String {
        let highlighted = highlight_fragment(self.highlighter.as_ref(), code, language);
        let class = language.map_or_else(String::new, |lang| {
            format!(
                " class=\"{}{}\"",
                escape_html(&self.options.lang_prefix),
                escape_html(lang)
            )
        });
        format!("<pre {CODE_BLOCK_ATTR}=\"{index}\"><code{class}>{highlighted}</code></pre>\n")
    }

    fn rewrite_code_blocks<'a>(&self, nodes: &[&'a AstNode<'a>]) -> Vec<CodeBlock> {
        let mut blocks = Vec::new();
        for node in nodes {
            let found = match &node.data.borrow().value {
                NodeValue::CodeBlock(block) => Some(CodeBlock {
                    language: block.info.split_whitespace().next().map(str::to_string),
                    text: block.literal.clone(),
                }),
                _ => None,
            };
            let Some(block) = found else {
                continue;
            };
            let literal = self.code_block_html(blocks.len(), block.language.as_deref(), &block.text);
            node.data.borrow_mut().value = NodeValue::HtmlBlock(NodeHtmlBlock {
                block_type: 0,
                literal,
            });
            blocks.push(block);
        }
        blocks
    }

    /// Replace links and images innermost first, so a linked image is
    /// already HTML when its enclosing link renders its children.
    fn rewrite_links_and_images<'a>(&self, nodes: &[&'a AstNode<'a>], options: &comrak::Options) {
        for node in nodes.iter().rev() {
            let replacement = match &node.data.borrow().value {
                NodeValue::Link(link) => Some(self.rules.link(
                    &link.url,
                    &link.title,
                    &render_children(node, options),
                )),
                NodeValue::Image(image) => {
                    Some(self.rules.image(&image.url, &image.title, &plain_text(node)))
                }
                _ => None,
            };
            if let Some(html) = replacement {
                let children: Vec<_> = node.children().collect();
                for child in children {
                    child.detach();
                }
                node.data.borrow_mut().value = NodeValue::HtmlInline(html);
            }
        }
    }
}

impl Default for MarkdownTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl Transformer for MarkdownTransformer {
    fn transform(&self, source: &str) -> Transformed {
        let arena = Arena::new();
        let mut options = comrak::Options::default();
        configure(&mut options, &self.options);
        let root = parse_document(&arena, source, &options);

        let nodes: Vec<_> = root.descendants().collect();
        let code_blocks = self.rewrite_code_blocks(&nodes);
        self.rewrite_links_and_images(&nodes, &options);

        let mut out = Vec::new();
        if let Err(err) = format_html(root, &options, &mut out) {
            tracing::error!(%err, "html formatting failed");
        }
        Transformed {
            html: String::from_utf8_lossy(&out).into_owned(),
            code_blocks,
        }
    }
}

fn configure(options: &mut comrak::Options, settings: &TransformOptions) {
    options.render.hardbreaks = settings.breaks;
    // Highlighted code and rule output are inserted as raw HTML nodes.
    options.render.unsafe_ = true;
    options.extension.strikethrough = settings.gfm;
    options.extension.table = settings.gfm;
    options.extension.autolink = settings.gfm;
    options.extension.tasklist = settings.gfm;
}

fn render_children<'a>(node: &'a AstNode<'a>, options: &comrak::Options) -> String {
    let mut out = Vec::new();
    for child in node.children() {
        if let Err(err) = format_html(child, options, &mut out) {
            tracing::warn!(%err, "failed to format link text");
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn plain_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    for descendant in node.descendants().skip(1) {
        match &descendant.data.borrow().value {
            NodeValue::Text(t) => text.push_str(t),
            NodeValue::Code(code) => text.push_str(&code.literal),
            NodeValue::SoftBreak | NodeValue::LineBreak => text.push(' '),
            _ => {}
        }
    }
    text
}
