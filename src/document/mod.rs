//! Markdown transformation.
//!
//! This module handles:
//! - Parsing markdown with comrak and formatting it as HTML
//! - The link/image emission rules used by the preview
//! - Collecting code blocks for the copy affordance

mod rules;
mod transform;

pub use rules::{DefaultRules, PreviewRules, RenderRules};
pub use transform::{
    CODE_BLOCK_ATTR, CodeBlock, DEFAULT_LANG_PREFIX, MarkdownTransformer, TransformOptions,
    Transformed, Transformer,
};
