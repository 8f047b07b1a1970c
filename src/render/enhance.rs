use crate::document::{CODE_BLOCK_ATTR, CodeBlock};

/// How long the copy control shows its confirmation.
pub const COPY_CONFIRM_MS: u64 = 2000;

pub const COPY_LABEL: &str = "Copy";
pub const COPIED_LABEL: &str = "Copied";

const COPY_BUTTON_CLASS: &str = "copy-btn";

/// Copy-to-clipboard affordance attached to a code block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CopyControl {
    confirm_until: Option<u64>,
}

impl CopyControl {
    pub const fn label(&self) -> &'static str {
        if self.confirm_until.is_some() {
            COPIED_LABEL
        } else {
            COPY_LABEL
        }
    }

    pub const fn is_confirming(&self) -> bool {
        self.confirm_until.is_some()
    }

    /// Show the confirmation until `now_ms + COPY_CONFIRM_MS`.
    pub const fn confirm(&mut self, now_ms: u64) {
        self.confirm_until = Some(now_ms.saturating_add(COPY_CONFIRM_MS));
    }

    /// Revert the label once the confirmation window has passed.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        if self.confirm_until.is_some_and(|until| now_ms >= until) {
            self.confirm_until = None;
            return true;
        }
        false
    }
}

/// A rendered code block and its copy control, if enhanced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlockView {
    pub language: Option<String>,
    pub text: String,
    pub copy: Option<CopyControl>,
}

impl From<CodeBlock> for CodeBlockView {
    fn from(block: CodeBlock) -> Self {
        Self {
            language: block.language,
            text: block.text,
            copy: None,
        }
    }
}

/// Attach a copy control to every code block that lacks one, both in the
/// block list and as a button inside its `<pre>` in the HTML.
///
/// Returns the number of blocks enhanced; a second pass returns 0.
pub fn enhance_code_blocks(html: &mut String, blocks: &mut [CodeBlockView]) -> usize {
    let mut enhanced = 0;
    for block in blocks.iter_mut().filter(|block| block.copy.is_none()) {
        block.copy = Some(CopyControl::default());
        enhanced += 1;
    }
    insert_copy_buttons(html);
    enhanced
}

fn insert_copy_buttons(html: &mut String) {
    const CLOSE: &str = "</pre>";
    let open_marker = format!("<pre {CODE_BLOCK_ATTR}=\"");
    let button_marker = format!("class=\"{COPY_BUTTON_CLASS}\"");
    let mut out = String::with_capacity(html.len());
    let mut rest = html.as_str();

    while let Some(open) = rest.find(&open_marker) {
        let Some(close) = rest[open..].find(CLOSE).map(|i| open + i) else {
            break;
        };
        let block = &rest[open..close];
        out.push_str(&rest[..close]);
        if !block.contains(&button_marker) {
            let index = block[open_marker.len()..]
                .split('"')
                .next()
                .unwrap_or_default();
            out.push_str(&format!(
                "<button {button_marker} {CODE_BLOCK_ATTR}=\"{index}\">{COPY_LABEL}</button>"
            ));
        }
        out.push_str(CLOSE);
        rest = &rest[close + CLOSE.len()..];
    }
    out.push_str(rest);
    *html = out;
}
