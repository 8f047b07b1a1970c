//! Terminal UI components.
//!
//! - [`render`]: Frame layout and the editor/preview panes
//! - [`preview`]: Rendered HTML to styled terminal lines
//! - [`prompt`]: Modal question state used by command prompts

mod overlays;
mod preview;
mod prompt;
mod render;
mod status;

pub use preview::{html_to_lines, preview_lines};
pub use prompt::{PromptKind, PromptOutcome, PromptState, render_prompt};
pub use render::{PaneLayout, line_number_width, render, split_panes};

pub const EDITOR_WIDTH_PERCENT: u16 = 50;
pub const PREVIEW_WIDTH_PERCENT: u16 = 50;
