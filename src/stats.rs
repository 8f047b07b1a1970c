//! Word and character counts.

/// Counts derived from the buffer content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    pub words: usize,
    /// Unicode scalar values, whitespace and newlines included.
    pub chars: usize,
}

/// Count whitespace-separated words and all characters of `content`.
pub fn compute_stats(content: &str) -> Stats {
    Stats {
        words: content.split_whitespace().count(),
        chars: content.chars().count(),
    }
}
