use std::collections::VecDeque;

/// Blocking user-input capability used by commands that need an answer.
///
/// The terminal frontend answers with a modal popup; tests answer from a
/// script.
pub trait InputProvider {
    /// Ask a yes/no question.
    fn confirm(&mut self, message: &str) -> bool;

    /// Ask for a line of text, pre-filled with `default`.
    ///
    /// `None` means the user cancelled.
    fn prompt(&mut self, message: &str, default: Option<&str>) -> Option<String>;
}

/// One scripted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Confirm(bool),
    Text(String),
    /// Accept whatever default the prompt offers.
    AcceptDefault,
    Cancel,
}

/// Input provider that replays a fixed list of replies in order.
///
/// Running out of replies behaves like cancelling.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    replies: VecDeque<Reply>,
    asked: Vec<String>,
}

impl ScriptedInput {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: replies.into_iter().collect(),
            asked: Vec::new(),
        }
    }

    /// Shorthand for a script of text answers.
    pub fn answers<'a>(texts: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(texts.into_iter().map(|t| Reply::Text(t.to_string())))
    }

    /// Messages of every question asked so far.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    pub fn remaining(&self) -> usize {
        self.replies.len()
    }
}

impl InputProvider for ScriptedInput {
    fn confirm(&mut self, message: &str) -> bool {
        self.asked.push(message.to_string());
        matches!(self.replies.pop_front(), Some(Reply::Confirm(true)))
    }

    fn prompt(&mut self, message: &str, default: Option<&str>) -> Option<String> {
        self.asked.push(message.to_string());
        match self.replies.pop_front()? {
            Reply::Text(text) => Some(text),
            Reply::AcceptDefault => Some(default.unwrap_or_default().to_string()),
            Reply::Confirm(_) | Reply::Cancel => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replies_are_consumed_in_order() {
        let mut input = ScriptedInput::new([Reply::Text("a".into()), Reply::Confirm(true)]);
        assert_eq!(input.prompt("first", None), Some("a".to_string()));
        assert!(input.confirm("second"));
        assert_eq!(input.asked(), ["first", "second"]);
    }

    #[test]
    fn test_exhausted_script_cancels() {
        let mut input = ScriptedInput::default();
        assert_eq!(input.prompt("url", Some("https://")), None);
        assert!(!input.confirm("discard?"));
    }

    #[test]
    fn test_accept_default_uses_prompt_default() {
        let mut input = ScriptedInput::new([Reply::AcceptDefault]);
        assert_eq!(
            input.prompt("lang", Some("javascript")),
            Some("javascript".to_string())
        );
    }
}
