//! Recoverable failures raised by editing commands, file intake and
//! highlighting.
//!
//! None of these is fatal. Each variant is either surfaced as a transient
//! toast or swallowed silently, see [`Error::toast_level`].

use crate::session::ToastLevel;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A command needs a non-empty selection and there is none.
    #[error("Select some text before applying {command}")]
    PreconditionNotMet { command: &'static str },

    /// A picked or dropped file is not markdown or plain text.
    #[error("Unsupported file type: {name} (drop a .md, .markdown or .txt file)")]
    UnsupportedFileType { name: String },

    /// Language-specific highlighting failed for a code fragment.
    #[error("Highlighting failed for language `{language}`: {message}")]
    HighlightFailure { language: String, message: String },

    /// A required prompt was cancelled or left empty.
    #[error("Command abandoned")]
    UserAbandoned,
}

impl Error {
    /// Whether the failure is dropped without telling the user.
    pub const fn is_silent(&self) -> bool {
        matches!(self, Self::UserAbandoned)
    }

    /// Toast level used when the failure reaches the user, if it does.
    pub const fn toast_level(&self) -> Option<ToastLevel> {
        match self {
            Self::PreconditionNotMet { .. } | Self::UnsupportedFileType { .. } => {
                Some(ToastLevel::Warning)
            }
            // Recovered inside the render pass; only logged.
            Self::HighlightFailure { .. } | Self::UserAbandoned => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abandoned_is_silent() {
        assert!(Error::UserAbandoned.is_silent());
        assert_eq!(Error::UserAbandoned.toast_level(), None);
    }

    #[test]
    fn test_precondition_surfaces_as_warning() {
        let err = Error::PreconditionNotMet { command: "bold" };
        assert!(!err.is_silent());
        assert_eq!(err.toast_level(), Some(ToastLevel::Warning));
        assert!(err.to_string().contains("bold"));
    }

    #[test]
    fn test_unsupported_file_names_the_file() {
        let err = Error::UnsupportedFileType {
            name: "image.png".to_string(),
        };
        assert!(err.to_string().contains("image.png"));
        assert_eq!(err.toast_level(), Some(ToastLevel::Warning));
    }
}
