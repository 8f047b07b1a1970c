//! Keyboard shortcuts mapped to session commands.
//!
//! The table is independent of any terminal library; the frontend turns its
//! key events into a [`Modifier`] and a character and looks them up here.

use crate::editor::EditCommand;

/// Highest code block reachable with a copy shortcut.
pub const MAX_COPY_SHORTCUT: usize = 9;

/// A command the session knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    NewDocument,
    Open,
    Save,
    Export,
    ToggleTheme,
    Undo,
    Redo,
    Edit(EditCommand),
    /// Zero-based index into the rendered code blocks.
    CopyCodeBlock(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Ctrl,
    Alt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortcut {
    pub modifier: Modifier,
    pub key: char,
    pub command: Command,
    pub description: &'static str,
}

const fn shortcut(
    modifier: Modifier,
    key: char,
    command: Command,
    description: &'static str,
) -> Shortcut {
    Shortcut {
        modifier,
        key,
        command,
        description,
    }
}

/// Every fixed binding. `Alt+1`..`Alt+9` copy code blocks and are resolved
/// separately by [`command_for`].
pub const SHORTCUTS: &[Shortcut] = &[
    shortcut(Modifier::Ctrl, 's', Command::Save, "save"),
    shortcut(Modifier::Ctrl, 'o', Command::Open, "open"),
    shortcut(Modifier::Ctrl, 'n', Command::NewDocument, "new document"),
    shortcut(Modifier::Ctrl, 'b', Command::Edit(EditCommand::Bold), "bold"),
    shortcut(Modifier::Ctrl, 'i', Command::Edit(EditCommand::Italic), "italic"),
    shortcut(Modifier::Ctrl, 'k', Command::Edit(EditCommand::Link), "link"),
    shortcut(Modifier::Ctrl, 'e', Command::Export, "export HTML"),
    shortcut(Modifier::Ctrl, 't', Command::ToggleTheme, "toggle theme"),
    shortcut(Modifier::Ctrl, 'z', Command::Undo, "undo"),
    shortcut(Modifier::Ctrl, 'y', Command::Redo, "redo"),
    shortcut(Modifier::Alt, 'h', Command::Edit(EditCommand::PromoteHeading), "heading"),
    shortcut(Modifier::Alt, 'u', Command::Edit(EditCommand::UnorderedList), "bullet list"),
    shortcut(Modifier::Alt, 'o', Command::Edit(EditCommand::OrderedList), "numbered list"),
    shortcut(Modifier::Alt, 'c', Command::Edit(EditCommand::CodeFence), "code block"),
    shortcut(Modifier::Alt, 'q', Command::Edit(EditCommand::Quote), "quote"),
    shortcut(Modifier::Alt, 'm', Command::Edit(EditCommand::Image), "image"),
];

/// Look up the command bound to `modifier` + `key` (case-insensitive).
pub fn command_for(modifier: Modifier, key: char) -> Option<Command> {
    let key = key.to_ascii_lowercase();
    if modifier == Modifier::Alt {
        if let Some(digit) = key.to_digit(10) {
            return (1..=MAX_COPY_SHORTCUT)
                .contains(&(digit as usize))
                .then(|| Command::CopyCodeBlock(digit as usize - 1));
        }
    }
    SHORTCUTS
        .iter()
        .find(|s| s.modifier == modifier && s.key == key)
        .map(|s| s.command)
}
