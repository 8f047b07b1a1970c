//! Syntax highlighting for code blocks.
//!
//! Uses syntect with Sublime Text syntax definitions and emits class-based
//! HTML, so the colors come from a stylesheet generated for the active
//! theme rather than being baked into every span.

use std::sync::OnceLock;

use syntect::highlighting::{Highlighter as ThemeHighlighter, ThemeSet};
use syntect::html::{ClassStyle, ClassedHTMLGenerator, css_for_theme_with_class_style};
use syntect::parsing::{Scope, SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::error::{Error, Result};

/// Light or dark presentation, persisted as `"light"` / `"dark"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Parse a stored preference. Anything but `"dark"` means light.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("dark") => Self::Dark,
            _ => Self::Light,
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    fn preferred_syntect_themes(self) -> &'static [&'static str] {
        match self {
            Self::Dark => &[
                "base16-ocean.dark",
                "base16-eighties.dark",
                "Solarized (dark)",
            ],
            Self::Light => &["InspiredGitHub", "Solarized (light)", "base16-ocean.light"],
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown theme `{other}` (expected light or dark)")),
        }
    }
}

/// Turns source text into a styled HTML fragment.
pub trait Highlighter {
    /// Whether a language tag is known to this highlighter.
    fn supports(&self, language: &str) -> bool;

    /// Highlight `code` as `language`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HighlightFailure`] when the language is unknown or
    /// the highlighter fails part way through.
    fn highlight(&self, code: &str, language: &str) -> Result<String>;

    /// Highlight `code` with automatic language detection. Never fails;
    /// undetectable input comes back escaped but unstyled.
    fn highlight_auto(&self, code: &str) -> String;
}

/// Highlight a code fragment, falling back to automatic detection when the
/// tag is missing, unknown, or the language-specific pass fails.
pub fn highlight_fragment(highlighter: &dyn Highlighter, code: &str, language: Option<&str>) -> String {
    if let Some(lang) = language.filter(|lang| highlighter.supports(lang)) {
        match highlighter.highlight(code, lang) {
            Ok(html) => return html,
            Err(err) => tracing::warn!(%err, "falling back to automatic detection"),
        }
    }
    highlighter.highlight_auto(code)
}

/// syntect-backed highlighter producing `ClassStyle::Spaced` markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntectHighlighter;

impl SyntectHighlighter {
    pub const fn new() -> Self {
        Self
    }

    /// CSS rules coloring the highlighter's classes for `theme`.
    pub fn stylesheet(theme: Theme) -> String {
        let Some(chosen) = syntect_theme(theme) else {
            return String::new();
        };
        css_for_theme_with_class_style(chosen, ClassStyle::Spaced).unwrap_or_else(|err| {
            tracing::warn!(%err, theme = theme.as_str(), "theme stylesheet unavailable");
            String::new()
        })
    }

    fn find_syntax(language: &str) -> Option<&'static SyntaxReference> {
        let syntax_set = syntax_set();
        syntax_set
            .find_syntax_by_token(language)
            .or_else(|| syntax_set.find_syntax_by_name(language))
    }

    fn render(
        syntax: &SyntaxReference,
        code: &str,
    ) -> std::result::Result<String, syntect::Error> {
        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, syntax_set(), ClassStyle::Spaced);
        for line in LinesWithEndings::from(code) {
            generator.parse_html_for_line_which_includes_newline(line)?;
        }
        Ok(generator.finalize())
    }
}

impl Highlighter for SyntectHighlighter {
    fn supports(&self, language: &str) -> bool {
        Self::find_syntax(language).is_some()
    }

    fn highlight(&self, code: &str, language: &str) -> Result<String> {
        let failure = |message: String| Error::HighlightFailure {
            language: language.to_string(),
            message,
        };
        let syntax =
            Self::find_syntax(language).ok_or_else(|| failure("unknown language".to_string()))?;
        Self::render(syntax, code).map_err(|err| failure(err.to_string()))
    }

    fn highlight_auto(&self, code: &str) -> String {
        let syntax_set = syntax_set();
        let first_line = code.lines().next().unwrap_or_default();
        let syntax = syntax_set
            .find_syntax_by_first_line(first_line)
            .unwrap_or_else(|| syntax_set.find_syntax_plain_text());
        Self::render(syntax, code).unwrap_or_else(|err| {
            tracing::warn!(%err, "automatic highlighting failed, emitting plain text");
            escape_html(code)
        })
    }
}

/// Escape text for inclusion in HTML element content or attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Terminal colors for highlighted markup.
///
/// Highlighted HTML nests one `span` per scope, each carrying the scope's
/// atoms as space-separated classes. Feeding the classes of the open spans
/// back in as a scope stack yields the color the theme gives that token.
pub struct ClassColors {
    highlighter: Option<ThemeHighlighter<'static>>,
}

impl ClassColors {
    pub fn new(theme: Theme) -> Self {
        Self {
            highlighter: syntect_theme(theme).map(ThemeHighlighter::new),
        }
    }

    /// Foreground for the open spans, outermost first, as RGB.
    pub fn foreground<S: AsRef<str>>(&self, classes: &[S]) -> Option<(u8, u8, u8)> {
        let highlighter = self.highlighter.as_ref()?;
        let scopes: Vec<Scope> = classes
            .iter()
            .filter_map(|class| {
                let dotted = class.as_ref().split_whitespace().collect::<Vec<_>>().join(".");
                Scope::new(&dotted).ok()
            })
            .collect();
        let color = highlighter.style_for_stack(&scopes).foreground;
        Some((color.r, color.g, color.b))
    }
}

fn syntect_theme(theme: Theme) -> Option<&'static syntect::highlighting::Theme> {
    let themes = theme_set();
    theme
        .preferred_syntect_themes()
        .iter()
        .find_map(|name| themes.themes.get(*name))
        .or_else(|| themes.themes.values().next())
}

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(|| {
        tracing::debug!("loading syntax definitions");
        SyntaxSet::load_defaults_newlines()
    })
}

fn theme_set() -> &'static ThemeSet {
    static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();
    THEME_SET.get_or_init(ThemeSet::load_defaults)
}
