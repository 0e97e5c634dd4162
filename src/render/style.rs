//! Terminal emphasis. [`Style::Plain`] emits no escape codes at all.

use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    /// No escape codes; for pipes, logs, and tests.
    #[default]
    Plain,
    /// ANSI SGR colours and emphasis.
    Ansi,
}

// SGR codes shared with the Markdown renderer, which opens and closes
// spans across events instead of painting whole strings.
const RESET: &str = "\x1b[0m";
pub(crate) const BOLD: &str = "\x1b[1m";
pub(crate) const DIM: &str = "\x1b[2m";
pub(crate) const ITALIC: &str = "\x1b[3m";
pub(crate) const UNDERLINE: &str = "\x1b[4m";
pub(crate) const STRIKE: &str = "\x1b[9m";

impl Style {
    pub(crate) fn on(self, code: &'static str) -> &'static str {
        match self {
            Style::Plain => "",
            Style::Ansi => code,
        }
    }

    pub(crate) fn off(self) -> &'static str {
        self.on(RESET)
    }

    fn paint(self, code: &'static str, s: &str) -> String {
        format!("{}{s}{}", self.on(code), self.off())
    }

    pub fn bold(self, s: &str) -> String {
        self.paint(BOLD, s)
    }

    pub fn dim(self, s: &str) -> String {
        self.paint(DIM, s)
    }

    pub fn green(self, s: &str) -> String {
        self.paint("\x1b[32m", s)
    }

    pub fn red(self, s: &str) -> String {
        self.paint("\x1b[31m", s)
    }

    pub fn yellow(self, s: &str) -> String {
        self.paint("\x1b[33m", s)
    }

    pub fn cyan(self, s: &str) -> String {
        self.paint("\x1b[36m", s)
    }

    /// Pill-style label, e.g. `[lab_report]`.
    pub fn badge(self, s: &str) -> String {
        self.paint("\x1b[1;36m", &format!("[{s}]"))
    }
}

static RE_SGR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());

/// Number of characters a string occupies once escape codes are removed.
pub fn visible_width(s: &str) -> usize {
    RE_SGR.replace_all(s, "").chars().count()
}
