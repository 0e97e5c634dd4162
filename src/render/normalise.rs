//! Display normalisation of backend-generated Markdown.
//!
//! Enhanced text is written by a language model and sometimes arrives
//! wrapped in a single ` ```markdown ` fence (which a renderer would show
//! as one code block), with `\r\n` line endings, with zero-width characters,
//! or with long runs of empty lines. [`for_display`] undoes those before the
//! text reaches the terminal. The stored result is left as received.

use once_cell::sync::Lazy;
use regex::Regex;

/// Fence openers that mark the whole answer as Markdown.
const FENCE_OPENERS: [&str; 3] = ["```", "```markdown", "```md"];

/// Zero-width and soft-hyphen characters that render as nothing or garbage.
const INVISIBLE: [char; 6] = [
    '\u{200B}', // zero width space
    '\u{200C}', // zero width non-joiner
    '\u{200D}', // zero width joiner
    '\u{2060}', // word joiner
    '\u{FEFF}', // byte order mark
    '\u{00AD}', // soft hyphen
];

/// Four or more newlines, i.e. three or more empty lines in a row.
static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").unwrap());

/// Clean `markdown` for the terminal.
///
/// Newlines are unified first so the fence check only has to look for `\n`;
/// empty-line runs are squeezed last, after removed characters may have
/// emptied some lines.
pub fn for_display(markdown: &str) -> String {
    let text = unify_newlines(markdown);
    let text = unwrap_outer_fence(&text);
    let text = drop_invisible(&text);
    squeeze_blank_runs(&text)
}

fn unify_newlines(text: &str) -> String {
    let unix = text.replace("\r\n", "\n");
    unix.replace('\r', "\n")
}

/// Body of a fence that encloses the whole text, or the text unchanged.
fn unwrap_outer_fence(text: &str) -> String {
    let body = text
        .trim()
        .split_once('\n')
        .filter(|(opener, _)| FENCE_OPENERS.contains(opener))
        .and_then(|(_, rest)| rest.strip_suffix("```"))
        .and_then(|rest| rest.strip_suffix('\n'));
    body.unwrap_or(text).to_string()
}

fn drop_invisible(text: &str) -> String {
    text.chars().filter(|c| !INVISIBLE.contains(c)).collect()
}

/// At most two empty lines survive between paragraphs.
fn squeeze_blank_runs(text: &str) -> String {
    BLANK_RUN.replace_all(text, "\n\n\n").into_owned()
}
