//! Markdown → terminal rich text.
//!
//! Walks the `pulldown-cmark` event stream and writes styled plain text:
//! headings are emphasised and underlined, list items get bullets or
//! numbers, code blocks are indented, and inline markers (`**`, `_`, `` ` ``)
//! disappear in favour of terminal emphasis.

use super::normalise;
use super::style::{visible_width, Style, BOLD, DIM, ITALIC, STRIKE, UNDERLINE};
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag};

/// Render Markdown for the terminal.
pub fn render_markdown(markdown: &str, style: Style) -> String {
    let source = normalise::for_display(markdown);
    let mut r = Renderer::new(style);

    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    for event in Parser::new_ext(&source, options) {
        r.event(event);
    }
    r.finish()
}

struct Renderer {
    style: Style,
    out: String,
    /// One entry per open list: `None` for bullets, `Some(n)` for the next number.
    lists: Vec<Option<u64>>,
    quote_depth: usize,
    in_code_block: bool,
    /// Byte offset in `out` where the open heading's text starts.
    heading_start: Option<(HeadingLevel, usize)>,
    cell_index: usize,
}

impl Renderer {
    fn new(style: Style) -> Self {
        Self {
            style,
            out: String::new(),
            lists: Vec::new(),
            quote_depth: 0,
            in_code_block: false,
            heading_start: None,
            cell_index: 0,
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                let painted = self.style.cyan(&code);
                self.out.push_str(&painted);
            }
            Event::Html(html) => self.text(&html),
            Event::FootnoteReference(name) => {
                self.out.push_str(&format!("[^{}]", &*name));
            }
            Event::SoftBreak | Event::HardBreak => self.line_break(),
            Event::Rule => {
                self.blank_line();
                let rule = self.style.dim(&"─".repeat(40));
                self.out.push_str(&rule);
                self.out.push('\n');
            }
            Event::TaskListMarker(done) => {
                self.out.push_str(if done { "[x] " } else { "[ ] " });
            }
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                if self.lists.is_empty() {
                    self.blank_line();
                }
                self.quote_prefix();
            }
            Tag::Heading(level, _, _) => {
                self.blank_line();
                self.out.push_str(self.style.on(BOLD));
                self.heading_start = Some((level, self.out.len()));
            }
            Tag::BlockQuote => {
                self.blank_line();
                self.quote_depth += 1;
            }
            Tag::CodeBlock(_) => {
                self.blank_line();
                self.in_code_block = true;
                self.out.push_str(self.style.on(DIM));
            }
            Tag::List(first) => {
                if self.lists.is_empty() {
                    self.blank_line();
                } else {
                    self.newline();
                }
                self.lists.push(first);
            }
            Tag::Item => {
                self.newline();
                let depth = self.lists.len().saturating_sub(1);
                self.out.push_str(&"  ".repeat(depth));
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let m = format!("{n}. ");
                        *n += 1;
                        m
                    }
                    _ => "• ".to_string(),
                };
                self.out.push_str(&marker);
            }
            Tag::Table(_) => self.blank_line(),
            Tag::TableHead | Tag::TableRow => {
                self.newline();
                self.cell_index = 0;
            }
            Tag::TableCell => {
                if self.cell_index > 0 {
                    self.out.push_str(" │ ");
                }
                self.cell_index += 1;
            }
            Tag::Emphasis => self.out.push_str(self.style.on(ITALIC)),
            Tag::Strong => self.out.push_str(self.style.on(BOLD)),
            Tag::Strikethrough => self.out.push_str(self.style.on(STRIKE)),
            Tag::Link(..) => self.out.push_str(self.style.on(UNDERLINE)),
            Tag::Image(..) => self.out.push_str("[image: "),
            Tag::FootnoteDefinition(name) => {
                self.blank_line();
                self.out.push_str(&format!("[^{}]: ", &*name));
            }
        }
    }

    fn end(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.newline(),
            Tag::Heading(..) => {
                self.out.push_str(self.style.off());
                if let Some((level, start)) = self.heading_start.take() {
                    let width = visible_width(&self.out[start..]).max(1);
                    let underline = match level {
                        HeadingLevel::H1 => Some('='),
                        HeadingLevel::H2 => Some('-'),
                        _ => None,
                    };
                    if let Some(ch) = underline {
                        self.out.push('\n');
                        self.out.push_str(&ch.to_string().repeat(width));
                    }
                }
                self.out.push('\n');
            }
            Tag::BlockQuote => {
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.newline();
            }
            Tag::CodeBlock(_) => {
                self.in_code_block = false;
                self.out.push_str(self.style.off());
                self.newline();
            }
            Tag::List(_) => {
                self.lists.pop();
                self.newline();
            }
            Tag::Item => self.newline(),
            Tag::Table(_) => self.newline(),
            Tag::TableHead => {
                self.newline();
                let rule = self.style.dim(&"─".repeat(24));
                self.out.push_str(&rule);
            }
            Tag::TableRow => self.newline(),
            Tag::TableCell => {}
            Tag::Emphasis | Tag::Strong | Tag::Strikethrough => {
                self.out.push_str(self.style.off());
                if self.heading_start.is_some() {
                    self.out.push_str(self.style.on(BOLD));
                }
            }
            Tag::Link(_, url, _) => {
                self.out.push_str(self.style.off());
                let suffix = self.style.dim(&format!(" ({})", &*url));
                self.out.push_str(&suffix);
            }
            Tag::Image(..) => self.out.push(']'),
            Tag::FootnoteDefinition(_) => self.newline(),
        }
    }

    fn text(&mut self, text: &str) {
        if self.in_code_block {
            for line in text.split_inclusive('\n') {
                if at_line_start(&self.out) {
                    self.out.push_str("    ");
                }
                self.out.push_str(line);
            }
            return;
        }
        self.out.push_str(text);
    }

    fn line_break(&mut self) {
        self.out.push('\n');
        if !self.lists.is_empty() {
            self.out.push_str(&"  ".repeat(self.lists.len()));
        }
        self.quote_prefix();
    }

    fn quote_prefix(&mut self) {
        if self.quote_depth > 0 {
            let bar = self.style.dim(&"│ ".repeat(self.quote_depth));
            self.out.push_str(&bar);
        }
    }

    fn newline(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    fn blank_line(&mut self) {
        if self.out.is_empty() {
            return;
        }
        self.newline();
        if !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }

    fn finish(self) -> String {
        let trimmed: Vec<&str> = self.out.lines().map(str::trim_end).collect();
        let joined = trimmed.join("\n");
        let body = joined.trim_matches('\n');
        if body.is_empty() {
            String::new()
        } else {
            format!("{body}\n")
        }
    }
}

/// True when everything after the last newline is escape codes only.
fn at_line_start(out: &str) -> bool {
    let tail = out.rsplit('\n').next().unwrap_or(out);
    visible_width(tail) == 0
}
