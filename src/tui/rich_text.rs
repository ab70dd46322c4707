//! Message body → ratatui `Text`.
//!
//! Two modes, chosen by [`ReplyRendering`]:
//!
//! - **Plain text**: content is drawn literally. Line breaks break lines,
//!   tags stay visible.
//! - **Trusted rich text** (model replies only): content is parsed with
//!   `pulldown_cmark` as markdown with inline HTML. Every newline is a hard
//!   break, `<br>` breaks lines, `<b>`/`<strong>` and `<i>`/`<em>` style
//!   text, `<img src alt>` becomes an `[image: alt] src` placeholder and any
//!   other tag is dropped.

use pulldown_cmark::{CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};

use crate::core::config::ReplyRendering;
use crate::core::state::Role;

/// Builds the drawable body of a message.
///
/// Only model replies are ever interpreted; user input and error notices
/// are always literal.
pub fn render_body(role: Role, content: &str, mode: ReplyRendering, fg: Color) -> Text<'static> {
    match (role, mode) {
        (Role::Model, ReplyRendering::TrustedRichText) => render_trusted(content, fg),
        _ => render_plain(content, fg),
    }
}

/// Literal rendering. Outer blank lines are dropped for display only.
pub fn render_plain(content: &str, fg: Color) -> Text<'static> {
    let style = Style::default().fg(fg);
    let body = content.trim_matches(|c: char| c == '\n' || c == '\r');
    let lines: Vec<Line<'static>> = body
        .split('\n')
        .map(|line| {
            let line = line.strip_suffix('\r').unwrap_or(line);
            Line::from(Span::styled(expand_tabs(line), style))
        })
        .collect();
    Text::from(lines)
}

/// Markdown + inline HTML rendering for replies the user chose to trust.
pub fn render_trusted(content: &str, fg: Color) -> Text<'static> {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);

    let mut w = Writer::new(fg);
    for event in Parser::new_ext(content, opts) {
        w.handle(event);
    }
    w.text
}

fn expand_tabs(s: &str) -> String {
    // ratatui renders \t as zero-width
    if s.contains('\t') {
        s.replace('\t', "    ")
    } else {
        s.to_string()
    }
}

// ── Writer ──────────────────────────────────────────────────────────────────

struct Writer {
    text: Text<'static>,
    base_fg: Color,
    /// Inline style stack. Styles compose via `patch`.
    styles: Vec<Style>,
    /// Names of HTML tags that pushed a style, innermost last.
    html_open: Vec<String>,
    /// Per-line prefix spans (blockquote and code `│`).
    line_prefixes: Vec<Span<'static>>,
    /// List nesting: None = unordered, Some(n) = ordered at index n.
    list_indices: Vec<Option<u64>>,
    in_code: bool,
    link_url: Option<String>,
    /// Whether the next block element should be preceded by a blank line.
    needs_newline: bool,
}

impl Writer {
    fn new(base_fg: Color) -> Self {
        Self {
            text: Text::default(),
            base_fg,
            styles: vec![],
            html_open: vec![],
            line_prefixes: vec![],
            list_indices: vec![],
            in_code: false,
            link_url: None,
            needs_newline: false,
        }
    }

    fn style(&self) -> Style {
        self.styles
            .last()
            .copied()
            .unwrap_or_else(|| Style::default().fg(self.base_fg))
    }

    fn push_style(&mut self, overlay: Style) {
        self.styles.push(self.style().patch(overlay));
    }

    fn pop_style(&mut self) {
        self.styles.pop();
    }

    fn push_line(&mut self, line: Line<'static>) {
        let mut out = line;
        for pfx in self.line_prefixes.iter().rev().cloned() {
            out.spans.insert(0, pfx);
        }
        self.text.lines.push(out);
    }

    fn push_span(&mut self, span: Span<'static>) {
        if let Some(line) = self.text.lines.last_mut() {
            line.push_span(span);
        } else {
            self.push_line(Line::from(vec![span]));
        }
    }

    fn blank_line_if_needed(&mut self) {
        if self.needs_newline {
            self.push_line(Line::default());
            self.needs_newline = false;
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(tag) => self.close(tag),
            Event::Text(t) => self.text(t),
            Event::Code(c) => {
                let style = Style::default().fg(Color::White).bg(Color::DarkGray);
                self.push_span(Span::styled(c.to_string(), style));
            }
            Event::Html(raw) | Event::InlineHtml(raw) => self.html(&raw),
            // Newlines in a reply are line breaks, never reflowed.
            Event::SoftBreak | Event::HardBreak => self.push_line(Line::default()),
            Event::Rule => {
                self.blank_line_if_needed();
                self.push_line(Line::from(Span::styled(
                    "─".repeat(40),
                    Style::default().fg(Color::DarkGray),
                )));
                self.needs_newline = true;
            }
            _ => {}
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                self.blank_line_if_needed();
                self.push_line(Line::default());
            }
            Tag::HtmlBlock => {
                self.blank_line_if_needed();
                self.push_line(Line::default());
            }
            Tag::Heading { level, .. } => {
                self.blank_line_if_needed();
                let hs = heading_style(self.base_fg, level);
                self.push_line(Line::default());
                self.push_style(hs);
            }
            Tag::BlockQuote(_) => {
                self.blank_line_if_needed();
                self.line_prefixes
                    .push(Span::styled("│ ", Style::default().fg(Color::DarkGray)));
                self.push_style(Style::default().add_modifier(Modifier::ITALIC));
            }
            Tag::CodeBlock(_) => {
                if !self.text.lines.is_empty() {
                    self.push_line(Line::default());
                }
                self.line_prefixes
                    .push(Span::styled("│ ", Style::default().fg(Color::DarkGray)));
                self.in_code = true;
            }
            Tag::List(start) => {
                if self.list_indices.is_empty() {
                    self.blank_line_if_needed();
                }
                self.list_indices.push(start);
            }
            Tag::Item => {
                self.push_line(Line::default());
                let indent = "  ".repeat(self.list_indices.len().saturating_sub(1));
                if let Some(idx) = self.list_indices.last_mut() {
                    let marker = match idx {
                        None => format!("{indent}• "),
                        Some(n) => {
                            let s = format!("{indent}{n}. ");
                            *n += 1;
                            s
                        }
                    };
                    self.push_span(Span::styled(marker, Style::default().fg(Color::DarkGray)));
                }
            }
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::Link { dest_url, .. } => {
                self.link_url = Some(dest_url.to_string());
                self.push_style(link_style());
            }
            Tag::Image { dest_url, .. } => {
                self.push_span(Span::styled("[image: ", link_style()));
                self.link_url = Some(dest_url.to_string());
                self.push_style(link_style());
            }
            _ => {}
        }
    }

    fn close(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph | TagEnd::HtmlBlock => self.needs_newline = true,
            TagEnd::Heading(_) => {
                self.pop_style();
                self.needs_newline = true;
            }
            TagEnd::BlockQuote(_) => {
                self.line_prefixes.pop();
                self.pop_style();
                self.needs_newline = true;
            }
            TagEnd::CodeBlock => {
                self.in_code = false;
                self.line_prefixes.pop();
                self.needs_newline = true;
            }
            TagEnd::List(_) => {
                self.list_indices.pop();
                self.needs_newline = true;
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => self.pop_style(),
            TagEnd::Link => {
                self.pop_style();
                if let Some(url) = self.link_url.take() {
                    self.push_span(Span::raw(" ("));
                    self.push_span(Span::styled(url, link_style()));
                    self.push_span(Span::raw(")"));
                }
            }
            TagEnd::Image => {
                self.pop_style();
                self.push_span(Span::styled("]", link_style()));
                if let Some(url) = self.link_url.take() {
                    self.push_span(Span::styled(format!(" {url}"), link_style()));
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, cow: CowStr<'_>) {
        let text = expand_tabs(&cow);

        if self.in_code {
            let code_style = Style::default().fg(Color::White);
            for line in text.lines() {
                self.push_line(Line::from(Span::styled(line.to_owned(), code_style)));
            }
            return;
        }

        let style = self.style();
        self.push_span(Span::styled(text, style));
    }

    /// Interprets a chunk of raw HTML: a single inline tag, or a whole
    /// HTML block with text between tags.
    fn html(&mut self, raw: &str) {
        let mut rest = raw;
        while !rest.is_empty() {
            match rest.find('<') {
                Some(0) => {
                    let Some(end) = rest.find('>') else {
                        self.html_text(rest);
                        return;
                    };
                    if let Some(tag) = HtmlTag::parse(&rest[..=end]) {
                        self.html_tag(tag);
                    }
                    rest = &rest[end + 1..];
                }
                Some(start) => {
                    self.html_text(&rest[..start]);
                    rest = &rest[start..];
                }
                None => {
                    self.html_text(rest);
                    return;
                }
            }
        }
    }

    fn html_text(&mut self, text: &str) {
        for (i, part) in text.split('\n').enumerate() {
            if i > 0 {
                self.push_line(Line::default());
            }
            if !part.is_empty() {
                let style = self.style();
                self.push_span(Span::styled(expand_tabs(part), style));
            }
        }
    }

    fn html_tag(&mut self, tag: HtmlTag) {
        match (tag.name.as_str(), tag.closing) {
            ("br", _) => self.push_line(Line::default()),
            ("p" | "div", true) => self.push_line(Line::default()),
            ("b" | "strong", false) => {
                self.push_style(Style::default().add_modifier(Modifier::BOLD));
                self.html_open.push(tag.name);
            }
            ("i" | "em", false) => {
                self.push_style(Style::default().add_modifier(Modifier::ITALIC));
                self.html_open.push(tag.name);
            }
            ("b" | "strong" | "i" | "em", true) => {
                if self.html_open.last() == Some(&tag.name) {
                    self.html_open.pop();
                    self.pop_style();
                }
            }
            ("img", _) => {
                let label = match tag.attr("alt").filter(|alt| !alt.is_empty()) {
                    Some(alt) => format!("[image: {alt}]"),
                    None => "[image]".to_string(),
                };
                self.push_span(Span::styled(label, link_style()));
                if let Some(src) = tag.attr("src") {
                    self.push_span(Span::styled(format!(" {src}"), link_style()));
                }
            }
            _ => {}
        }
    }
}

/// A single parsed HTML tag: `<name attr="value" ...>` or `</name>`.
#[derive(Debug, PartialEq)]
struct HtmlTag {
    name: String,
    closing: bool,
    attrs: Vec<(String, String)>,
}

impl HtmlTag {
    fn parse(raw: &str) -> Option<Self> {
        let inner = raw.strip_prefix('<')?.strip_suffix('>')?;
        let inner = inner.trim().trim_end_matches('/').trim_end();
        let (closing, inner) = match inner.strip_prefix('/') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, inner),
        };

        let name_end = inner
            .find(|c: char| c.is_whitespace())
            .unwrap_or(inner.len());
        let name = inner[..name_end].to_ascii_lowercase();
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }

        Some(Self {
            name,
            closing,
            attrs: parse_attrs(&inner[name_end..]),
        })
    }

    fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

fn parse_attrs(mut s: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    loop {
        s = s.trim_start();
        if s.is_empty() {
            return attrs;
        }
        let key_end = s
            .find(|c: char| c == '=' || c.is_whitespace())
            .unwrap_or(s.len());
        let key = s[..key_end].to_ascii_lowercase();
        s = s[key_end..].trim_start();

        let Some(after_eq) = s.strip_prefix('=') else {
            attrs.push((key, String::new()));
            continue;
        };
        let after_eq = after_eq.trim_start();
        let (value, rest) = match after_eq.chars().next() {
            Some(q @ ('"' | '\'')) => {
                let body = &after_eq[1..];
                match body.find(q) {
                    Some(close) => (&body[..close], &body[close + 1..]),
                    None => (body, ""),
                }
            }
            _ => {
                let end = after_eq
                    .find(char::is_whitespace)
                    .unwrap_or(after_eq.len());
                (&after_eq[..end], &after_eq[end..])
            }
        };
        attrs.push((key, value.to_string()));
        s = rest;
    }
}

fn link_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::UNDERLINED)
}

fn heading_style(base_fg: Color, level: HeadingLevel) -> Style {
    match level {
        HeadingLevel::H1 => Style::default()
            .fg(base_fg)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        HeadingLevel::H2 => Style::default().fg(base_fg).add_modifier(Modifier::BOLD),
        _ => Style::default()
            .fg(base_fg)
            .add_modifier(Modifier::BOLD | Modifier::ITALIC),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_lines(text: &Text<'_>) -> Vec<String> {
        text.lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect()
    }

    #[test]
    fn plain_mode_shows_tags_literally() {
        let text = render_body(
            Role::Model,
            "a<br />b\nc",
            ReplyRendering::PlainText,
            Color::White,
        );
        assert_eq!(plain_lines(&text), vec!["a<br />b", "c"]);
    }

    #[test]
    fn user_input_is_never_interpreted() {
        let text = render_body(
            Role::User,
            "**not bold** <b>x</b>",
            ReplyRendering::TrustedRichText,
            Color::White,
        );
        assert_eq!(plain_lines(&text), vec!["**not bold** <b>x</b>"]);
    }

    #[test]
    fn plain_mode_drops_outer_blank_lines_only() {
        let text = render_plain("\n\nfirst\n\nsecond\n", Color::White);
        assert_eq!(plain_lines(&text), vec!["first", "", "second"]);
    }

    #[test]
    fn trusted_mode_breaks_on_every_newline() {
        let text = render_trusted("line one\nline two", Color::White);
        let lines = plain_lines(&text);
        assert!(lines.contains(&"line one".to_string()), "{lines:?}");
        assert!(lines.contains(&"line two".to_string()), "{lines:?}");
    }

    #[test]
    fn trusted_mode_interprets_br_and_bold() {
        let text = render_trusted("Pump <b>3</b> is fine<br>Check valve", Color::White);
        let lines = plain_lines(&text);
        assert!(lines.contains(&"Pump 3 is fine".to_string()), "{lines:?}");
        assert!(lines.contains(&"Check valve".to_string()), "{lines:?}");

        let bold = text
            .lines
            .iter()
            .flat_map(|l| l.spans.iter())
            .find(|s| s.content == "3")
            .unwrap();
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn trusted_mode_replaces_img_with_placeholder() {
        let reply = "Here is the chart:\n\n<img src=\"http://localhost:8000/static/plot_abc.png\" alt=\"Vibration\" style=\"width: 100%;\">";
        let text = render_trusted(reply, Color::White);
        let joined = plain_lines(&text).join("\n");
        assert!(joined.contains("[image: Vibration]"), "{joined}");
        assert!(joined.contains("http://localhost:8000/static/plot_abc.png"));
        assert!(!joined.contains("<img"));
    }

    #[test]
    fn trusted_mode_drops_unknown_tags() {
        let text = render_trusted("<span class=\"x\">kept</span> text", Color::White);
        let joined = plain_lines(&text).join("\n");
        assert!(joined.contains("kept text"), "{joined}");
        assert!(!joined.contains("span"));
    }

    #[test]
    fn trusted_mode_renders_markdown_emphasis() {
        let text = render_trusted("Some **bold** text", Color::Blue);
        let bold = text
            .lines
            .iter()
            .flat_map(|l| l.spans.iter())
            .find(|s| s.content == "bold")
            .unwrap();
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(bold.style.fg, Some(Color::Blue));
    }

    #[test]
    fn tag_parser_reads_attributes() {
        let tag = HtmlTag::parse("<IMG src='a.png' alt=\"Two words\" hidden />").unwrap();
        assert_eq!(tag.name, "img");
        assert!(!tag.closing);
        assert_eq!(tag.attr("src"), Some("a.png"));
        assert_eq!(tag.attr("alt"), Some("Two words"));
        assert_eq!(tag.attr("hidden"), Some(""));

        let closing = HtmlTag::parse("</strong>").unwrap();
        assert!(closing.closing);
        assert_eq!(closing.name, "strong");

        assert_eq!(HtmlTag::parse("<!-- comment -->"), None);
    }

    #[test]
    fn unbalanced_closing_tag_is_harmless() {
        let text = render_trusted("plain</b> still plain", Color::Green);
        for span in text.lines.iter().flat_map(|l| l.spans.iter()) {
            assert!(!span.style.add_modifier.contains(Modifier::BOLD));
        }
    }
}
