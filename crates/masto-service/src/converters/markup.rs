//! Lightweight markup to HTML
//!
//! Renders the note and bio markup dialect into the HTML subset Mastodon
//! clients display: paragraphs and line breaks, code blocks, quotes, inline
//! emphasis, `$[fn ...]` blocks, links, mentions and hashtags.
//!
//! Rendering is strict; [`MarkupRenderer::render_or_escape`] is what the
//! converters call, and it falls back to escaped plain text on any error.

use masto_common::InstanceConfig;
use thiserror::Error;
use tracing::debug;

/// Deepest allowed nesting of inline constructs
const MAX_NESTING: usize = 20;

/// Paired inline delimiters, indexed by their bit in [`Unclosed`]
const PAIRED: [(&str, &str, &str); 6] = [
    ("**", "**", "b"),
    ("~~", "~~", "del"),
    ("<small>", "</small>", "small"),
    ("<b>", "</b>", "b"),
    ("<i>", "</i>", "i"),
    ("<s>", "</s>", "del"),
];

const CODE_BIT: usize = PAIRED.len();
const ITALIC_BIT: usize = PAIRED.len() + 1;

/// Delimiters with no closer left in the current line
///
/// Once a closer is missing from some offset it is missing from every later
/// offset too, so each delimiter kind is searched for at most once per miss.
#[derive(Debug, Default, Clone, Copy)]
struct Unclosed(u16);

impl Unclosed {
    fn contains(self, bit: usize) -> bool {
        self.0 & (1 << bit) != 0
    }

    fn insert(&mut self, bit: usize) {
        self.0 |= 1 << bit;
    }
}

/// Markup that could not be rendered
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupError {
    #[error("Code block is never closed")]
    UnterminatedCodeBlock,

    #[error("Function block is never closed")]
    UnterminatedFunction,

    #[error("Markup nested deeper than {MAX_NESTING} levels")]
    NestingTooDeep,
}

/// Escape text for HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Markup renderer bound to an instance (for mention and tag links)
#[derive(Debug, Clone, Copy)]
pub struct MarkupRenderer<'a> {
    instance: &'a InstanceConfig,
}

impl<'a> MarkupRenderer<'a> {
    pub fn new(instance: &'a InstanceConfig) -> Self {
        Self { instance }
    }

    /// Render markup, or escape it as plain text when it does not parse
    pub fn render_or_escape(&self, text: &str) -> String {
        self.render(text).unwrap_or_else(|e| {
            debug!(error = %e, "Markup render failed, using plain text");
            plain_html(text)
        })
    }

    /// Render markup without the paragraph wrapper, escaping on error
    ///
    /// Used for profile field values, which clients show inline.
    pub fn render_fragment_or_escape(&self, text: &str) -> String {
        self.render_blocks(text, 0).unwrap_or_else(|e| {
            debug!(error = %e, "Markup render failed, using plain text");
            text.lines().map(escape_html).collect::<Vec<_>>().join("<br>")
        })
    }

    /// Render markup to HTML
    pub fn render(&self, text: &str) -> Result<String, MarkupError> {
        if text.is_empty() {
            return Ok(String::new());
        }
        let body = self.render_blocks(text, 0)?;
        Ok(format!("<p>{body}</p>"))
    }

    fn render_blocks(&self, text: &str, depth: usize) -> Result<String, MarkupError> {
        if depth > MAX_NESTING {
            return Err(MarkupError::NestingTooDeep);
        }

        let lines: Vec<&str> = text.lines().collect();
        let mut out = String::new();
        let mut paragraph: Vec<String> = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];

            if line.trim_start().starts_with("```") {
                let close = lines[i + 1..]
                    .iter()
                    .position(|l| l.trim() == "```")
                    .ok_or(MarkupError::UnterminatedCodeBlock)?;
                let code = lines[i + 1..i + 1 + close].join("\n");
                flush_paragraph(&mut out, &mut paragraph);
                out.push_str("<pre><code>");
                out.push_str(&escape_html(&code));
                out.push_str("</code></pre>");
                i += close + 2;
                continue;
            }

            if line.starts_with('>') {
                let mut quoted = Vec::new();
                while i < lines.len() && lines[i].starts_with('>') {
                    let inner = &lines[i][1..];
                    quoted.push(inner.strip_prefix(' ').unwrap_or(inner));
                    i += 1;
                }
                flush_paragraph(&mut out, &mut paragraph);
                out.push_str("<blockquote>");
                out.push_str(&self.render_blocks(&quoted.join("\n"), depth + 1)?);
                out.push_str("</blockquote>");
                continue;
            }

            paragraph.push(self.render_inline(line, depth)?);
            i += 1;
        }

        flush_paragraph(&mut out, &mut paragraph);
        Ok(out)
    }

    fn render_inline(&self, text: &str, depth: usize) -> Result<String, MarkupError> {
        if depth > MAX_NESTING {
            return Err(MarkupError::NestingTooDeep);
        }

        let mut out = String::with_capacity(text.len());
        let mut unclosed = Unclosed::default();
        let mut i = 0;

        while i < text.len() {
            let rest = &text[i..];
            let prev = text[..i].chars().next_back();

            if let Some(consumed) =
                self.render_construct(rest, prev, depth, &mut unclosed, &mut out)?
            {
                i += consumed;
                continue;
            }

            // Plain character
            let c = rest.chars().next().unwrap_or_default();
            out.push_str(&escape_html(c.encode_utf8(&mut [0; 4])));
            i += c.len_utf8();
        }

        Ok(out)
    }

    /// Render the construct starting at `rest`, returning the bytes consumed
    fn render_construct(
        &self,
        rest: &str,
        prev: Option<char>,
        depth: usize,
        unclosed: &mut Unclosed,
        out: &mut String,
    ) -> Result<Option<usize>, MarkupError> {
        // Inline code
        if let Some(after) = rest.strip_prefix('`') {
            if unclosed.contains(CODE_BIT) {
                return Ok(None);
            }
            if let Some(end) = after.find('`') {
                out.push_str("<code>");
                out.push_str(&escape_html(&after[..end]));
                out.push_str("</code>");
                return Ok(Some(end + 2));
            }
            unclosed.insert(CODE_BIT);
            return Ok(None);
        }

        // $[name body]
        if let Some(after) = rest.strip_prefix("$[") {
            let close = matching_bracket(after).ok_or(MarkupError::UnterminatedFunction)?;
            let inner = &after[..close];
            let body = inner
                .split_once(char::is_whitespace)
                .map_or("", |(_, body)| body);
            out.push_str("<i>");
            out.push_str(&self.render_inline(body, depth + 1)?);
            out.push_str("</i>");
            return Ok(Some(close + 3));
        }

        for (bit, (open, close, tag)) in PAIRED.into_iter().enumerate() {
            if let Some(after) = rest.strip_prefix(open) {
                if unclosed.contains(bit) {
                    return Ok(None);
                }
                if let Some(end) = after.find(close) {
                    out.push_str(&format!("<{tag}>"));
                    out.push_str(&self.render_inline(&after[..end], depth + 1)?);
                    out.push_str(&format!("</{tag}>"));
                    return Ok(Some(open.len() + end + close.len()));
                }
                unclosed.insert(bit);
                return Ok(None);
            }
        }

        // *italic*
        if let Some(after) = rest.strip_prefix('*') {
            if unclosed.contains(ITALIC_BIT) {
                return Ok(None);
            }
            match after.find('*') {
                Some(end) => {
                    let inner = &after[..end];
                    if !inner.is_empty() && inner.trim() == inner {
                        out.push_str("<i>");
                        out.push_str(&self.render_inline(inner, depth + 1)?);
                        out.push_str("</i>");
                        return Ok(Some(end + 2));
                    }
                }
                None => unclosed.insert(ITALIC_BIT),
            }
            return Ok(None);
        }

        let at_boundary = prev.map_or(true, |c| !c.is_alphanumeric() && c != '_');

        if at_boundary && (rest.starts_with("https://") || rest.starts_with("http://")) {
            let url = take_url(rest);
            let escaped = escape_html(url);
            out.push_str(&format!("<a href=\"{escaped}\">{escaped}</a>"));
            return Ok(Some(url.len()));
        }

        if at_boundary && prev != Some('@') && rest.starts_with('@') {
            if let Some((len, username, host)) = take_mention(rest) {
                let href = escape_html(&self.instance.profile_url(username, host));
                let label = escape_html(&rest[..len]);
                out.push_str(&format!("<a href=\"{href}\" class=\"u-url mention\">{label}</a>"));
                return Ok(Some(len));
            }
            return Ok(None);
        }

        if prev.map_or(true, char::is_whitespace) && rest.starts_with('#') {
            let tag: String = rest[1..]
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_')
                .collect();
            if !tag.is_empty() && !tag.chars().all(|c| c.is_ascii_digit()) {
                let href = escape_html(&self.instance.tag_url(&tag));
                let label = escape_html(&tag);
                out.push_str(&format!("<a href=\"{href}\" rel=\"tag\">#{label}</a>"));
                return Ok(Some(1 + tag.len()));
            }
        }

        Ok(None)
    }
}

/// Escaped text with line breaks, wrapped in a paragraph
pub fn plain_html(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let lines: Vec<String> = text.lines().map(escape_html).collect();
    format!("<p>{}</p>", lines.join("<br>"))
}

fn flush_paragraph(out: &mut String, paragraph: &mut Vec<String>) {
    if !paragraph.is_empty() {
        out.push_str(&paragraph.join("<br>"));
        paragraph.clear();
    }
}

/// Byte offset of the `]` closing an already opened `[`
fn matching_bracket(text: &str) -> Option<usize> {
    let mut open = 1usize;
    for (i, c) in text.char_indices() {
        match c {
            '[' => open += 1,
            ']' => {
                open -= 1;
                if open == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// URL at the start of `text`, without trailing punctuation
fn take_url(text: &str) -> &str {
    let end = text
        .find(|c: char| c.is_whitespace() || matches!(c, '<' | '>' | '"'))
        .unwrap_or(text.len());
    let mut url = &text[..end];
    loop {
        let trimmed = url.trim_end_matches(['.', ',', ':', ';', '!', '?', '\'']);
        let trimmed = if trimmed.ends_with(')') && trimmed.matches('(').count() < trimmed.matches(')').count() {
            &trimmed[..trimmed.len() - 1]
        } else {
            trimmed
        };
        if trimmed.len() == url.len() {
            return url;
        }
        url = trimmed;
    }
}

/// `@username` or `@username@host` at the start of `text`
fn take_mention(text: &str) -> Option<(usize, &str, Option<&str>)> {
    let after = &text[1..];
    let user_len = after
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(after.len());
    if user_len == 0 {
        return None;
    }
    let username = &after[..user_len];

    let host = after[user_len..].strip_prefix('@').and_then(|rest| {
        let host_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '.' || c == '-'))
            .unwrap_or(rest.len());
        let host = rest[..host_len].trim_end_matches(['.', '-']);
        (!host.is_empty()).then_some(host)
    });

    let len = 1 + user_len + host.map_or(0, |h| 1 + h.len());
    Some((len, username, host))
}
