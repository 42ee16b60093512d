//! Typed inline segments for deferred font and spacing decisions.
//!
//! The converter cannot resolve inline formatting while text accumulates:
//! troff wants positional font escapes (`\fB`, `\fI`, `\fR`) while HTML
//! wants real tags, and non-breaking hyphens/spaces render differently in
//! each format. Instead of smuggling reserved control characters through
//! the text (which would make those code points illegal in input), the
//! accumulator holds a sequence of typed [`Span`] segments that each
//! output renderer resolves exactly once.
//!
//! Font markers are positional, not paired: a close restores the normal
//! font regardless of what opened it. This mirrors troff's single font
//! register, where `\fR` after nested `\fB`/`\fI` spans collapses
//! everything back to roman.

use crate::escape::{escape_html, escape_troff};

/// One inline segment of accumulated body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    /// Literal text, unescaped.
    Text(String),
    /// Switch to bold until the next font restore.
    BoldOn,
    /// Switch to underline (the italic register) until the next restore.
    UnderlineOn,
    /// Restore the normal font. Shared by bold and underline closes.
    FontRestore,
    /// A hyphen that must not become a line-break or hyphenation point.
    NbHyphen,
    /// A space that must not become a line-break point.
    NbSpace,
}

/// Segment raw text data, rewriting flag-like hyphen runs.
///
/// A run of hyphens at the start of the text or immediately after
/// whitespace is flag-like (`--option`, `-o`): each hyphen in the run
/// becomes [`Span::NbHyphen`], and the single whitespace character before
/// the run becomes [`Span::NbSpace`] so the whole token stays on one
/// line. Word-internal hyphens (`well-known`) are left alone.
///
/// With `code` set, every whitespace character becomes [`Span::NbSpace`];
/// inline code must never wrap in the troff output.
pub fn segment_text(text: &str, code: bool) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut buf = String::new();
    let mut prev: Option<char> = None;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '-' && prev.is_none_or(char::is_whitespace) {
            if prev.is_some_and(char::is_whitespace) && !code {
                // The whitespace was buffered as plain text; it joins the
                // token as a non-breaking space instead. In code mode it
                // already became one.
                buf.pop();
                flush_text(&mut spans, &mut buf);
                spans.push(Span::NbSpace);
            } else {
                flush_text(&mut spans, &mut buf);
            }
            spans.push(Span::NbHyphen);
            while chars.peek() == Some(&'-') {
                chars.next();
                spans.push(Span::NbHyphen);
            }
            prev = Some('-');
            continue;
        }

        if code && c.is_whitespace() {
            flush_text(&mut spans, &mut buf);
            spans.push(Span::NbSpace);
        } else {
            buf.push(c);
        }
        prev = Some(c);
    }

    flush_text(&mut spans, &mut buf);
    spans
}

fn flush_text(spans: &mut Vec<Span>, buf: &mut String) {
    if !buf.is_empty() {
        spans.push(Span::Text(std::mem::take(buf)));
    }
}

/// Append segments to an accumulator, merging adjacent text.
///
/// The tag stream can split one logical run of text across several events
/// (entity references arrive separately); merging keeps the accumulator's
/// text segments whole so trimming and escaping see complete lines.
pub fn push_spans(pending: &mut Vec<Span>, spans: Vec<Span>) {
    for span in spans {
        let merged = match (pending.last_mut(), &span) {
            (Some(Span::Text(tail)), Span::Text(head)) => {
                tail.push_str(head);
                true
            }
            _ => false,
        };
        if !merged {
            pending.push(span);
        }
    }
}

/// Trim surrounding whitespace from a segment list.
///
/// Only literal text at the edges is trimmed; marker segments are kept.
pub fn trim_spans(spans: &mut Vec<Span>) {
    while matches!(spans.first(), Some(Span::Text(t)) if t.trim_start().is_empty()) {
        spans.remove(0);
    }
    if let Some(Span::Text(t)) = spans.first_mut() {
        let trimmed = t.trim_start().to_string();
        *t = trimmed;
    }
    while matches!(spans.last(), Some(Span::Text(t)) if t.trim_end().is_empty()) {
        spans.pop();
    }
    if let Some(Span::Text(t)) = spans.last_mut() {
        let len = t.trim_end().len();
        t.truncate(len);
    }
}

/// Render segments to troff body text.
///
/// Text is escaped per [`escape_troff`]; markers become the corresponding
/// troff escapes.
pub fn spans_to_troff(spans: &[Span]) -> String {
    let mut out = String::new();
    for span in spans {
        match span {
            Span::Text(t) => out.push_str(&escape_troff(t)),
            Span::BoldOn => out.push_str("\\fB"),
            Span::UnderlineOn => out.push_str("\\fI"),
            Span::FontRestore => out.push_str("\\fR"),
            Span::NbHyphen => out.push_str("\\-"),
            Span::NbSpace => out.push_str("\\ "),
        }
    }
    out
}

/// Render segments as a quoted troff macro argument.
///
/// Embedded double quotes are doubled so the argument survives roff
/// quoting; callers wrap the result in `"`.
pub fn spans_to_troff_arg(spans: &[Span]) -> String {
    spans_to_troff(spans).replace('"', "\"\"")
}

/// Render segments to HTML text context.
///
/// Font markers disappear (the HTML stream carries real tags for them);
/// spacing markers become visible non-breaking entities.
pub fn spans_to_html(spans: &[Span]) -> String {
    let mut out = String::new();
    for span in spans {
        match span {
            Span::Text(t) => out.push_str(&escape_html(t)),
            Span::BoldOn | Span::UnderlineOn | Span::FontRestore => {}
            Span::NbHyphen => out.push_str("&#8209;"),
            Span::NbSpace => out.push_str("&nbsp;"),
        }
    }
    out
}
