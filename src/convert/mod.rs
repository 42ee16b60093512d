//! Dual-emission tag state machine.
//!
//! The converter walks the rendered HTML tag stream exactly once and
//! appends fragments to two independent output logs, one per target
//! format. The two formats disagree about almost everything stateful:
//! troff has no nesting, so list depth becomes `.RS`/`.RE` pairs and an
//! item-macro mode; inline fonts are positional escapes rather than
//! paired tags; paragraph spacing is a macro choice rather than a block
//! element. All of that shared state lives in [`Converter`].
//!
//! ## Design Notes
//!
//! - Each event is handled by a single reducer step ([`Converter::step`])
//!   that returns the fragment pair it contributes, so individual events
//!   can be unit tested without building a whole document.
//! - List context is a closed enum ([`ListKind`]) and the position inside
//!   a list item an explicit phase ([`ItemPhase`]); illegal flag
//!   combinations are unrepresentable.
//! - Tag identity is decided before emission. A paragraph that turns out
//!   to be a description-list term is emitted as a term tag once, never
//!   emitted and patched afterwards.

use std::fmt::Write as _;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};
use crate::escape::escape_html;
use crate::inline::{
    Span, push_spans, segment_text, spans_to_html, spans_to_troff, spans_to_troff_arg, trim_spans,
};

/// One tag-stream event, entities already decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagEvent {
    /// A start tag with its attributes in document order.
    Start {
        name: String,
        attrs: Vec<(String, String)>,
    },
    /// An end tag.
    End { name: String },
    /// A run of character data.
    Text { data: String },
}

/// Fragments contributed by a single reducer step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Emission {
    /// Fragment appended to the HTML body log.
    pub html: String,
    /// Fragment appended to the troff body log.
    pub troff: String,
}

/// Accumulated body output of one conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertedBody {
    pub html: String,
    pub troff: String,
}

/// List context marker, one per open list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    /// `<ul>`: items carry a bullet glyph.
    Bullet,
    /// `<ol start="N">` with N >= 1: items carry an incrementing number.
    Numbered(u32),
    /// `<ol start="0">`: rendered as a term/definition list.
    Description,
}

/// Position inside the innermost open list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemPhase {
    /// Not inside a list item.
    Outside,
    /// Item opened, first inner tag not yet seen.
    AwaitingFirstTag,
    /// Between a description term's open and its close.
    InTerm,
    /// Past the first tag (or past the term).
    InBody,
}

/// Conversion state for a single document.
///
/// Created fresh per conversion and discarded afterwards; parallel
/// conversions need independent values and nothing else.
pub struct Converter {
    lists: Vec<ListKind>,
    /// Macro that opens a paragraph: `.P` at top level, `.IP` in a list.
    para_macro: &'static str,
    /// Inline segments seen since the last consuming tag.
    pending: Vec<Span>,
    phase: ItemPhase,
    /// Tag whose close emits the pending definition-list term.
    term_source: Option<String>,
    /// The next paragraph open emits no leading paragraph macro.
    suppress_para: bool,
    in_pre: bool,
    in_code: bool,
    /// Open inline formatting tags, innermost last.
    open_inline: Vec<String>,
}

impl Converter {
    pub fn new() -> Self {
        Self {
            lists: Vec::new(),
            para_macro: ".P",
            pending: Vec::new(),
            phase: ItemPhase::Outside,
            term_source: None,
            suppress_para: false,
            in_pre: false,
            in_code: false,
            open_inline: Vec::new(),
        }
    }

    /// Advance the machine by one event.
    ///
    /// Returns the fragments this event contributes to each output log.
    /// Errors are fatal for the conversion; the logs built so far must be
    /// discarded.
    pub fn step(&mut self, event: &TagEvent) -> Result<Emission> {
        match event {
            TagEvent::Start { name, attrs } => self.start_tag(name, attrs),
            TagEvent::End { name } => self.end_tag(name),
            TagEvent::Text { data } => Ok(self.text(data)),
        }
    }

    fn start_tag(&mut self, name: &str, attrs: &[(String, String)]) -> Result<Emission> {
        let mut em = Emission::default();
        let mut html_name = name;
        let mut drop_attrs = false;
        let mut emit_html_tag = true;

        // The first tag inside a list item decides the item's shape: in a
        // description list it becomes the term source, elsewhere a leading
        // paragraph must not emit its own paragraph break on top of the
        // item macro.
        if self.phase == ItemPhase::AwaitingFirstTag {
            if self.lists.last() == Some(&ListKind::Description) {
                if name != "p" {
                    em.html.push_str("<dt>");
                }
                self.term_source = Some(name.to_string());
                self.phase = ItemPhase::InTerm;
            } else {
                if name == "p" {
                    self.suppress_para = true;
                }
                self.phase = ItemPhase::InBody;
            }
        }

        match name {
            "p" => {
                if self.term_source.as_deref() == Some("p") && self.phase == ItemPhase::InTerm {
                    html_name = "dt";
                } else if !self.suppress_para {
                    em.troff.push_str(self.para_macro);
                    em.troff.push('\n');
                }
            }
            "li" => {
                self.phase = ItemPhase::AwaitingFirstTag;
                match self.lists.last_mut() {
                    Some(ListKind::Bullet) => em.troff.push_str(".IP \\(bu\n"),
                    Some(ListKind::Numbered(counter)) => {
                        writeln!(em.troff, ".IP {counter}.").unwrap();
                        *counter += 1;
                    }
                    // Description items emit nothing here; the term tag
                    // from the item's first inner tag takes the place of
                    // the item tag in both outputs.
                    Some(ListKind::Description) => emit_html_tag = false,
                    None => {}
                }
            }
            "blockquote" => em.troff.push_str(".RS\n"),
            "pre" => {
                self.in_pre = true;
                em.troff.push_str(self.para_macro);
                em.troff.push_str("\n.nf\n");
            }
            "code" if !self.in_pre => {
                self.in_code = true;
                self.pending.push(Span::BoldOn);
                self.open_inline.push(name.to_string());
            }
            "b" | "strong" => {
                self.pending.push(Span::BoldOn);
                self.open_inline.push(name.to_string());
            }
            "em" | "i" => {
                html_name = "u";
                self.pending.push(Span::UnderlineOn);
                self.open_inline.push(name.to_string());
            }
            "ol" => {
                let start = attrs
                    .iter()
                    .find(|(key, _)| key == "start")
                    .and_then(|(_, value)| value.parse::<u32>().ok())
                    .unwrap_or(1);
                if !self.lists.is_empty() {
                    em.troff.push_str(".RS\n");
                }
                if start == 0 {
                    html_name = "dl";
                    drop_attrs = true;
                    self.lists.push(ListKind::Description);
                } else {
                    self.lists.push(ListKind::Numbered(start));
                }
                em.troff.push_str(self.para_macro);
                em.troff.push('\n');
                self.para_macro = ".IP";
            }
            "ul" => {
                em.troff.push_str(self.para_macro);
                em.troff.push('\n');
                if !self.lists.is_empty() {
                    em.troff.push_str(".RS\n");
                }
                self.para_macro = ".IP";
                self.lists.push(ListKind::Bullet);
            }
            // Unknown tags pass through the HTML log with no man-page
            // semantics.
            _ => {}
        }

        if emit_html_tag {
            em.html.push('<');
            em.html.push_str(html_name);
            if !drop_attrs {
                for (key, value) in attrs {
                    write!(em.html, " {}=\"{}\"", key, escape_html(value)).unwrap();
                }
            }
            em.html.push('>');
        }
        self.suppress_para = false;
        Ok(em)
    }

    fn end_tag(&mut self, name: &str) -> Result<Emission> {
        let mut em = Emission::default();
        let mut html_name = name;

        let is_term_close =
            self.phase == ItemPhase::InTerm && self.term_source.as_deref() == Some(name);
        let consumes = is_term_close || matches!(name, "h1" | "h2" | "p" | "li" | "pre");
        let mut txt = if consumes {
            let mut spans = std::mem::take(&mut self.pending);
            trim_spans(&mut spans);
            Some(spans)
        } else {
            None
        };

        // Inline spans may nest but must close inside their block; a span
        // leaking across a consuming boundary is malformed input.
        match name {
            "b" | "strong" | "em" | "i" => self.close_inline(name)?,
            "code" if !self.in_pre => self.close_inline(name)?,
            "h1" | "h2" | "p" | "li" | "pre" => {
                if let Some(open) = self.open_inline.last() {
                    return Err(Error::UnbalancedInline { tag: open.clone() });
                }
            }
            _ => {}
        }

        match name {
            "h1" | "h2" => {
                let heading = if name == "h1" { ".SH" } else { ".SS" };
                em.troff.push_str(self.para_macro);
                em.troff.push('\n');
                writeln!(
                    em.troff,
                    "{heading} \"{}\"",
                    spans_to_troff_arg(txt.as_deref().unwrap_or_default())
                )
                .unwrap();
            }
            "p" => {
                if is_term_close {
                    html_name = "dt";
                } else if let Some(spans) = &txt
                    && !spans.is_empty()
                {
                    em.troff.push_str(&spans_to_troff(spans));
                    em.troff.push('\n');
                }
            }
            "li" => {
                if self.lists.last() == Some(&ListKind::Description) {
                    html_name = "dd";
                    if self.phase == ItemPhase::AwaitingFirstTag {
                        return Err(Error::MissingTerm);
                    }
                }
                if let Some(spans) = &txt
                    && !spans.is_empty()
                {
                    em.troff.push_str(&spans_to_troff(spans));
                    em.troff.push('\n');
                }
                self.phase = ItemPhase::InBody;
            }
            "blockquote" => em.troff.push_str(".RE\n"),
            "pre" => {
                self.in_pre = false;
                if let Some(spans) = &txt
                    && !spans.is_empty()
                {
                    em.troff.push_str(&spans_to_troff(spans));
                    em.troff.push('\n');
                }
                em.troff.push_str(".fi\n");
            }
            "code" if !self.in_pre => {
                self.in_code = false;
                match &mut txt {
                    Some(spans) => spans.push(Span::FontRestore),
                    None => self.pending.push(Span::FontRestore),
                }
            }
            "b" | "strong" => match &mut txt {
                Some(spans) => spans.push(Span::FontRestore),
                None => self.pending.push(Span::FontRestore),
            },
            "em" | "i" => {
                html_name = "u";
                match &mut txt {
                    Some(spans) => spans.push(Span::FontRestore),
                    None => self.pending.push(Span::FontRestore),
                }
            }
            "ol" | "ul" => {
                let popped = self.lists.pop();
                if popped == Some(ListKind::Description) {
                    html_name = "dl";
                }
                if self.lists.is_empty() {
                    self.para_macro = ".P";
                } else {
                    em.troff.push_str(".RE\n");
                }
                self.suppress_para = false;
            }
            _ => {}
        }

        if is_term_close {
            writeln!(
                em.troff,
                ".IP \"{}\"",
                spans_to_troff_arg(txt.as_deref().unwrap_or_default())
            )
            .unwrap();
            self.term_source = None;
            self.phase = ItemPhase::InBody;
        }

        write!(em.html, "</{html_name}>").unwrap();
        if is_term_close {
            if name != "p" {
                em.html.push_str("</dt>");
            }
            em.html.push_str("<dd>");
            self.suppress_para = true;
        }
        Ok(em)
    }

    fn text(&mut self, data: &str) -> Emission {
        let mut em = Emission::default();

        if self.in_pre {
            // Verbatim: no hyphen or space rewriting inside no-fill blocks.
            em.html.push_str(&escape_html(data));
            push_spans(&mut self.pending, vec![Span::Text(data.to_string())]);
            return em;
        }

        let spans = segment_text(data, self.in_code);
        if self.in_code {
            // Code spans are non-breaking via stylesheet; the markers only
            // matter for troff.
            em.html.push_str(&escape_html(data));
        } else {
            em.html.push_str(&spans_to_html(&spans));
        }
        push_spans(&mut self.pending, spans);
        em
    }

    fn close_inline(&mut self, name: &str) -> Result<()> {
        match self.open_inline.pop() {
            Some(open) if open == name => Ok(()),
            _ => Err(Error::UnbalancedInline {
                tag: name.to_string(),
            }),
        }
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a restricted-vocabulary HTML body into the two body streams.
///
/// The input is walked once with a streaming reader; each event advances
/// the [`Converter`] and its fragments are appended to the logs. A fatal
/// error discards both logs.
pub fn convert_body(html: &str) -> Result<ConvertedBody> {
    let mut reader = Reader::from_str(html);
    let mut converter = Converter::new();
    let mut out = ConvertedBody::default();
    let mut events = 0usize;

    loop {
        let emission = match reader.read_event()? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let attrs = collect_attrs(&e)?;
                Some(converter.step(&TagEvent::Start { name, attrs })?)
            }
            Event::End(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                Some(converter.step(&TagEvent::End { name })?)
            }
            Event::Empty(e) => {
                // Void elements (`<br/>`, `<hr/>`) pass through the HTML
                // log and contribute no man-page semantics.
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let attrs = collect_attrs(&e)?;
                let mut html = String::new();
                write!(html, "<{name}").unwrap();
                for (key, value) in &attrs {
                    write!(html, " {}=\"{}\"", key, escape_html(value)).unwrap();
                }
                html.push_str("/>");
                Some(Emission {
                    html,
                    troff: String::new(),
                })
            }
            Event::Text(e) => {
                let data = String::from_utf8_lossy(e.as_ref()).into_owned();
                Some(converter.step(&TagEvent::Text { data })?)
            }
            Event::GeneralRef(e) => {
                let entity = String::from_utf8_lossy(e.as_ref()).into_owned();
                resolve_entity(&entity)
                    .map(|data| converter.step(&TagEvent::Text { data }))
                    .transpose()?
            }
            Event::Eof => break,
            _ => None,
        };

        if let Some(emission) = emission {
            events += 1;
            out.html.push_str(&emission.html);
            out.troff.push_str(&emission.troff);
        }
    }

    log::debug!(
        "converted body: {events} events, {} bytes html, {} bytes troff",
        out.html.len(),
        out.troff.len()
    );
    Ok(out)
}

fn collect_attrs(e: &BytesStart) -> Result<Vec<(String, String)>> {
    let mut attrs = Vec::new();
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = String::from_utf8(attr.value.to_vec())?;
        let value = quick_xml::escape::unescape(&raw)
            .map(|v| v.into_owned())
            .unwrap_or(raw);
        attrs.push((key, value));
    }
    Ok(attrs)
}

/// Resolve entity references the renderer emits in text content.
fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        _ => {}
    }

    if let Some(hex) = entity.strip_prefix("#x") {
        if let Ok(code) = u32::from_str_radix(hex, 16)
            && let Some(c) = char::from_u32(code)
        {
            return Some(c.to_string());
        }
    } else if let Some(dec) = entity.strip_prefix('#')
        && let Ok(code) = dec.parse::<u32>()
        && let Some(c) = char::from_u32(code)
    {
        return Some(c.to_string());
    }

    None
}
