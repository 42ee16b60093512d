//! Document assembly.
//!
//! Wraps the two accumulated body streams with fixed headers and footers
//! carrying the page metadata. No transformation happens here; a body
//! fragment that made it out of the converter is final.

use std::fmt::Write as _;

use crate::convert::convert_body;
use crate::error::Result;
use crate::escape::escape_html;

/// Embedded stylesheet for the HTML output.
///
/// The `code` rule is load-bearing: inline code never wraps in the HTML
/// rendering, which is why the converter leaves the non-breaking space
/// markers out of the HTML copy of code spans.
const STYLE: &str = "\
body { font-family: \"Source Sans Pro\", sans-serif; max-width: 44em;
       margin: 2em auto; padding: 0 1em; color: #222; }
h1 { border-bottom: 2px solid #ddd; padding-bottom: 0.2em; }
code, pre { font-family: \"Source Code Pro\", monospace; background: #f6f6f6; }
code { white-space: nowrap; padding: 0 0.2em; }
pre { padding: 0.6em; overflow-x: auto; }
pre code { white-space: pre; padding: 0; }
dt { font-weight: bold; }
dd { margin-bottom: 0.6em; }
blockquote { border-left: 3px solid #ddd; margin-left: 0;
             padding-left: 1em; color: #555; }
.byline { margin-top: 3em; border-top: 1px solid #ddd;
          color: #888; font-size: 0.85em; }
";

/// One referenced web font stylesheet; the only external dependency of
/// the HTML output.
const FONT_LINK: &str =
    "https://fonts.googleapis.com/css?family=Source+Sans+Pro:400,700|Source+Code+Pro";

/// Page metadata, resolved by the caller before conversion starts.
#[derive(Debug, Clone)]
pub struct ManualMetadata {
    /// Program the page documents.
    pub program: String,
    /// Manual section number.
    pub section: String,
    /// Document title.
    pub title: String,
    /// Human-readable date for the header and byline.
    pub date: String,
    /// Version string of the documented program.
    pub version: String,
    /// Install-path prefix recorded in the man page header.
    pub prefix: String,
}

impl ManualMetadata {
    pub fn new(program: impl Into<String>, section: impl Into<String>) -> Self {
        let program = program.into();
        let title = format!("{program} manual");
        Self {
            program,
            section: section.into(),
            title,
            date: String::new(),
            version: String::new(),
            prefix: "/usr/local".to_string(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

/// The two finished documents of one conversion.
#[derive(Debug, Clone)]
pub struct RenderedManual {
    /// Self-contained HTML document.
    pub html: String,
    /// troff man page source.
    pub troff: String,
}

/// Convert a rendered-markdown HTML body into both output documents.
///
/// This is the whole pipeline behind the driver: one streaming pass over
/// the tag stream, then assembly. A fatal conversion error yields no
/// document at all.
pub fn convert(html: &str, meta: &ManualMetadata) -> Result<RenderedManual> {
    log::debug!(
        "converting {} bytes of rendered HTML for {}({})",
        html.len(),
        meta.program,
        meta.section
    );
    let body = convert_body(html)?;
    Ok(RenderedManual {
        html: assemble_html(&body.html, meta),
        troff: assemble_troff(&body.troff, meta),
    })
}

fn assemble_html(body: &str, meta: &ManualMetadata) -> String {
    let mut doc = String::with_capacity(body.len() + STYLE.len() + 512);
    doc.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\"/>\n");
    writeln!(doc, "<title>{}</title>", escape_html(&meta.title)).unwrap();
    writeln!(doc, "<link rel=\"stylesheet\" href=\"{FONT_LINK}\"/>").unwrap();
    doc.push_str("<style>\n");
    doc.push_str(STYLE);
    doc.push_str("</style>\n</head>\n<body>\n");
    doc.push_str(body);
    writeln!(
        doc,
        "\n<p class=\"byline\">{}({}) &mdash; {}</p>",
        escape_html(&meta.program),
        escape_html(&meta.section),
        escape_html(&meta.date)
    )
    .unwrap();
    doc.push_str("</body>\n</html>\n");
    doc
}

fn assemble_troff(body: &str, meta: &ManualMetadata) -> String {
    let mut doc = String::with_capacity(body.len() + 256);
    writeln!(doc, ".\\\" {}", meta.title).unwrap();
    doc.push_str(".\\\"\n");
    writeln!(
        doc,
        ".\\\" {}({}) version {}",
        meta.program, meta.section, meta.version
    )
    .unwrap();
    writeln!(doc, ".\\\" date: {}", meta.date).unwrap();
    writeln!(doc, ".\\\" prefix: {}", meta.prefix).unwrap();
    doc.push_str(".\\\"\n");
    writeln!(
        doc,
        ".TH \"{}\" \"{}\" \"{}\" \"{} {}\"",
        quote_arg(&meta.program.to_uppercase()),
        quote_arg(&meta.section),
        quote_arg(&meta.date),
        quote_arg(&meta.program),
        quote_arg(&meta.version)
    )
    .unwrap();
    doc.push_str(body);
    // Man pages end without a trailer.
    doc
}

fn quote_arg(text: &str) -> String {
    text.replace('"', "\"\"")
}
