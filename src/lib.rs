//! # manweave
//!
//! A single-pass converter that turns rendered-markdown HTML into two
//! synchronized documents: a self-contained styled HTML page and a
//! troff/nroff man page source.
//!
//! ## Features
//!
//! - One streaming walk over the tag stream drives both outputs at once
//! - Ordered, unordered, and term/definition lists with arbitrary nesting
//! - Inline bold/underline/code rendered as troff font escapes
//! - Flag-like tokens (`--option`) kept unbreakable in both outputs
//! - Bundled markdown front end with the restricted tag vocabulary
//!
//! ## Quick Start
//!
//! ```
//! use manweave::{ManualMetadata, convert, render_markdown};
//!
//! let html = render_markdown("# NAME\n\nfrob - frobnicate things\n");
//! let meta = ManualMetadata::new("frob", "1")
//!     .with_date("2024-03-01")
//!     .with_version("1.0.0");
//! let rendered = convert(&html, &meta).unwrap();
//!
//! assert!(rendered.troff.contains(".SH \"NAME\""));
//! assert!(rendered.html.contains("<h1>NAME</h1>"));
//! ```
//!
//! The conversion either produces both documents or fails as a whole;
//! there is no partial output. See [`convert`] for the entry point and
//! [`Converter`] for event-level access to the state machine.

pub mod convert;
pub mod document;
pub mod error;
pub mod escape;
pub mod inline;
pub mod markdown;

pub use convert::{ConvertedBody, Converter, Emission, TagEvent, convert_body};
pub use document::{ManualMetadata, RenderedManual, convert};
pub use error::{Error, Result};
pub use escape::{escape_html, escape_troff};
pub use markdown::render_markdown;
