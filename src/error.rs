//! Error types for manweave conversions.

use thiserror::Error;

/// Errors that can occur while converting a document.
///
/// Conversion errors are fatal for the whole document: there is no partial
/// output contract, and the driver writes no files after one.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed HTML input: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error(
        "description list item has no term: items of a zero-started ordered \
         list must begin with an inner tag"
    )]
    MissingTerm,

    #[error("inline <{tag}> is not balanced within its block")]
    UnbalancedInline { tag: String },

    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, Error>;
