//! Error types for folio PDF text extraction.

use thiserror::Error;

/// Primary error type for the extraction pipeline.
///
/// Every variant is fatal for the current extraction call: there is no
/// partial result and no internal retry. The first group is raised while
/// reading the document structure; the rest map one-to-one onto the
/// pipeline stages that can fail.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("invalid token at position {pos}: {msg}")]
    TokenError { pos: usize, msg: String },

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("type error: expected {expected}, got {got}")]
    TypeError {
        expected: &'static str,
        got: &'static str,
    },

    #[error("PDF object not found: {0}")]
    ObjectNotFound(u32),

    #[error("no valid xref table found")]
    NoValidXRef,

    #[error("document read error: {0}")]
    DocumentRead(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("expected a single page, got {0}")]
    UnexpectedPageCount(usize),

    #[error("content decode error: {0}")]
    ContentDecode(String),

    #[error("operator parse error: {0}")]
    OperatorParse(String),

    #[error("unsupported font: {0}")]
    UnsupportedFont(String),

    #[error("unhandled text operator: {0}")]
    UnsupportedOperator(&'static str),
}

/// Convenience Result type alias for ExtractError.
pub type Result<T> = std::result::Result<T, ExtractError>;
