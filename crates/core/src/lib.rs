//! folio - positioned text-block extraction from single-page PDFs.
//!
//! The pipeline is: load the document structure ([`document`]), decode the
//! page's content streams, tokenize them into typed operators ([`parser`]),
//! then run the operator interpreter ([`interp`]) which produces one
//! [`model::TextBlock`] per text object. Everything the interpreter cannot
//! safely handle (composite fonts, non-WinAnsi encodings, unhandled text
//! operators) aborts the whole extraction.

pub mod api;
pub mod document;
pub mod error;
pub mod font;
pub mod interp;
pub mod model;
pub mod parser;

pub use api::high_level::extract_text_blocks_from_bytes;
pub use error::{ExtractError, Result};
pub use font::encoding::{EncodingTable, win_ansi};
pub use font::pdffont::{Font, FontMap, SimpleEncoding};
pub use interp::extract_text_blocks;
pub use model::text::TextBlock;
pub use parser::content::{Operator, SpacedRun, parse_content};
