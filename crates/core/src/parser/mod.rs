//! PDF tokenization and parsing.
//!
//! - `lexer`: byte-level tokenizer shared by the object parser and the
//!   content-stream parser
//! - `pdf_parser`: PDF object parser (dicts, arrays, indirect references)
//! - `content`: content-stream parser producing typed operators

pub mod content;
pub mod lexer;
pub mod pdf_parser;

pub use content::{Operator, SpacedRun, parse_content};
pub use lexer::{Keyword, PSBaseParser, PSToken};
pub use pdf_parser::PDFParser;
