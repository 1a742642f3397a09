//! Font model and single-byte encodings.

pub mod encoding;
pub mod pdffont;

pub use encoding::{EncodingTable, win_ansi};
pub use pdffont::{Font, FontMap, SimpleEncoding, SimpleFont};
