//! Data model: PDF object types and the extraction output record.

pub mod objects;
pub mod text;

pub use objects::{PDFObjRef, PDFObject, PDFStream};
pub use text::TextBlock;
