//! Document structure: xref loading, object retrieval, stream decoding,
//! page tree traversal.

pub mod catalog;
pub mod page;

pub use catalog::PDFDocument;
pub use page::{PDFPage, collect_pages};
