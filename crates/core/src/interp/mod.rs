//! Content-stream operator interpretation.

pub mod interpreter;

pub use interpreter::extract_text_blocks;
