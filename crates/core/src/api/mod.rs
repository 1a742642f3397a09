//! High-level entry points.

pub mod high_level;

pub use high_level::extract_text_blocks_from_bytes;
