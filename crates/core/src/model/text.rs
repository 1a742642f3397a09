//! Extraction output record.

use serde::{Deserialize, Serialize};

/// One logically grouped run of text placed by a BT/ET text object.
///
/// `x`/`y` come from the last Tm seen inside the object; `text` accumulates
/// append-only for the lifetime of the block. The serialized field names
/// (`x`, `y`, `text`) are the interchange contract with consumers and must
/// not change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

impl TextBlock {
    pub fn new(x: f64, y: f64, text: impl Into<String>) -> Self {
        Self {
            x,
            y,
            text: text.into(),
        }
    }
}
