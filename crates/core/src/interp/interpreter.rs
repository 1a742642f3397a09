//! The operator interpreter.
//!
//! A single forward pass over the operator sequence, carrying one
//! accumulator block. BT resets the accumulator, ET commits a snapshot of
//! it, and everything in between appends text or repositions the block.
//! The pass is total: any operator it cannot represent faithfully aborts
//! the extraction with no partial output.

use crate::error::{ExtractError, Result};
use crate::font::encoding::EncodingTable;
use crate::font::pdffont::{Font, FontMap, SimpleEncoding};
use crate::model::text::TextBlock;
use crate::parser::content::Operator;

/// Run the interpreter over a page's operators.
///
/// Returns one block per ET, in stream order. Text shown before the first
/// BT accumulates into a block positioned at the origin; it is only
/// emitted if an ET arrives before any BT.
pub fn extract_text_blocks(
    operators: &[Operator],
    fonts: &FontMap,
    encoding: &EncodingTable,
) -> Result<Vec<TextBlock>> {
    let mut blocks = Vec::new();
    let mut current = TextBlock::default();

    for op in operators {
        match op {
            Operator::BeginText => current = TextBlock::default(),
            Operator::EndText => blocks.push(current.clone()),
            Operator::SetTextMatrix(m) => {
                // Output coordinates deliberately swap the translation
                // components: x comes from f, y from e. Downstream
                // consumers were built around this orientation.
                current.x = m[5];
                current.y = m[4];
            }
            Operator::SetFont { font, .. } => check_font(fonts, font)?,
            Operator::ShowText(bytes) => {
                // Raw bytes carried through as-is (one char per byte);
                // code-to-character mapping applies only to TJ runs.
                current.text.extend(bytes.iter().map(|&b| b as char));
            }
            Operator::ShowSpacedText(runs) => {
                for run in runs {
                    for &code in &run.codes {
                        current.text.push(encoding.decode(code));
                    }
                }
            }
            Operator::TextMove(..) => current.text.push(' '),
            Operator::TextNextLine => current.text.push('\n'),
            Operator::MoveShowText(_) => {
                return Err(ExtractError::UnsupportedOperator("'"));
            }
            Operator::MoveSetShowText { .. } => {
                return Err(ExtractError::UnsupportedOperator("\""));
            }
            Operator::ShowSpaceGlyph => {
                return Err(ExtractError::UnsupportedOperator("glyph-indexed show"));
            }
            // TD adjusts leading for operators we already reject, and the
            // rest of the grammar has no effect on block text.
            Operator::TextMoveSetLeading(..) | Operator::Other(_) => {}
        }
    }

    Ok(blocks)
}

/// Font selection is where unsupported text is refused: anything other
/// than a simple font declaring WinAnsiEncoding would make the byte-level
/// decode above wrong, so it aborts the pass.
fn check_font(fonts: &FontMap, name: &str) -> Result<()> {
    match fonts.get(name) {
        None => Err(ExtractError::UnsupportedFont(format!(
            "font {name} not present in page resources"
        ))),
        Some(Font::Composite { basefont }) => Err(ExtractError::UnsupportedFont(format!(
            "composite font {}",
            basefont.as_deref().unwrap_or(name)
        ))),
        Some(Font::Simple(simple)) => {
            if simple.encoding == Some(SimpleEncoding::WinAnsi) {
                Ok(())
            } else {
                Err(ExtractError::UnsupportedFont(format!(
                    "font {} does not use WinAnsiEncoding",
                    simple.basefont.as_deref().unwrap_or(name)
                )))
            }
        }
    }
}
