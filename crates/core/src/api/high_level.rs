//! One-call extraction pipeline.

use crate::document::{PDFDocument, collect_pages};
use crate::error::{ExtractError, Result};
use crate::font::encoding::win_ansi;
use crate::font::pdffont::FontMap;
use crate::interp::extract_text_blocks;
use crate::model::text::TextBlock;
use crate::parser::content::parse_content;

/// Extract positioned text blocks from a single-page PDF.
///
/// The document must contain exactly one page; anything else is an error,
/// not a truncation. The result is the full block list or nothing.
pub fn extract_text_blocks_from_bytes(data: &[u8]) -> Result<Vec<TextBlock>> {
    let doc = PDFDocument::new(data.to_vec())?;
    let pages = collect_pages(&doc)?;
    if pages.len() != 1 {
        return Err(ExtractError::UnexpectedPageCount(pages.len()));
    }
    let page = &pages[0];

    let operators = parse_content(&page.contents)?;
    let fonts = FontMap::from_resources(&doc, &page.resources)?;
    extract_text_blocks(&operators, &fonts, win_ansi())
}
