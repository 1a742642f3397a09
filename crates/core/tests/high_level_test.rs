//! End-to-end tests over complete in-memory PDF files.

mod common;

use common::{WINANSI_FONT, build_pdf, one_page_doc, stream_body};
use folio_core::{ExtractError, TextBlock, extract_text_blocks_from_bytes};

#[test]
fn test_single_positioned_block() {
    let data = one_page_doc(
        b"BT /F1 12 Tf 1 0 0 1 100 200 Tm (Hi) Tj ET",
        WINANSI_FONT,
    );
    let blocks = extract_text_blocks_from_bytes(&data).unwrap();
    assert_eq!(blocks, vec![TextBlock::new(200.0, 100.0, "Hi")]);
}

#[test]
fn test_multiple_blocks_with_line_structure() {
    let data = one_page_doc(
        b"BT /F1 10 Tf 1 0 0 1 50 700 Tm (line1) Tj T* (line2) Tj ET \
          BT 1 0 0 1 50 650 Tm (A) Tj 10 0 Td (B) Tj ET",
        WINANSI_FONT,
    );
    let blocks = extract_text_blocks_from_bytes(&data).unwrap();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0], TextBlock::new(700.0, 50.0, "line1\nline2"));
    assert_eq!(blocks[1], TextBlock::new(650.0, 50.0, "A B"));
}

#[test]
fn test_spaced_text_with_high_codes() {
    // <93 48 69 94> are WinAnsi curly quotes around "Hi".
    let data = one_page_doc(b"BT /F1 12 Tf [<93486994> -100 <2E>] TJ ET", WINANSI_FONT);
    let blocks = extract_text_blocks_from_bytes(&data).unwrap();
    assert_eq!(blocks[0].text, "\u{201C}Hi\u{201D}.");
}

#[test]
fn test_empty_page_yields_no_blocks() {
    let data = one_page_doc(b"", WINANSI_FONT);
    assert!(extract_text_blocks_from_bytes(&data).unwrap().is_empty());
}

#[test]
fn test_two_pages_refused() {
    let content = stream_body(b"BT ET");
    let data = build_pdf(
        &[
            (1, b"<< /Type /Catalog /Pages 2 0 R >>"),
            (2, b"<< /Type /Pages /Kids [3 0 R 5 0 R] /Count 2 >>"),
            (3, b"<< /Type /Page /Parent 2 0 R /Contents 4 0 R >>"),
            (4, &content),
            (5, b"<< /Type /Page /Parent 2 0 R >>"),
        ],
        1,
    );
    assert!(matches!(
        extract_text_blocks_from_bytes(&data),
        Err(ExtractError::UnexpectedPageCount(2))
    ));
}

#[test]
fn test_composite_font_aborts_extraction() {
    let data = one_page_doc(
        b"BT /F1 12 Tf (x) Tj ET",
        "<< /Type /Font /Subtype /Type0 /BaseFont /Noto /Encoding /Identity-H >>",
    );
    assert!(matches!(
        extract_text_blocks_from_bytes(&data),
        Err(ExtractError::UnsupportedFont(_))
    ));
}

#[test]
fn test_non_winansi_font_aborts_extraction() {
    let data = one_page_doc(
        b"BT /F1 12 Tf (x) Tj ET",
        "<< /Type /Font /Subtype /Type1 /BaseFont /Courier /Encoding /MacRomanEncoding >>",
    );
    assert!(matches!(
        extract_text_blocks_from_bytes(&data),
        Err(ExtractError::UnsupportedFont(_))
    ));
}

#[test]
fn test_move_show_operator_aborts_extraction() {
    let data = one_page_doc(b"BT /F1 12 Tf (a) Tj (b) ' ET", WINANSI_FONT);
    assert!(matches!(
        extract_text_blocks_from_bytes(&data),
        Err(ExtractError::UnsupportedOperator(_))
    ));
}

#[test]
fn test_malformed_operator_aborts_extraction() {
    let data = one_page_doc(b"BT 1 0 0 1 100 Tm ET", WINANSI_FONT);
    assert!(matches!(
        extract_text_blocks_from_bytes(&data),
        Err(ExtractError::OperatorParse(_))
    ));
}

#[test]
fn test_json_field_names_are_stable() {
    let data = one_page_doc(b"BT 1 0 0 1 10 20 Tm (t) Tj ET", WINANSI_FONT);
    let blocks = extract_text_blocks_from_bytes(&data).unwrap();
    let value = serde_json::to_value(&blocks).unwrap();
    assert_eq!(
        value,
        serde_json::json!([{ "x": 20.0, "y": 10.0, "text": "t" }])
    );
}

#[test]
fn test_extraction_is_deterministic() {
    let data = one_page_doc(
        b"BT /F1 12 Tf 1 0 0 1 1 2 Tm (a) Tj ET BT (b) Tj ET",
        WINANSI_FONT,
    );
    let first = extract_text_blocks_from_bytes(&data).unwrap();
    let second = extract_text_blocks_from_bytes(&data).unwrap();
    assert_eq!(first, second);
}
