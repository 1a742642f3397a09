//! Interpreter tests: operator sequences in, text blocks out.

use folio_core::font::encoding::win_ansi;
use folio_core::font::pdffont::{Font, FontMap, SimpleEncoding, SimpleFont};
use folio_core::parser::content::{Operator, SpacedRun};
use folio_core::{ExtractError, TextBlock, extract_text_blocks};

fn winansi_fonts() -> FontMap {
    let mut fonts = FontMap::new();
    fonts.insert(
        "F1",
        Font::Simple(SimpleFont {
            basefont: Some("Helvetica".into()),
            encoding: Some(SimpleEncoding::WinAnsi),
        }),
    );
    fonts
}

fn run(ops: &[Operator]) -> Result<Vec<TextBlock>, ExtractError> {
    extract_text_blocks(ops, &winansi_fonts(), win_ansi())
}

#[test]
fn test_single_block_with_position() {
    let blocks = run(&[
        Operator::BeginText,
        Operator::SetTextMatrix([1.0, 0.0, 0.0, 1.0, 100.0, 200.0]),
        Operator::ShowText(b"Hi".to_vec()),
        Operator::EndText,
    ])
    .unwrap();
    assert_eq!(blocks, vec![TextBlock::new(200.0, 100.0, "Hi")]);
}

#[test]
fn test_last_matrix_wins() {
    let blocks = run(&[
        Operator::BeginText,
        Operator::SetTextMatrix([1.0, 0.0, 0.0, 1.0, 1.0, 2.0]),
        Operator::ShowText(b"a".to_vec()),
        Operator::SetTextMatrix([1.0, 0.0, 0.0, 1.0, 30.0, 40.0]),
        Operator::ShowText(b"b".to_vec()),
        Operator::EndText,
    ])
    .unwrap();
    assert_eq!(blocks, vec![TextBlock::new(40.0, 30.0, "ab")]);
}

#[test]
fn test_text_move_becomes_space() {
    let blocks = run(&[
        Operator::BeginText,
        Operator::ShowText(b"A".to_vec()),
        Operator::TextMove(10.0, 0.0),
        Operator::ShowText(b"B".to_vec()),
        Operator::EndText,
    ])
    .unwrap();
    assert_eq!(blocks[0].text, "A B");
}

#[test]
fn test_next_line_becomes_newline() {
    let blocks = run(&[
        Operator::BeginText,
        Operator::ShowText(b"line1".to_vec()),
        Operator::TextNextLine,
        Operator::ShowText(b"line2".to_vec()),
        Operator::EndText,
    ])
    .unwrap();
    assert_eq!(blocks[0].text, "line1\nline2");
}

#[test]
fn test_empty_block_still_emitted() {
    let blocks = run(&[
        Operator::BeginText,
        Operator::EndText,
        Operator::BeginText,
        Operator::ShowText(b"x".to_vec()),
        Operator::EndText,
    ])
    .unwrap();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0], TextBlock::new(0.0, 0.0, ""));
    assert_eq!(blocks[1].text, "x");
}

#[test]
fn test_begin_text_discards_uncommitted_block() {
    let blocks = run(&[
        Operator::BeginText,
        Operator::SetTextMatrix([1.0, 0.0, 0.0, 1.0, 9.0, 9.0]),
        Operator::ShowText(b"lost".to_vec()),
        Operator::BeginText,
        Operator::ShowText(b"kept".to_vec()),
        Operator::EndText,
    ])
    .unwrap();
    assert_eq!(blocks, vec![TextBlock::new(0.0, 0.0, "kept")]);
}

#[test]
fn test_uncommitted_tail_not_emitted() {
    let blocks = run(&[
        Operator::BeginText,
        Operator::ShowText(b"a".to_vec()),
        Operator::EndText,
        Operator::BeginText,
        Operator::ShowText(b"dangling".to_vec()),
    ])
    .unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].text, "a");
}

#[test]
fn test_blocks_in_stream_order() {
    let blocks = run(&[
        Operator::BeginText,
        Operator::SetTextMatrix([1.0, 0.0, 0.0, 1.0, 0.0, 1.0]),
        Operator::ShowText(b"first".to_vec()),
        Operator::EndText,
        Operator::BeginText,
        Operator::SetTextMatrix([1.0, 0.0, 0.0, 1.0, 0.0, 2.0]),
        Operator::ShowText(b"second".to_vec()),
        Operator::EndText,
    ])
    .unwrap();
    assert_eq!(blocks[0].text, "first");
    assert_eq!(blocks[1].text, "second");
}

#[test]
fn test_spaced_text_decodes_through_encoding() {
    let blocks = run(&[
        Operator::BeginText,
        Operator::ShowSpacedText(vec![
            SpacedRun {
                codes: vec![0x48, 0x92],
                adjust: -250.0,
            },
            SpacedRun {
                codes: vec![0xE9],
                adjust: 0.0,
            },
        ]),
        Operator::EndText,
    ])
    .unwrap();
    // Adjustments change spacing, not text content.
    assert_eq!(blocks[0].text, "H\u{2019}é");
}

#[test]
fn test_show_text_carries_bytes_verbatim() {
    let blocks = run(&[
        Operator::BeginText,
        Operator::ShowText(vec![0x48, 0xE9]),
        Operator::EndText,
    ])
    .unwrap();
    assert_eq!(blocks[0].text, "H\u{E9}");
}

#[test]
fn test_leading_and_graphics_operators_ignored() {
    let blocks = run(&[
        Operator::BeginText,
        Operator::TextMoveSetLeading(0.0, -14.0),
        Operator::Other(folio_core::parser::lexer::Keyword::Cm),
        Operator::ShowText(b"x".to_vec()),
        Operator::EndText,
    ])
    .unwrap();
    assert_eq!(blocks[0].text, "x");
}

#[test]
fn test_winansi_font_selection_accepted() {
    let blocks = run(&[
        Operator::BeginText,
        Operator::SetFont {
            font: "F1".into(),
            size: 12.0,
        },
        Operator::ShowText(b"ok".to_vec()),
        Operator::EndText,
    ])
    .unwrap();
    assert_eq!(blocks[0].text, "ok");
}

#[test]
fn test_composite_font_rejected() {
    let mut fonts = winansi_fonts();
    fonts.insert(
        "F2",
        Font::Composite {
            basefont: Some("Noto-Identity-H".into()),
        },
    );
    let err = extract_text_blocks(
        &[
            Operator::BeginText,
            Operator::SetFont {
                font: "F2".into(),
                size: 10.0,
            },
            Operator::EndText,
        ],
        &fonts,
        win_ansi(),
    )
    .unwrap_err();
    assert!(matches!(err, ExtractError::UnsupportedFont(_)));
}

#[test]
fn test_non_winansi_simple_font_rejected() {
    let mut fonts = FontMap::new();
    fonts.insert(
        "F1",
        Font::Simple(SimpleFont {
            basefont: None,
            encoding: Some(SimpleEncoding::MacRoman),
        }),
    );
    let err = extract_text_blocks(
        &[Operator::SetFont {
            font: "F1".into(),
            size: 8.0,
        }],
        &fonts,
        win_ansi(),
    )
    .unwrap_err();
    assert!(matches!(err, ExtractError::UnsupportedFont(_)));
}

#[test]
fn test_missing_font_rejected() {
    let err = run(&[Operator::SetFont {
        font: "F9".into(),
        size: 8.0,
    }])
    .unwrap_err();
    assert!(matches!(err, ExtractError::UnsupportedFont(_)));
}

#[test]
fn test_move_show_operators_abort() {
    for op in [
        Operator::MoveShowText(b"x".to_vec()),
        Operator::MoveSetShowText {
            word_space: 1.0,
            char_space: 1.0,
            text: b"x".to_vec(),
        },
        Operator::ShowSpaceGlyph,
    ] {
        let err = run(&[Operator::BeginText, op]).unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedOperator(_)));
    }
}

#[test]
fn test_error_discards_committed_blocks() {
    // A block was already committed, but the later failure still makes
    // the whole pass return nothing.
    let result = run(&[
        Operator::BeginText,
        Operator::ShowText(b"done".to_vec()),
        Operator::EndText,
        Operator::BeginText,
        Operator::MoveShowText(b"x".to_vec()),
    ]);
    assert!(result.is_err());
}

#[test]
fn test_empty_input() {
    assert!(run(&[]).unwrap().is_empty());
}
