//! Content-stream parser.
//!
//! Turns the decoded bytes of a page's content streams into the typed
//! [`Operator`] sequence consumed by the interpreter. Operands accumulate
//! until an operator keyword is reached; text operators get fully typed
//! construction (with strict operand checking), everything else is preserved
//! as [`Operator::Other`].

use crate::error::{ExtractError, Result};
use crate::parser::lexer::{Keyword, PSBaseParser, PSToken};

/// One run of a spaced-show (TJ) sequence: character codes followed by a
/// positioning adjustment in thousandths of text space.
#[derive(Debug, Clone, PartialEq)]
pub struct SpacedRun {
    pub codes: Vec<u8>,
    pub adjust: f64,
}

/// A decoded content-stream operator.
///
/// Text-bearing operators are fully typed; every other operator in the
/// grammar is carried as `Other` and has no effect on extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    /// BT - begin text object
    BeginText,
    /// ET - end text object
    EndText,
    /// Tm - set text matrix [a b c d e f]
    SetTextMatrix([f64; 6]),
    /// Tf - select font and size
    SetFont { font: String, size: f64 },
    /// Tj - show a string
    ShowText(Vec<u8>),
    /// TJ - show strings with individual positioning
    ShowSpacedText(Vec<SpacedRun>),
    /// Td - move to start of next line
    TextMove(f64, f64),
    /// TD - move to start of next line and set leading
    TextMoveSetLeading(f64, f64),
    /// T* - move to start of next line using current leading
    TextNextLine,
    /// ' - move to next line and show a string
    MoveShowText(Vec<u8>),
    /// " - set word/char spacing, move to next line, show a string
    MoveSetShowText {
        word_space: f64,
        char_space: f64,
        text: Vec<u8>,
    },
    /// Glyph-positioned show. Emitted by content producers that address
    /// glyphs directly; never constructed by this parser.
    ShowSpaceGlyph,
    /// Any other operator in the grammar (graphics state, paths, color,
    /// marked content, ...)
    Other(Keyword),
}

/// Content-stream operand: the subset of object syntax that appears between
/// operators.
#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Int(i64),
    Real(f64),
    Bool(bool),
    Name(String),
    String(Vec<u8>),
    Array(Vec<Operand>),
    Dict,
}

impl Operand {
    fn as_num(&self) -> Option<f64> {
        match self {
            Operand::Int(n) => Some(*n as f64),
            Operand::Real(n) => Some(*n),
            _ => None,
        }
    }
}

/// Parse a page's decoded content streams into operators.
///
/// Multiple streams are treated as one continuous stream, separated by
/// whitespace as the page dictionary semantics require.
pub fn parse_content(streams: &[Vec<u8>]) -> Result<Vec<Operator>> {
    let data = streams.join(&b'\n');
    parse_content_bytes(&data)
}

fn parse_content_bytes(data: &[u8]) -> Result<Vec<Operator>> {
    let mut parser = PSBaseParser::new(data);
    let mut ops = Vec::new();
    let mut operands: Vec<Operand> = Vec::new();
    let mut context_stack: Vec<Vec<Operand>> = Vec::new();

    while let Some(result) = parser.next_token() {
        let (pos, token) = result.map_err(|e| ExtractError::OperatorParse(e.to_string()))?;

        let kw = match token {
            PSToken::Int(n) => {
                operands.push(Operand::Int(n));
                continue;
            }
            PSToken::Real(n) => {
                operands.push(Operand::Real(n));
                continue;
            }
            PSToken::Bool(b) => {
                operands.push(Operand::Bool(b));
                continue;
            }
            PSToken::Literal(s) => {
                operands.push(Operand::Name(s));
                continue;
            }
            PSToken::String(s) => {
                operands.push(Operand::String(s));
                continue;
            }
            PSToken::Keyword(kw) => kw,
        };

        match kw {
            Keyword::ArrayStart => {
                context_stack.push(std::mem::take(&mut operands));
            }
            Keyword::ArrayEnd => {
                let contents = std::mem::take(&mut operands);
                operands = context_stack.pop().ok_or_else(|| {
                    ExtractError::OperatorParse(format!("unbalanced ] at {pos}"))
                })?;
                operands.push(Operand::Array(contents));
            }
            Keyword::DictStart => {
                context_stack.push(std::mem::take(&mut operands));
            }
            Keyword::DictEnd => {
                // Dict operands only appear on marked-content and inline
                // image operators, none of which carry text; keep a marker
                // so arity stays observable.
                operands = context_stack.pop().ok_or_else(|| {
                    ExtractError::OperatorParse(format!("unbalanced >> at {pos}"))
                })?;
                operands.push(Operand::Dict);
            }
            Keyword::BI => {
                skip_inline_image(&mut parser);
                operands.clear();
                ops.push(Operator::Other(Keyword::BI));
            }
            kw => {
                ops.push(build_operator(kw, std::mem::take(&mut operands), pos)?);
            }
        }
    }

    Ok(ops)
}

/// Construct a typed operator from a keyword and its operand stack.
fn build_operator(kw: Keyword, operands: Vec<Operand>, pos: usize) -> Result<Operator> {
    let arity_err =
        |what: &str| ExtractError::OperatorParse(format!("malformed {what} operands at {pos}"));

    let op = match kw {
        Keyword::BT => Operator::BeginText,
        Keyword::ET => Operator::EndText,
        Keyword::Tm => {
            if operands.len() != 6 {
                return Err(arity_err("Tm"));
            }
            let mut m = [0.0; 6];
            for (slot, operand) in m.iter_mut().zip(&operands) {
                *slot = operand.as_num().ok_or_else(|| arity_err("Tm"))?;
            }
            Operator::SetTextMatrix(m)
        }
        Keyword::Tf => match operands.as_slice() {
            [Operand::Name(font), size] => Operator::SetFont {
                font: font.clone(),
                size: size.as_num().ok_or_else(|| arity_err("Tf"))?,
            },
            _ => return Err(arity_err("Tf")),
        },
        Keyword::Tj => match operands.as_slice() {
            [Operand::String(s)] => Operator::ShowText(s.clone()),
            _ => return Err(arity_err("Tj")),
        },
        Keyword::TJ => match operands.as_slice() {
            [Operand::Array(items)] => Operator::ShowSpacedText(build_spaced_runs(items)),
            _ => return Err(arity_err("TJ")),
        },
        Keyword::Td => match operands.as_slice() {
            [dx, dy] => Operator::TextMove(
                dx.as_num().ok_or_else(|| arity_err("Td"))?,
                dy.as_num().ok_or_else(|| arity_err("Td"))?,
            ),
            _ => return Err(arity_err("Td")),
        },
        Keyword::TD => match operands.as_slice() {
            [dx, dy] => Operator::TextMoveSetLeading(
                dx.as_num().ok_or_else(|| arity_err("TD"))?,
                dy.as_num().ok_or_else(|| arity_err("TD"))?,
            ),
            _ => return Err(arity_err("TD")),
        },
        Keyword::TStar => Operator::TextNextLine,
        Keyword::Quote => match operands.as_slice() {
            [Operand::String(s)] => Operator::MoveShowText(s.clone()),
            _ => return Err(arity_err("'")),
        },
        Keyword::DoubleQuote => match operands.as_slice() {
            [aw, ac, Operand::String(s)] => Operator::MoveSetShowText {
                word_space: aw.as_num().ok_or_else(|| arity_err("\""))?,
                char_space: ac.as_num().ok_or_else(|| arity_err("\""))?,
                text: s.clone(),
            },
            _ => return Err(arity_err("\"")),
        },
        other => Operator::Other(other),
    };

    Ok(op)
}

/// Build spaced runs from a TJ array. A string starts a new run; numbers
/// accumulate onto the preceding run's adjustment. Non-conforming entries
/// are skipped, matching the leniency of viewers.
fn build_spaced_runs(items: &[Operand]) -> Vec<SpacedRun> {
    let mut runs: Vec<SpacedRun> = Vec::new();
    for item in items {
        match item {
            Operand::String(s) => runs.push(SpacedRun {
                codes: s.clone(),
                adjust: 0.0,
            }),
            Operand::Int(_) | Operand::Real(_) => {
                let adjust = item.as_num().unwrap_or(0.0);
                match runs.last_mut() {
                    Some(run) => run.adjust += adjust,
                    None => runs.push(SpacedRun {
                        codes: Vec::new(),
                        adjust,
                    }),
                }
            }
            _ => {}
        }
    }
    runs
}

/// Skip inline image data: consume tokens until ID, then raw-scan for the
/// EI marker (the data between ID and EI is unstructured binary).
fn skip_inline_image(parser: &mut PSBaseParser<'_>) {
    while let Some(result) = parser.next_token() {
        match result {
            Ok((_, PSToken::Keyword(Keyword::ID))) => break,
            Ok(_) => {}
            Err(_) => return,
        }
    }

    let base = parser.tell();
    let target = {
        let remaining = parser.remaining();
        let mut target = remaining.len();
        let mut i = 0;
        while i + 2 < remaining.len() {
            if remaining[i].is_ascii_whitespace()
                && &remaining[i + 1..i + 3] == b"EI"
                && remaining
                    .get(i + 3)
                    .is_none_or(|&b| b.is_ascii_whitespace())
            {
                target = i + 3;
                break;
            }
            i += 1;
        }
        target
    };
    parser.set_pos(base + target);
}
