//! PDF object parser - converts tokens to PDF objects.

use crate::error::{ExtractError, Result};
use crate::model::objects::{PDFObjRef, PDFObject};
use crate::parser::lexer::{Keyword, PSBaseParser, PSToken};
use std::collections::HashMap;

/// Parses PDF object syntax on top of the tokenizer, handling indirect
/// references (`num num R`) with token lookahead.
pub struct PDFParser<'a> {
    base: PSBaseParser<'a>,
    /// Lookahead buffer for tokens
    lookahead: Vec<PSToken>,
}

impl<'a> PDFParser<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            base: PSBaseParser::new(data),
            lookahead: Vec::new(),
        }
    }

    /// Get remaining unparsed data.
    pub fn remaining(&self) -> &[u8] {
        self.base.remaining()
    }

    fn next_token(&mut self) -> Result<Option<PSToken>> {
        if let Some(tok) = self.lookahead.pop() {
            return Ok(Some(tok));
        }
        match self.base.next_token() {
            Some(Ok((_, tok))) => Ok(Some(tok)),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }

    fn push_back(&mut self, tok: PSToken) {
        self.lookahead.push(tok);
    }

    /// Parse next PDF object
    pub fn parse_object(&mut self) -> Result<PDFObject> {
        let token = self.next_token()?.ok_or(ExtractError::UnexpectedEof)?;
        self.token_to_object(token)
    }

    fn token_to_object(&mut self, token: PSToken) -> Result<PDFObject> {
        match token {
            PSToken::Int(n) => {
                // Could be start of indirect reference: objid genno R
                if let Ok(Some(tok2)) = self.next_token() {
                    if let PSToken::Int(m) = tok2 {
                        if let Ok(Some(tok3)) = self.next_token() {
                            if tok3 == PSToken::Keyword(Keyword::R) {
                                return Ok(PDFObject::Ref(PDFObjRef::new(n as u32, m as u32)));
                            }
                            self.push_back(tok3);
                        }
                        self.push_back(PSToken::Int(m));
                    } else {
                        self.push_back(tok2);
                    }
                }
                Ok(PDFObject::Int(n))
            }
            PSToken::Real(n) => Ok(PDFObject::Real(n)),
            PSToken::Bool(b) => Ok(PDFObject::Bool(b)),
            PSToken::Literal(s) => Ok(PDFObject::Name(s)),
            PSToken::String(s) => Ok(PDFObject::String(s)),
            PSToken::Keyword(kw) => match kw {
                Keyword::Null => Ok(PDFObject::Null),
                Keyword::ArrayStart => self.parse_array(),
                Keyword::DictStart => self.parse_dict(),
                // Other keywords are errors in object context
                other => Err(ExtractError::TokenError {
                    pos: self.base.tell(),
                    msg: format!(
                        "unexpected keyword: {}",
                        String::from_utf8_lossy(other.as_bytes())
                    ),
                }),
            },
        }
    }

    /// Parse array contents until ]
    fn parse_array(&mut self) -> Result<PDFObject> {
        let mut arr = Vec::new();

        loop {
            let token = self.next_token()?.ok_or(ExtractError::UnexpectedEof)?;
            if token == PSToken::Keyword(Keyword::ArrayEnd) {
                break;
            }
            arr.push(self.token_to_object(token)?);
        }

        Ok(PDFObject::Array(arr))
    }

    /// Parse dict contents until >>
    fn parse_dict(&mut self) -> Result<PDFObject> {
        let mut dict = HashMap::new();

        loop {
            let token = self.next_token()?.ok_or(ExtractError::UnexpectedEof)?;
            if token == PSToken::Keyword(Keyword::DictEnd) {
                break;
            }

            // Key must be a literal name
            let key = match token {
                PSToken::Literal(name) => name,
                _ => {
                    return Err(ExtractError::TokenError {
                        pos: self.base.tell(),
                        msg: "expected name as dict key".into(),
                    });
                }
            };

            let value = self.parse_object()?;
            dict.insert(key, value);
        }

        Ok(PDFObject::Dict(dict))
    }
}
