//! Font dictionaries, reduced to what extraction needs to know: whether a
//! font is simple or composite, and which base encoding it declares.

use crate::document::catalog::PDFDocument;
use crate::error::Result;
use crate::model::objects::PDFObject;
use std::collections::HashMap;

/// Base encodings a simple font can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimpleEncoding {
    Standard,
    MacRoman,
    MacExpert,
    WinAnsi,
}

impl SimpleEncoding {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "StandardEncoding" => Some(Self::Standard),
            "MacRomanEncoding" => Some(Self::MacRoman),
            "MacExpertEncoding" => Some(Self::MacExpert),
            "WinAnsiEncoding" => Some(Self::WinAnsi),
            _ => None,
        }
    }
}

/// A simple (single-byte) font.
///
/// `encoding` is None when the font relies on its built-in encoding, names
/// an encoding we do not model, or customizes the table with /Differences.
/// All of those are indistinguishable for our purposes: the code-to-char
/// mapping is not the plain WinAnsi table, so the font is unusable.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleFont {
    pub basefont: Option<String>,
    pub encoding: Option<SimpleEncoding>,
}

/// A font resource.
#[derive(Debug, Clone, PartialEq)]
pub enum Font {
    Simple(SimpleFont),
    /// Type0 composite font. Carried so selection can report what it
    /// refused.
    Composite { basefont: Option<String> },
}

/// The page's font resources, keyed by the names used in Tf operands.
#[derive(Debug, Clone, Default)]
pub struct FontMap {
    fonts: HashMap<String, Font>,
}

impl FontMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the map from a page's resource dictionary.
    ///
    /// A missing /Font entry yields an empty map; any Tf against it then
    /// fails at selection time rather than here.
    pub fn from_resources(
        doc: &PDFDocument,
        resources: &HashMap<String, PDFObject>,
    ) -> Result<Self> {
        let mut fonts = HashMap::new();
        if let PDFObject::Dict(font_dict) = doc.resolve_entry(resources, "Font")? {
            for (name, value) in &font_dict {
                if let PDFObject::Dict(attrs) = doc.resolve(value)? {
                    fonts.insert(name.clone(), parse_font(doc, &attrs)?);
                }
            }
        }
        Ok(Self { fonts })
    }

    pub fn get(&self, name: &str) -> Option<&Font> {
        self.fonts.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, font: Font) {
        self.fonts.insert(name.into(), font);
    }
}

fn parse_font(doc: &PDFDocument, attrs: &HashMap<String, PDFObject>) -> Result<Font> {
    let basefont = attrs
        .get("BaseFont")
        .and_then(|b| b.as_name().ok())
        .map(str::to_string);

    let subtype = attrs.get("Subtype").and_then(|s| s.as_name().ok());
    if subtype == Some("Type0") {
        return Ok(Font::Composite { basefont });
    }

    let encoding = match doc.resolve_entry(attrs, "Encoding")? {
        PDFObject::Name(name) => SimpleEncoding::from_name(&name),
        PDFObject::Dict(enc) => {
            if enc.contains_key("Differences") {
                // A patched table is no longer the base encoding.
                None
            } else {
                match doc.resolve_entry(&enc, "BaseEncoding")? {
                    PDFObject::Name(name) => SimpleEncoding::from_name(&name),
                    _ => None,
                }
            }
        }
        _ => None,
    };

    Ok(Font::Simple(SimpleFont { basefont, encoding }))
}
