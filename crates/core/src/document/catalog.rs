//! PDF document loader.
//!
//! Locates the cross-reference information (traditional tables, xref
//! streams, or a brute-force scan when both are damaged), resolves indirect
//! objects on demand, and decodes stream data through the filter chain.

use crate::error::{ExtractError, Result};
use crate::model::objects::{PDFObjRef, PDFObject, PDFStream};
use crate::parser::lexer::{Keyword, PSBaseParser, PSToken};
use crate::parser::pdf_parser::PDFParser;
use bytes::Bytes;
use flate2::read::{DeflateDecoder, ZlibDecoder};
use regex::bytes::Regex;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::sync::LazyLock;

/// How far from the end of the file we look for `startxref`.
const STARTXREF_WINDOW: usize = 4096;

/// Maximum indirect reference chain length before giving up.
const MAX_RESOLVE_DEPTH: usize = 32;

static OBJ_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u)(\d+)\s+(\d+)\s+obj\b").unwrap());

/// Where an object lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum XRefEntry {
    /// Byte offset of `N G obj` in the file.
    Offset(usize),
    /// Stored inside an object stream, at the given index.
    InStream { stream_objid: u32, index: usize },
}

/// A loaded PDF document.
///
/// Holds the raw file bytes plus the merged cross-reference map. Objects
/// are parsed lazily through [`PDFDocument::getobj`] and cached.
pub struct PDFDocument {
    data: Bytes,
    xref: HashMap<u32, XRefEntry>,
    /// Trailer dictionaries, newest first.
    trailers: Vec<HashMap<String, PDFObject>>,
    cache: RefCell<HashMap<u32, PDFObject>>,
    /// Ids currently being parsed; re-entry means a reference cycle.
    loading: RefCell<HashSet<u32>>,
}

impl PDFDocument {
    /// Load a document from raw file bytes.
    ///
    /// Follows the startxref chain; if the chain is absent or damaged,
    /// falls back to scanning the whole file for object headers.
    pub fn new(data: impl Into<Bytes>) -> Result<Self> {
        let mut doc = Self {
            data: data.into(),
            xref: HashMap::new(),
            trailers: Vec::new(),
            cache: RefCell::new(HashMap::new()),
            loading: RefCell::new(HashSet::new()),
        };

        let loaded = match doc.find_startxref() {
            Some(start) => doc.load_xref_chain(start).is_ok(),
            None => false,
        };
        if !loaded || !doc.trailers.iter().any(|t| t.contains_key("Root")) {
            doc.xref.clear();
            doc.trailers.clear();
            doc.load_xref_fallback()?;
        }

        if doc.trailers.iter().any(|t| t.contains_key("Encrypt")) {
            return Err(ExtractError::DocumentRead(
                "encrypted documents are not supported".into(),
            ));
        }

        Ok(doc)
    }

    /// The document catalog (the dictionary the trailer's /Root points to).
    pub fn catalog(&self) -> Result<HashMap<String, PDFObject>> {
        for trailer in &self.trailers {
            if let Some(root) = trailer.get("Root") {
                let obj = self.resolve(root)?;
                return Ok(obj.as_dict()?.clone());
            }
        }
        Err(ExtractError::DocumentRead("no /Root in trailer".into()))
    }

    /// Fetch an object by id, parsing and caching it on first use.
    pub fn getobj(&self, objid: u32) -> Result<PDFObject> {
        if let Some(obj) = self.cache.borrow().get(&objid) {
            return Ok(obj.clone());
        }
        let entry = *self
            .xref
            .get(&objid)
            .ok_or(ExtractError::ObjectNotFound(objid))?;
        // The cache is only written after parsing completes, so a cycle
        // (e.g. a stream whose /Length points back at itself) would
        // otherwise recurse through parse until the stack runs out.
        if !self.loading.borrow_mut().insert(objid) {
            return Err(ExtractError::DocumentRead(format!(
                "circular reference to object {objid}"
            )));
        }
        let result = match entry {
            XRefEntry::Offset(pos) => self.parse_object_at(pos),
            XRefEntry::InStream {
                stream_objid,
                index,
            } => self.parse_object_from_stream(stream_objid, index),
        };
        self.loading.borrow_mut().remove(&objid);
        let obj = result?;
        self.cache.borrow_mut().insert(objid, obj.clone());
        Ok(obj)
    }

    /// Follow indirect references until a direct object is reached.
    pub fn resolve(&self, obj: &PDFObject) -> Result<PDFObject> {
        let mut current = obj.clone();
        for _ in 0..MAX_RESOLVE_DEPTH {
            match current {
                PDFObject::Ref(r) => current = self.getobj(r.objid)?,
                other => return Ok(other),
            }
        }
        Err(ExtractError::DocumentRead(
            "indirect reference chain too deep".into(),
        ))
    }

    /// Resolve a dictionary entry, treating a missing key as Null.
    pub fn resolve_entry(
        &self,
        dict: &HashMap<String, PDFObject>,
        key: &str,
    ) -> Result<PDFObject> {
        match dict.get(key) {
            Some(obj) => self.resolve(obj),
            None => Ok(PDFObject::Null),
        }
    }

    // ---- xref loading ----------------------------------------------------

    fn find_startxref(&self) -> Option<usize> {
        let tail_start = self.data.len().saturating_sub(STARTXREF_WINDOW);
        let tail = &self.data[tail_start..];
        let pos = tail
            .windows(b"startxref".len())
            .rposition(|w| w == b"startxref")?;
        let mut lexer = PSBaseParser::new(&tail[pos + b"startxref".len()..]);
        match lexer.next_token() {
            Some(Ok((_, PSToken::Int(n)))) if n >= 0 => Some(n as usize),
            _ => None,
        }
    }

    /// Walk the xref chain from `start`, merging sections newest-first.
    fn load_xref_chain(&mut self, start: usize) -> Result<()> {
        let mut queue = vec![start];
        let mut visited = HashSet::new();

        while let Some(offset) = queue.pop() {
            if !visited.insert(offset) || offset >= self.data.len() {
                continue;
            }

            let (entries, trailer) = if self.data[offset..].starts_with(b"xref") {
                self.load_traditional_xref(offset)?
            } else {
                self.load_xref_stream(offset)?
            };

            for (objid, entry) in entries {
                // Newer sections shadow older ones.
                self.xref.entry(objid).or_insert(entry);
            }

            if let Some(prev) = trailer.get("Prev").and_then(|o| o.as_int().ok()) {
                queue.push(prev as usize);
            }
            // Hybrid-reference files carry a parallel xref stream.
            if let Some(stm) = trailer.get("XRefStm").and_then(|o| o.as_int().ok()) {
                queue.push(stm as usize);
            }
            self.trailers.push(trailer);
        }

        if self.xref.is_empty() {
            return Err(ExtractError::NoValidXRef);
        }
        Ok(())
    }

    /// Parse a traditional `xref` table and its trailer dictionary.
    fn load_traditional_xref(
        &self,
        offset: usize,
    ) -> Result<(Vec<(u32, XRefEntry)>, HashMap<String, PDFObject>)> {
        let mut lexer = PSBaseParser::new(&self.data[offset..]);
        match lexer.next_token() {
            Some(Ok((_, PSToken::Keyword(Keyword::Xref)))) => {}
            _ => return Err(ExtractError::NoValidXRef),
        }

        let mut entries = Vec::new();
        loop {
            let start = match lexer.next_token() {
                Some(Ok((_, PSToken::Int(n)))) => n as u32,
                Some(Ok((_, PSToken::Keyword(Keyword::Trailer)))) => break,
                _ => return Err(ExtractError::NoValidXRef),
            };
            let count = match lexer.next_token() {
                Some(Ok((_, PSToken::Int(n)))) if n >= 0 => n as usize,
                _ => return Err(ExtractError::NoValidXRef),
            };
            for i in 0..count {
                let pos = match lexer.next_token() {
                    Some(Ok((_, PSToken::Int(n)))) if n >= 0 => n as usize,
                    _ => return Err(ExtractError::NoValidXRef),
                };
                // Generation number, unused beyond syntax.
                match lexer.next_token() {
                    Some(Ok((_, PSToken::Int(_)))) => {}
                    _ => return Err(ExtractError::NoValidXRef),
                }
                let in_use = match lexer.next_token() {
                    Some(Ok((_, PSToken::Keyword(Keyword::Unknown(kw))))) => match kw.as_slice() {
                        b"n" => true,
                        b"f" => false,
                        _ => return Err(ExtractError::NoValidXRef),
                    },
                    _ => return Err(ExtractError::NoValidXRef),
                };
                if in_use {
                    let objid = start
                        .checked_add(i as u32)
                        .ok_or(ExtractError::NoValidXRef)?;
                    entries.push((objid, XRefEntry::Offset(pos)));
                }
            }
        }

        let mut parser = PDFParser::new(lexer.remaining());
        let trailer = parser.parse_object()?.as_dict()?.clone();
        Ok((entries, trailer))
    }

    /// Parse a cross-reference stream (PDF 1.5+).
    fn load_xref_stream(
        &self,
        offset: usize,
    ) -> Result<(Vec<(u32, XRefEntry)>, HashMap<String, PDFObject>)> {
        let obj = self.parse_object_at(offset)?;
        let stream = obj.as_stream()?;
        let attrs = stream.attrs.clone();

        let widths: Vec<usize> = attrs
            .get("W")
            .ok_or(ExtractError::NoValidXRef)?
            .as_array()?
            .iter()
            .map(|w| w.as_int().map(|n| n as usize))
            .collect::<Result<_>>()?;
        if widths.len() != 3 {
            return Err(ExtractError::NoValidXRef);
        }
        let row_len: usize = widths.iter().sum();
        if row_len == 0 {
            return Err(ExtractError::NoValidXRef);
        }

        let size = attrs
            .get("Size")
            .ok_or(ExtractError::NoValidXRef)?
            .as_int()? as u32;
        let index: Vec<i64> = match attrs.get("Index") {
            Some(obj) => obj
                .as_array()?
                .iter()
                .map(|n| n.as_int())
                .collect::<Result<_>>()?,
            None => vec![0, i64::from(size)],
        };

        let data = self.decode_stream(stream)?;
        let mut entries = Vec::new();
        let mut rows = data.chunks_exact(row_len);

        for range in index.chunks_exact(2) {
            let (first, count) = (range[0] as u32, range[1] as u32);
            let last = first.checked_add(count).ok_or(ExtractError::NoValidXRef)?;
            for objid in first..last {
                let Some(row) = rows.next() else { break };
                let mut fields = [0u64; 3];
                let mut pos = 0;
                for (field, &width) in fields.iter_mut().zip(&widths) {
                    for &b in &row[pos..pos + width] {
                        *field = (*field << 8) | u64::from(b);
                    }
                    pos += width;
                }
                // A zero-width type field defaults to type 1.
                let ftype = if widths[0] == 0 { 1 } else { fields[0] };
                match ftype {
                    1 => entries.push((objid, XRefEntry::Offset(fields[1] as usize))),
                    2 => entries.push((
                        objid,
                        XRefEntry::InStream {
                            stream_objid: fields[1] as u32,
                            index: fields[2] as usize,
                        },
                    )),
                    _ => {} // type 0: free
                }
            }
        }

        Ok((entries, attrs))
    }

    /// Last resort: scan the whole file for `N G obj` headers and any
    /// trailer dictionaries. Later definitions win, matching incremental
    /// update semantics.
    fn load_xref_fallback(&mut self) -> Result<()> {
        for caps in OBJ_PATTERN.captures_iter(&self.data) {
            let whole = caps.get(0).unwrap();
            // Guard against matching inside a stream body: the header must
            // start at a line boundary or the file start.
            let at = whole.start();
            if at > 0 && !self.data[at - 1].is_ascii_whitespace() {
                continue;
            }
            let Some(objid) = std::str::from_utf8(&caps[1])
                .ok()
                .and_then(|s| s.parse::<u32>().ok())
            else {
                continue;
            };
            self.xref.insert(objid, XRefEntry::Offset(at));
        }
        if self.xref.is_empty() {
            return Err(ExtractError::NoValidXRef);
        }

        // Recover trailers so /Root (and /Encrypt) stay visible.
        let mut search = 0;
        while let Some(rel) = find_subslice(&self.data[search..], b"trailer") {
            let pos = search + rel + b"trailer".len();
            let mut parser = PDFParser::new(&self.data[pos..]);
            if let Ok(PDFObject::Dict(d)) = parser.parse_object() {
                self.trailers.push(d);
            }
            search = pos;
        }

        if !self.trailers.iter().any(|t| t.contains_key("Root")) {
            self.synthesize_root()?;
        }
        Ok(())
    }

    /// No trailer survived: find the catalog by type and fabricate a
    /// trailer pointing at it.
    fn synthesize_root(&mut self) -> Result<()> {
        let ids: Vec<u32> = self.xref.keys().copied().collect();
        for objid in ids {
            let Ok(obj) = self.getobj(objid) else {
                continue;
            };
            if let PDFObject::Dict(d) = &obj
                && d.get("Type").and_then(|t| t.as_name().ok()) == Some("Catalog")
            {
                let mut trailer = HashMap::new();
                trailer.insert("Root".into(), PDFObject::Ref(PDFObjRef::new(objid, 0)));
                self.trailers.push(trailer);
                return Ok(());
            }
        }
        Err(ExtractError::DocumentRead(
            "no document catalog found".into(),
        ))
    }

    // ---- object parsing --------------------------------------------------

    /// Parse the indirect object whose `N G obj` header starts at `offset`.
    fn parse_object_at(&self, offset: usize) -> Result<PDFObject> {
        if offset >= self.data.len() {
            return Err(ExtractError::DocumentRead(format!(
                "object offset {offset} beyond end of file"
            )));
        }
        let region = &self.data[offset..];
        let mut lexer = PSBaseParser::new(region);
        for expected in ["object id", "generation"] {
            match lexer.next_token() {
                Some(Ok((_, PSToken::Int(_)))) => {}
                _ => {
                    return Err(ExtractError::TokenError {
                        pos: offset + lexer.tell(),
                        msg: format!("expected {expected} in object header"),
                    });
                }
            }
        }
        match lexer.next_token() {
            Some(Ok((_, PSToken::Keyword(Keyword::Obj)))) => {}
            _ => {
                return Err(ExtractError::TokenError {
                    pos: offset + lexer.tell(),
                    msg: "expected obj keyword".into(),
                });
            }
        }

        let body = &region[lexer.tell()..];
        let mut parser = PDFParser::new(body);
        let obj = parser.parse_object()?;

        // A dict followed by the stream keyword is a stream object.
        let PDFObject::Dict(attrs) = obj else {
            return Ok(obj);
        };
        let after = parser.remaining();
        let trimmed = skip_ws(after);
        if !trimmed.starts_with(b"stream") {
            return Ok(PDFObject::Dict(attrs));
        }

        let mut data_start = b"stream".len();
        if trimmed[data_start..].starts_with(b"\r\n") {
            data_start += 2;
        } else if trimmed[data_start..].starts_with(b"\n") {
            data_start += 1;
        }
        let body = &trimmed[data_start..];

        let length = match attrs.get("Length") {
            Some(obj) => self.resolve(obj).and_then(|o| o.as_int()).ok(),
            None => None,
        };
        let rawdata = match length {
            Some(n) if n >= 0 && (n as usize) <= body.len() => body[..n as usize].to_vec(),
            // Damaged or indirect-and-unresolvable /Length: scan for the
            // endstream marker instead.
            _ => {
                let mut end = find_subslice(body, b"endstream").ok_or_else(|| {
                    ExtractError::DocumentRead("stream without endstream".into())
                })?;
                while end > 0 && (body[end - 1] == b'\n' || body[end - 1] == b'\r') {
                    end -= 1;
                }
                body[..end].to_vec()
            }
        };

        Ok(PDFObject::Stream(Box::new(PDFStream::new(attrs, rawdata))))
    }

    /// Fetch an object stored inside an object stream (/Type /ObjStm).
    fn parse_object_from_stream(&self, stream_objid: u32, index: usize) -> Result<PDFObject> {
        let container = self.getobj(stream_objid)?;
        let stream = container.as_stream()?;
        let n = self
            .resolve_entry(&stream.attrs, "N")?
            .as_int()
            .map_err(|_| ExtractError::DocumentRead("object stream missing /N".into()))?
            as usize;
        let first = self
            .resolve_entry(&stream.attrs, "First")?
            .as_int()
            .map_err(|_| ExtractError::DocumentRead("object stream missing /First".into()))?
            as usize;
        if index >= n {
            return Err(ExtractError::DocumentRead(format!(
                "object stream index {index} out of range ({n} objects)"
            )));
        }

        let data = self.decode_stream(stream)?;

        // Header: N pairs of (objid, offset relative to /First).
        let mut lexer = PSBaseParser::new(&data);
        let mut offsets = Vec::with_capacity(n);
        for _ in 0..n {
            let (Some(Ok((_, PSToken::Int(_)))), Some(Ok((_, PSToken::Int(off))))) =
                (lexer.next_token(), lexer.next_token())
            else {
                return Err(ExtractError::DocumentRead(
                    "malformed object stream header".into(),
                ));
            };
            offsets.push(off as usize);
        }

        let start = first + offsets[index];
        if start > data.len() {
            return Err(ExtractError::DocumentRead(
                "object stream offset out of range".into(),
            ));
        }
        PDFParser::new(&data[start..]).parse_object()
    }

    // ---- stream decoding -------------------------------------------------

    /// Decode stream data through its filter chain.
    ///
    /// Only FlateDecode is supported; anything else is a decode error.
    pub fn decode_stream(&self, stream: &PDFStream) -> Result<Vec<u8>> {
        let filters = match self.resolve_entry(&stream.attrs, "Filter")? {
            PDFObject::Null => Vec::new(),
            PDFObject::Name(name) => vec![name],
            PDFObject::Array(arr) => arr
                .iter()
                .map(|f| Ok(self.resolve(f)?.as_name()?.to_string()))
                .collect::<Result<_>>()?,
            other => {
                return Err(ExtractError::ContentDecode(format!(
                    "bad /Filter entry: {other:?}"
                )));
            }
        };
        let parms = match self.resolve_entry(&stream.attrs, "DecodeParms")? {
            PDFObject::Dict(d) => vec![Some(d)],
            PDFObject::Array(arr) => arr
                .iter()
                .map(|p| match self.resolve(p)? {
                    PDFObject::Dict(d) => Ok(Some(d)),
                    _ => Ok(None),
                })
                .collect::<Result<_>>()?,
            _ => Vec::new(),
        };

        let mut data = stream.get_rawdata().to_vec();
        for (i, filter) in filters.iter().enumerate() {
            match filter.as_str() {
                "FlateDecode" | "Fl" => {
                    data = inflate(&data)?;
                    if let Some(Some(parm)) = parms.get(i) {
                        data = self.apply_predictor(parm, data)?;
                    }
                }
                other => {
                    return Err(ExtractError::ContentDecode(format!(
                        "unsupported filter: {other}"
                    )));
                }
            }
        }
        Ok(data)
    }

    fn apply_predictor(
        &self,
        parms: &HashMap<String, PDFObject>,
        data: Vec<u8>,
    ) -> Result<Vec<u8>> {
        let predictor = self
            .resolve_entry(parms, "Predictor")?
            .as_int()
            .unwrap_or(1);
        if predictor <= 1 {
            return Ok(data);
        }
        if predictor < 10 {
            return Err(ExtractError::ContentDecode(format!(
                "unsupported predictor: {predictor}"
            )));
        }
        let columns = self.resolve_entry(parms, "Columns")?.as_int().unwrap_or(1) as usize;
        let colors = self.resolve_entry(parms, "Colors")?.as_int().unwrap_or(1) as usize;
        let bpc = self
            .resolve_entry(parms, "BitsPerComponent")?
            .as_int()
            .unwrap_or(8) as usize;
        apply_png_predictor(columns, colors, bpc, &data)
    }
}

/// Inflate zlib data, tolerating truncated streams and missing zlib
/// headers (both occur in real files).
fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut decoder = ZlibDecoder::new(data);
    match decoder.read_to_end(&mut out) {
        Ok(_) => return Ok(out),
        Err(_) if !out.is_empty() => return Ok(out),
        Err(_) => {}
    }

    let mut out = Vec::new();
    let mut decoder = DeflateDecoder::new(data);
    match decoder.read_to_end(&mut out) {
        Ok(_) => Ok(out),
        Err(_) if !out.is_empty() => Ok(out),
        Err(e) => Err(ExtractError::ContentDecode(format!("inflate failed: {e}"))),
    }
}

/// Reverse PNG row filters (predictors 10-15 share this form).
fn apply_png_predictor(columns: usize, colors: usize, bpc: usize, data: &[u8]) -> Result<Vec<u8>> {
    let bpp = (colors * bpc).div_ceil(8).max(1);
    let row_len = (columns * colors * bpc).div_ceil(8);
    if row_len == 0 || data.len() % (row_len + 1) != 0 {
        return Err(ExtractError::ContentDecode(
            "predictor row size mismatch".into(),
        ));
    }

    let mut out = Vec::with_capacity(data.len());
    let mut prev = vec![0u8; row_len];
    for chunk in data.chunks_exact(row_len + 1) {
        let (ftype, row) = (chunk[0], &chunk[1..]);
        let mut line = row.to_vec();
        match ftype {
            0 => {}
            1 => {
                for i in bpp..row_len {
                    line[i] = line[i].wrapping_add(line[i - bpp]);
                }
            }
            2 => {
                for i in 0..row_len {
                    line[i] = line[i].wrapping_add(prev[i]);
                }
            }
            3 => {
                for i in 0..row_len {
                    let left = if i >= bpp { line[i - bpp] } else { 0 };
                    let avg = ((u16::from(left) + u16::from(prev[i])) / 2) as u8;
                    line[i] = line[i].wrapping_add(avg);
                }
            }
            4 => {
                for i in 0..row_len {
                    let a = if i >= bpp { line[i - bpp] } else { 0 };
                    let b = prev[i];
                    let c = if i >= bpp { prev[i - bpp] } else { 0 };
                    line[i] = line[i].wrapping_add(paeth(a, b, c));
                }
            }
            other => {
                return Err(ExtractError::ContentDecode(format!(
                    "unknown PNG filter type: {other}"
                )));
            }
        }
        out.extend_from_slice(&line);
        prev = line;
    }
    Ok(out)
}

fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let (a, b, c) = (i16::from(a), i16::from(b), i16::from(c));
    let p = a + b - c;
    let (pa, pb, pc) = ((p - a).abs(), (p - b).abs(), (p - c).abs());
    if pa <= pb && pa <= pc {
        a as u8
    } else if pb <= pc {
        b as u8
    } else {
        c as u8
    }
}

fn skip_ws(data: &[u8]) -> &[u8] {
    let start = data
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(data.len());
    &data[start..]
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_predictor_up_rows() {
        // Two rows, filter type 2 (up), 3 columns of 8-bit gray.
        let data = [2u8, 1, 2, 3, 2, 1, 1, 1];
        let out = apply_png_predictor(3, 1, 8, &data).unwrap();
        assert_eq!(out, vec![1, 2, 3, 2, 3, 4]);
    }

    #[test]
    fn test_png_predictor_rejects_ragged_data() {
        let data = [0u8, 1, 2];
        assert!(apply_png_predictor(3, 1, 8, &data).is_err());
    }

    #[test]
    fn test_inflate_zlib_roundtrip() {
        use flate2::Compression;
        use flate2::write::ZlibEncoder;
        use std::io::Write;

        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(b"BT /F1 12 Tf ET").unwrap();
        let packed = enc.finish().unwrap();
        assert_eq!(inflate(&packed).unwrap(), b"BT /F1 12 Tf ET");
    }
}
