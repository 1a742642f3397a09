//! Single-byte character encodings.
//!
//! Only WinAnsiEncoding is carried: the extractor refuses any font that
//! declares a different encoding, so one table covers every string that
//! reaches decoding.

use std::sync::LazyLock;

/// A 256-entry code-to-character table for a single-byte encoding.
///
/// Codes the encoding leaves undefined decode to U+FFFD rather than being
/// dropped, so output length always matches input length.
pub struct EncodingTable {
    chars: [char; 256],
}

impl EncodingTable {
    /// Decode one character code.
    pub fn decode(&self, code: u8) -> char {
        self.chars[code as usize]
    }

    /// Decode a byte string.
    pub fn decode_bytes(&self, codes: &[u8]) -> String {
        codes.iter().map(|&c| self.decode(c)).collect()
    }
}

/// WinAnsi codes that differ from Latin-1, per the encoding's code chart.
/// 0x20..=0x7E are ASCII and 0xA1..=0xFF match Latin-1; those ranges are
/// filled programmatically.
const WIN_ANSI_HIGH: &[(u8, char)] = &[
    (0x80, '\u{20AC}'), // Euro
    (0x82, '\u{201A}'), // quotesinglbase
    (0x83, '\u{0192}'), // florin
    (0x84, '\u{201E}'), // quotedblbase
    (0x85, '\u{2026}'), // ellipsis
    (0x86, '\u{2020}'), // dagger
    (0x87, '\u{2021}'), // daggerdbl
    (0x88, '\u{02C6}'), // circumflex
    (0x89, '\u{2030}'), // perthousand
    (0x8A, '\u{0160}'), // Scaron
    (0x8B, '\u{2039}'), // guilsinglleft
    (0x8C, '\u{0152}'), // OE
    (0x8E, '\u{017D}'), // Zcaron
    (0x91, '\u{2018}'), // quoteleft
    (0x92, '\u{2019}'), // quoteright
    (0x93, '\u{201C}'), // quotedblleft
    (0x94, '\u{201D}'), // quotedblright
    (0x95, '\u{2022}'), // bullet
    (0x96, '\u{2013}'), // endash
    (0x97, '\u{2014}'), // emdash
    (0x98, '\u{02DC}'), // tilde
    (0x99, '\u{2122}'), // trademark
    (0x9A, '\u{0161}'), // scaron
    (0x9B, '\u{203A}'), // guilsinglright
    (0x9C, '\u{0153}'), // oe
    (0x9E, '\u{017E}'), // zcaron
    (0x9F, '\u{0178}'), // Ydieresis
    // The code chart maps A0 to space and AD to hyphen, not to their
    // Latin-1 no-break forms.
    (0xA0, ' '),
    (0xAD, '-'),
];

static WIN_ANSI: LazyLock<EncodingTable> = LazyLock::new(|| {
    let mut chars = ['\u{FFFD}'; 256];
    for code in 0x20..=0x7E {
        chars[code] = code as u8 as char;
    }
    for code in 0xA1..=0xFF {
        chars[code] = char::from_u32(code as u32).unwrap();
    }
    for &(code, ch) in WIN_ANSI_HIGH {
        chars[code as usize] = ch;
    }
    EncodingTable { chars }
});

/// The WinAnsiEncoding table.
pub fn win_ansi() -> &'static EncodingTable {
    &WIN_ANSI
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_range_is_identity() {
        let enc = win_ansi();
        assert_eq!(enc.decode(b'A'), 'A');
        assert_eq!(enc.decode(b' '), ' ');
        assert_eq!(enc.decode(0x7E), '~');
    }

    #[test]
    fn test_high_range_specials() {
        let enc = win_ansi();
        assert_eq!(enc.decode(0x80), '€');
        assert_eq!(enc.decode(0x92), '\u{2019}');
        assert_eq!(enc.decode(0x9F), 'Ÿ');
        assert_eq!(enc.decode(0xE9), 'é');
    }

    #[test]
    fn test_undefined_codes_decode_to_replacement() {
        let enc = win_ansi();
        for code in [0x00u8, 0x1F, 0x7F, 0x81, 0x8D, 0x8F, 0x90, 0x9D] {
            assert_eq!(enc.decode(code), '\u{FFFD}', "code {code:#04x}");
        }
    }

    #[test]
    fn test_space_and_hyphen_overrides() {
        let enc = win_ansi();
        assert_eq!(enc.decode(0xA0), ' ');
        assert_eq!(enc.decode(0xAD), '-');
    }

    #[test]
    fn test_decode_bytes_preserves_length() {
        let enc = win_ansi();
        let input = [0x48, 0x00, 0x69];
        assert_eq!(enc.decode_bytes(&input), "H\u{FFFD}i");
    }
}
