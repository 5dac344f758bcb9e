//! # RDS Basic Character Set Translation
//!
//! PS, RadioText, PTYN and LPS/eRT text fields are transmitted using the
//! RDS "G0" basic character set (EN 50067 Annex E), which is ASCII-compatible
//! for the large majority of printable positions but substitutes a handful
//! of code points (notably in the 0x00-0x1F and 0x80-0xFF ranges) with
//! characters ASCII does not define there.
//!
//! This module only needs the encode direction: given a `char`, produce the
//! single-byte G0 code, falling back to `b'?'` for anything the basic set
//! cannot represent (callers needing the full repertoire enable RDS2 eRT,
//! which is UTF-8 and bypasses this table).

/// Encodes one Unicode scalar value into the RDS G0 basic character set.
/// ASCII printable characters map through unchanged; everything else that
/// has no G0 representation becomes `b'?'` (0x3F).
pub fn encode_g0(c: char) -> u8 {
    match c {
        ' '..='~' => c as u8,
        // A handful of Latin-1 supplement characters that EN 50067 Annex E
        // places in the G0 table's upper half, at positions ASCII leaves
        // undefined there.
        '\u{00E1}' => 0xB4, // a acute
        '\u{00E0}' => 0xB5, // a grave
        '\u{00E9}' => 0xB9, // e acute
        '\u{00E8}' => 0xBA, // e grave
        '\u{00ED}' => 0xBE, // i acute
        '\u{00F3}' => 0xD8, // o acute
        '\u{00F2}' => 0xD9, // o grave
        '\u{00FA}' => 0xE3, // u acute
        '\u{00F9}' => 0xE4, // u grave
        '\u{00F1}' => 0xD1, // n tilde
        '\u{00E7}' => 0xE8, // c cedilla
        _ => b'?',
    }
}

/// Encodes a string into a fixed-length G0 byte buffer, space-padding or
/// truncating to `len`.
pub fn encode_str_fixed(s: &str, len: usize) -> Vec<u8> {
    let mut out: Vec<u8> = s.chars().map(encode_g0).collect();
    out.resize(len, b' ');
    out.truncate(len);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_passes_through() {
        assert_eq!(encode_g0('A'), b'A');
        assert_eq!(encode_g0('0'), b'0');
        assert_eq!(encode_g0(' '), b' ');
    }

    #[test]
    fn unrepresentable_becomes_question_mark() {
        assert_eq!(encode_g0('\u{4E2D}'), b'?');
    }

    #[test]
    fn fixed_width_pads_and_truncates() {
        assert_eq!(encode_str_fixed("AB", 4), vec![b'A', b'B', b' ', b' ']);
        assert_eq!(encode_str_fixed("ABCDEF", 4), vec![b'A', b'B', b'C', b'D']);
    }
}
