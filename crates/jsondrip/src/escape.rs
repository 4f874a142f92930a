//! Decoding of JSON string escape sequences.

use crate::error::DecodeError;

/// Maps the character after a backslash to its decoded form, for the
/// single-character escapes of RFC 8259.
pub(crate) fn short_escape(c: char) -> Option<char> {
    match c {
        '"' => Some('"'),
        '\\' => Some('\\'),
        '/' => Some('/'),
        'b' => Some('\u{0008}'),
        'f' => Some('\u{000C}'),
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        _ => None,
    }
}

/// Decodes exactly four hexadecimal digits into a code unit.
pub(crate) fn parse_hex4(digits: &str) -> Result<u32, DecodeError> {
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(DecodeError::BadUnicodeEscape);
    }
    u32::from_str_radix(digits, 16).map_err(|_| DecodeError::BadUnicodeEscape)
}

pub(crate) fn is_high_surrogate(code: u32) -> bool {
    (0xD800..=0xDBFF).contains(&code)
}

pub(crate) fn is_low_surrogate(code: u32) -> bool {
    (0xDC00..=0xDFFF).contains(&code)
}

/// Combines a UTF-16 surrogate pair into the scalar it encodes.
pub(crate) fn combine_surrogates(high: u32, low: u32) -> Result<char, DecodeError> {
    if !is_high_surrogate(high) || !is_low_surrogate(low) {
        return Err(DecodeError::BadUnicodeEscape);
    }
    let scalar = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
    char::from_u32(scalar).ok_or(DecodeError::BadUnicodeEscape)
}
