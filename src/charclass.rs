//! ASCII-only byte classification shared by the scanner library and the
//! ambidextrous-assignment pass.
//!
//! The design is deliberately byte-oriented (§9 design notes): multi-byte
//! UTF-8 sequences are opaque `TEXT_PLAIN` as far as these predicates are
//! concerned, and every boundary check here operates on a single byte. Do not
//! upgrade these to a codepoint-aware crate; that would silently change
//! behavior at UTF-8 continuation bytes relative to the reference semantics.

#[inline]
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t')
}

#[inline]
pub fn is_line_ending_byte(b: u8) -> bool {
    matches!(b, b'\n' | b'\r')
}

#[inline]
pub fn is_whitespace_or_line_ending(b: u8) -> bool {
    is_whitespace(b) || is_line_ending_byte(b)
}

#[inline]
pub fn is_punctuation(b: u8) -> bool {
    matches!(
        b,
        b'!' | b'"'
            | b'#'
            | b'$'
            | b'%'
            | b'&'
            | b'\''
            | b'('
            | b')'
            | b'*'
            | b'+'
            | b','
            | b'-'
            | b'.'
            | b'/'
            | b':'
            | b';'
            | b'<'
            | b'='
            | b'>'
            | b'?'
            | b'@'
            | b'['
            | b'\\'
            | b']'
            | b'^'
            | b'_'
            | b'`'
            | b'{'
            | b'|'
            | b'}'
            | b'~'
    )
}

#[inline]
pub fn is_whitespace_or_line_ending_or_punctuation(b: u8) -> bool {
    is_whitespace_or_line_ending(b) || is_punctuation(b)
}

#[inline]
pub fn is_alphanumeric(b: u8) -> bool {
    b.is_ascii_alphanumeric()
}

#[inline]
pub fn is_digit(b: u8) -> bool {
    b.is_ascii_digit()
}

/// Byte at `pos`, or a sentinel whitespace byte (`\n`) when `pos` is out of
/// range. Several reference rules peek one byte past a token and rely on
/// "end of buffer behaves like whitespace"; this centralizes that so callers
/// don't each need a bounds check.
#[inline]
pub fn byte_at_or_boundary(bytes: &[u8], pos: usize) -> u8 {
    if pos < bytes.len() {
        bytes[pos]
    } else {
        b'\n'
    }
}
