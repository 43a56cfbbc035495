//! The scanner library (component B, §6): byte-level recognizers consumed by
//! the line classifier and the tokenizer. Each `scan_*` function takes the
//! remaining source starting at a candidate position and returns the byte
//! length of the longest match, or `0` for no match -- the same contract the
//! spec assigns to the external scanner library, just implemented in-crate
//! rather than pulled in from a separate dependency.

use crate::charclass::{is_alphanumeric, is_digit, is_whitespace};

fn line_end(bytes: &[u8]) -> usize {
    memchr::memchr(b'\n', bytes).map(|i| i + 1).unwrap_or(bytes.len())
}

fn rest_of_line_is_blank(bytes: &[u8]) -> bool {
    bytes.iter().take_while(|&&b| b != b'\n').all(|&b| is_whitespace(b))
}

fn count_leading_spaces(bytes: &[u8], max: usize) -> usize {
    bytes.iter().take(max).take_while(|&&b| b == b' ').count()
}

/// Matches a fenced-code opening line: up to 3 leading spaces, a run of 3+
/// backticks, then an info string (anything but a backtick) to end of line.
pub fn scan_fence_start(bytes: &[u8]) -> usize {
    let indent = count_leading_spaces(bytes, 3);
    let rest = &bytes[indent..];
    let ticks = rest.iter().take_while(|&&b| b == b'`').count();
    if ticks < 3 {
        return 0;
    }
    let info = &rest[ticks..];
    if info.iter().take_while(|&&b| b != b'\n').any(|&b| b == b'`') {
        return 0;
    }
    indent + ticks + line_end(info)
}

/// Matches a bare fenced-code closing line: up to 3 leading spaces, a run of
/// 3+ backticks, then only whitespace to end of line.
pub fn scan_fence_end(bytes: &[u8]) -> usize {
    let indent = count_leading_spaces(bytes, 3);
    let rest = &bytes[indent..];
    let ticks = rest.iter().take_while(|&&b| b == b'`').count();
    if ticks < 3 {
        return 0;
    }
    let trailing = &rest[ticks..];
    if !rest_of_line_is_blank(trailing) {
        return 0;
    }
    indent + ticks + line_end(trailing)
}

const HTML_BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "base", "basefont", "blockquote", "body", "caption", "center",
    "col", "colgroup", "dd", "details", "dialog", "dir", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "frame", "frameset", "h1", "h2", "h3", "h4", "h5",
    "h6", "head", "header", "hr", "html", "iframe", "legend", "li", "link", "main", "menu",
    "menuitem", "nav", "noframes", "ol", "optgroup", "option", "p", "param", "section", "summary",
    "table", "tbody", "td", "tfoot", "th", "thead", "title", "tr", "track", "ul", "pre", "script",
    "style",
];

fn match_tag_name(bytes: &[u8]) -> Option<(&str, usize)> {
    let end = bytes
        .iter()
        .position(|&b| !(b.is_ascii_alphanumeric() || b == b'-'))
        .unwrap_or(bytes.len());
    if end == 0 {
        return None;
    }
    let name = std::str::from_utf8(&bytes[..end]).ok()?;
    let lower = name.to_ascii_lowercase();
    HTML_BLOCK_TAGS
        .iter()
        .find(|tag| **tag == lower)
        .map(|tag| (*tag, end))
}

/// Matches the start of an HTML block (CommonMark types 2-4 and 6): HTML
/// comments, processing instructions, declarations, CDATA sections, or a
/// known block-level tag open/close. Returns the length of the recognized
/// opening construct, not the whole block.
pub fn scan_html_block(bytes: &[u8]) -> usize {
    if bytes.first() != Some(&b'<') {
        return 0;
    }
    let rest = &bytes[1..];

    if rest.starts_with(b"!--") {
        return 4;
    }
    if rest.starts_with(b"?") {
        return 2;
    }
    if rest.starts_with(b"![CDATA[") {
        return 9;
    }
    if let Some(&c) = rest.first() {
        if c == b'!' && rest.get(1).is_some_and(|b| b.is_ascii_alphabetic()) {
            return 2;
        }
    }

    let closing = rest.first() == Some(&b'/');
    let name_start = if closing { 1 } else { 0 };
    match match_tag_name(&rest[name_start..]) {
        Some((_, len)) => 1 + name_start + len,
        None => 0,
    }
}

/// Matches a single-line HTML construct (CommonMark type 7): one complete
/// open or close tag for any tag name, alone on the line aside from
/// trailing whitespace.
pub fn scan_html_line(bytes: &[u8]) -> usize {
    if bytes.first() != Some(&b'<') {
        return 0;
    }
    let rest = &bytes[1..];
    let closing = rest.first() == Some(&b'/');
    let name_start = if closing { 1 } else { 0 };
    let after_name = &rest[name_start..];
    let name_len = after_name
        .iter()
        .position(|&b| !(b.is_ascii_alphanumeric() || b == b'-'))
        .unwrap_or(after_name.len());
    if name_len == 0 {
        return 0;
    }
    let mut pos = 1 + name_start + name_len;
    // Skip to the closing '>' of the tag, ignoring attribute contents.
    while pos < bytes.len() && bytes[pos] != b'>' && bytes[pos] != b'\n' {
        pos += 1;
    }
    if bytes.get(pos) != Some(&b'>') {
        return 0;
    }
    pos += 1;
    if !rest_of_line_is_blank(&bytes[pos..]) {
        return 0;
    }
    pos + line_end(&bytes[pos..])
}

/// Matches an absolute URL (`scheme://...`) at the start of the slice. Used
/// by the line classifier to avoid misreading a bare URL as a metadata key.
pub fn scan_url(bytes: &[u8]) -> usize {
    let scheme_end = bytes
        .iter()
        .position(|&b| !(b.is_ascii_alphanumeric() || b == b'+' || b == b'.' || b == b'-'))
        .unwrap_or(0);
    if scheme_end == 0 || !bytes[0].is_ascii_alphabetic() {
        return 0;
    }
    if !bytes[scheme_end..].starts_with(b"://") {
        return 0;
    }
    let mut end = scheme_end + 3;
    while end < bytes.len() && bytes[end] != b'\n' && !bytes[end].is_ascii_whitespace() {
        end += 1;
    }
    end
}

/// Matches a metadata key: a run of letters, digits, spaces, underscores, and
/// dashes, not including the terminating colon. Returns the key length only.
pub fn scan_meta_key(bytes: &[u8]) -> usize {
    let len = bytes
        .iter()
        .take_while(|&&b| b != b':' && b != b'\n' && (is_alphanumeric(b) || matches!(b, b' ' | b'_' | b'-')))
        .count();
    if len == 0 || bytes.get(len) != Some(&b':') {
        return 0;
    }
    // A meta key must start with a letter and not be entirely whitespace.
    if !bytes[0].is_ascii_alphabetic() {
        return 0;
    }
    len
}

/// Matches a whole metadata line: `key: value` to end of line.
pub fn scan_meta_line(bytes: &[u8]) -> usize {
    let key_len = scan_meta_key(bytes);
    if key_len == 0 {
        return 0;
    }
    line_end(bytes)
}

fn scan_bracket_label(bytes: &[u8], open: u8) -> Option<usize> {
    if bytes.first() != Some(&b'[') {
        return None;
    }
    let mut i = 1;
    if open != b'[' {
        if bytes.get(1) != Some(&open) {
            return None;
        }
        i = 2;
    }
    let label_start = i;
    while i < bytes.len() && bytes[i] != b']' && bytes[i] != b'\n' {
        i += 1;
    }
    if bytes.get(i) != Some(&b']') || i == label_start {
        return None;
    }
    Some(i + 1)
}

/// Matches a reference-link definition: `[label]:` followed by a destination
/// and optional quoted title, ending at the line's end.
pub fn scan_ref_link(bytes: &[u8]) -> usize {
    let after_label = match scan_bracket_label(bytes, b'[') {
        Some(n) => n,
        None => return 0,
    };
    scan_ref_definition_tail(bytes, after_label)
}

/// Compatibility variant: identical destination/title grammar, but never
/// followed by indented attribute continuation lines (callers simply don't
/// look for them in compatibility mode).
pub fn scan_ref_link_no_attributes(bytes: &[u8]) -> usize {
    scan_ref_link(bytes)
}

pub fn scan_ref_citation(bytes: &[u8]) -> usize {
    let after_label = match scan_bracket_label(bytes, b'#') {
        Some(n) => n,
        None => return 0,
    };
    scan_ref_definition_tail(bytes, after_label)
}

pub fn scan_ref_foot(bytes: &[u8]) -> usize {
    let after_label = match scan_bracket_label(bytes, b'^') {
        Some(n) => n,
        None => return 0,
    };
    scan_ref_definition_tail(bytes, after_label)
}

fn scan_ref_definition_tail(bytes: &[u8], after_label: usize) -> usize {
    if bytes.get(after_label) != Some(&b':') {
        return 0;
    }
    let mut i = after_label + 1;
    while bytes.get(i).is_some_and(|&b| is_whitespace(b)) {
        i += 1;
    }
    if i >= bytes.len() || bytes[i] == b'\n' {
        return 0;
    }
    line_end(bytes)
}

/// Matches `1-2`-style digit-dash-digit context for [`crate::kind::TokenKind::DashN`]
/// smart-dash disambiguation: true if both neighbors of the single `-` at
/// `pos` in `bytes` are ASCII digits.
pub fn is_digit_dash_digit(bytes: &[u8], pos: usize) -> bool {
    pos > 0
        && pos + 1 < bytes.len()
        && is_digit(bytes[pos - 1])
        && is_digit(bytes[pos + 1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fence_start_requires_three_backticks() {
        assert_eq!(scan_fence_start(b"``\n"), 0);
        assert_eq!(scan_fence_start(b"```rust\n"), 8);
        assert_eq!(scan_fence_start(b"   ```\n"), 7);
    }

    #[test]
    fn fence_end_rejects_info_string() {
        assert_eq!(scan_fence_end(b"```\n"), 4);
        assert_eq!(scan_fence_end(b"``` \n"), 5);
        assert_eq!(scan_fence_end(b"```rust\n"), 0);
    }

    #[test]
    fn html_block_recognizes_known_tags_and_comments() {
        assert!(scan_html_block(b"<div>\n") > 0);
        assert!(scan_html_block(b"<!-- hi -->\n") > 0);
        assert_eq!(scan_html_block(b"<span>not block-level\n"), 0);
    }

    #[test]
    fn meta_line_requires_letter_prefixed_key() {
        assert!(scan_meta_line(b"Title: My Doc\n") > 0);
        assert_eq!(scan_meta_line(b"1: nope\n"), 0);
    }

    #[test]
    fn ref_link_matches_label_and_destination() {
        assert!(scan_ref_link(b"[foo]: /url\n") > 0);
        assert_eq!(scan_ref_link(b"[foo]:\n"), 0);
    }
}
