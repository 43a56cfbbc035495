//! Tokenizer (component C, §4.1): a deterministic maximal-munch scanner that
//! turns a byte buffer into a flat chain of line tokens, each holding its
//! inline atoms as children.

use crate::kind::TokenKind;
use crate::token::{TokenArena, TokenId};

/// Byte is the start of some special atom, so a plain-text run must stop
/// here. Kept as a fast path so long runs of prose don't pay per-character
/// dispatch overhead.
#[inline]
fn is_significant(b: u8) -> bool {
    matches!(
        b,
        b'\n' | b'['
            | b']'
            | b'('
            | b')'
            | b'<'
            | b'>'
            | b'{'
            | b'}'
            | b'`'
            | b'$'
            | b'*'
            | b'_'
            | b'^'
            | b'~'
            | b'\''
            | b'"'
            | b'#'
            | b'|'
            | b'+'
            | b'-'
            | b'!'
            | b'.'
    )
}

fn run_length(bytes: &[u8], pos: usize, b: u8) -> usize {
    bytes[pos..].iter().take_while(|&&c| c == b).count()
}

/// Scans one inline atom starting at `pos`. `in_leading_indent` is true while
/// only indent/non-indent-space atoms have been produced for the current
/// line so far; it governs the indent-token and `TEXT_NUMBER_POSS_LIST`
/// decisions, both only meaningful at the head of a line.
fn scan_atom(bytes: &[u8], pos: usize, in_leading_indent: bool) -> (TokenKind, usize) {
    if pos >= bytes.len() {
        return (TokenKind::TextPlain, 0);
    }

    if in_leading_indent {
        match bytes[pos] {
            b'\t' => return (TokenKind::IndentTab, 1),
            b' ' => {
                let n = run_length(bytes, pos, b' ');
                return if n >= 4 {
                    (TokenKind::IndentSpace, 4)
                } else {
                    (TokenKind::NonIndentSpace, n)
                };
            }
            b'0'..=b'9' => {
                let n = bytes[pos..].iter().take_while(|b| b.is_ascii_digit()).count();
                return (TokenKind::TextNumberPossList, n);
            }
            _ => {}
        }
    }

    match bytes[pos] {
        b'\n' => {
            let hard = pos >= 2 && bytes[pos - 1] == b' ' && bytes[pos - 2] == b' ';
            (if hard { TokenKind::TextLinebreak } else { TokenKind::TextNl }, 1)
        }
        b'-' => {
            let n = run_length(bytes, pos, b'-');
            (if n >= 3 { TokenKind::DashM } else { TokenKind::DashN }, n)
        }
        b'[' => {
            if bytes[pos..].starts_with(b"[#") {
                (TokenKind::BracketCitationLeft, 2)
            } else if bytes[pos..].starts_with(b"[^") {
                (TokenKind::BracketFootnoteLeft, 2)
            } else if bytes[pos..].starts_with(b"[%") {
                (TokenKind::BracketVariableLeft, 2)
            } else {
                (TokenKind::BracketLeft, 1)
            }
        }
        b'!' if bytes[pos..].starts_with(b"![") => (TokenKind::BracketImageLeft, 2),
        b']' => (TokenKind::BracketRight, 1),
        b'(' => (TokenKind::ParenLeft, 1),
        b')' => (TokenKind::ParenRight, 1),
        b'<' if bytes[pos..].starts_with(b"<<}") => (TokenKind::CriticComClose, 3),
        b'<' => (TokenKind::AngleLeft, 1),
        b'>' => (TokenKind::AngleRight, 1),
        b'{' => {
            if bytes[pos..].starts_with(b"{++") {
                (TokenKind::CriticAddOpen, 3)
            } else if bytes[pos..].starts_with(b"{--") {
                (TokenKind::CriticDelOpen, 3)
            } else if bytes[pos..].starts_with(b"{>>") {
                (TokenKind::CriticComOpen, 3)
            } else if bytes[pos..].starts_with(b"{==") {
                (TokenKind::CriticHiOpen, 3)
            } else if bytes[pos..].starts_with(b"{~~") {
                (TokenKind::CriticSubOpen, 3)
            } else if bytes[pos..].starts_with(b"{{") {
                (TokenKind::BraceDoubleLeft, 2)
            } else {
                (TokenKind::TextPlain, 1)
            }
        }
        b'}' => {
            if bytes[pos..].starts_with(b"}}") {
                (TokenKind::BraceDoubleRight, 2)
            } else {
                (TokenKind::TextPlain, 1)
            }
        }
        b'+' if bytes[pos..].starts_with(b"++}") => (TokenKind::CriticAddClose, 3),
        b'+' => (TokenKind::Plus, 1),
        b'=' if bytes[pos..].starts_with(b"==}") => (TokenKind::CriticHiClose, 3),
        b'`' => (TokenKind::Backtick, run_length(bytes, pos, b'`')),
        b'$' => {
            let n = run_length(bytes, pos, b'$').min(2);
            (
                if n == 2 { TokenKind::MathDollarDouble } else { TokenKind::MathDollarSingle },
                n,
            )
        }
        b'\\' if bytes[pos..].starts_with(b"\\(") => (TokenKind::MathParenOpen, 2),
        b'\\' if bytes[pos..].starts_with(b"\\)") => (TokenKind::MathParenClose, 2),
        b'\\' if bytes[pos..].starts_with(b"\\[") => (TokenKind::MathBracketOpen, 2),
        b'\\' if bytes[pos..].starts_with(b"\\]") => (TokenKind::MathBracketClose, 2),
        b'*' => (TokenKind::Star, 1),
        b'_' => (TokenKind::Ul, 1),
        b'^' => (TokenKind::Superscript, 1),
        b'~' if bytes[pos..].starts_with(b"~~}") => (TokenKind::CriticSubClose, 3),
        b'~' if bytes[pos..].starts_with(b"~>") => (TokenKind::CriticSubDiv, 2),
        b'~' => (TokenKind::Subscript, 1),
        b'\'' => {
            let n = run_length(bytes, pos, b'\'');
            if n >= 2 {
                (TokenKind::QuoteRightAlt, 2)
            } else {
                (TokenKind::QuoteSingle, 1)
            }
        }
        b'"' => (TokenKind::QuoteDouble, 1),
        b'|' => (TokenKind::Pipe, 1),
        b'#' => {
            let n = run_length(bytes, pos, b'#').min(6);
            (hash_kind(n as u8), n)
        }
        _ => {
            let start = pos;
            let mut end = pos;
            while end < bytes.len() && !is_significant(bytes[end]) {
                end += 1;
            }
            if end == start {
                end += 1;
            }
            (TokenKind::TextPlain, end - start)
        }
    }
}

fn hash_kind(n: u8) -> TokenKind {
    match n {
        1 => TokenKind::Hash1,
        2 => TokenKind::Hash2,
        3 => TokenKind::Hash3,
        4 => TokenKind::Hash4,
        5 => TokenKind::Hash5,
        _ => TokenKind::Hash6,
    }
}

/// Produces a root token whose children are line tokens, each line's
/// children covering every byte of that line in order. Lines are left
/// unclassified (`LINE_EMPTY` placeholder kind) until the block grammar
/// driver classifies each one on consumption (§4.2, §4.3) -- tokenizing and
/// classifying are kept as separate passes here even though the reference
/// engine fuses them, since nothing in the data model requires they be
/// fused and keeping them apart lets each be tested independently.
pub fn tokenize(arena: &mut TokenArena, source: &str) -> TokenId {
    let bytes = source.as_bytes();
    let root = arena.alloc(TokenKind::DocStartToken, 0, bytes.len());
    let mut line = arena.alloc(TokenKind::LineEmpty, 0, 0);

    let mut pos = 0usize;
    let mut in_leading_indent = true;

    while pos < bytes.len() {
        let (kind, mut len) = scan_atom(bytes, pos, in_leading_indent);
        if len == 0 {
            len = 1;
        }

        let tok = arena.alloc(kind, pos, len);
        arena.append_child(line, tok);

        if !kind.is_indent() {
            in_leading_indent = false;
        }

        pos += len;

        if kind.is_line_ending() {
            arena.append_child(root, line);
            line = arena.alloc(TokenKind::LineEmpty, pos, 0);
            in_leading_indent = true;
        }
    }

    if arena.get(line).child.is_some() {
        arena.append_child(root, line);
    }

    root
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_kinds(arena: &TokenArena, root: TokenId) -> Vec<Vec<TokenKind>> {
        arena
            .children(root)
            .iter()
            .map(|&line| arena.children(line).iter().map(|&t| arena.get(t).kind).collect())
            .collect()
    }

    #[test]
    fn tokenizes_heading_line() {
        let mut arena = TokenArena::new();
        let root = tokenize(&mut arena, "# Hello\n");
        let lines = line_kinds(&arena, root);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0][0], TokenKind::Hash1);
        assert_eq!(*lines[0].last().unwrap(), TokenKind::TextNl);
    }

    #[test]
    fn tokenizes_trailing_line_without_newline() {
        let mut arena = TokenArena::new();
        let root = tokenize(&mut arena, "abc");
        let lines = line_kinds(&arena, root);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0], vec![TokenKind::TextPlain]);
    }

    #[test]
    fn splits_consecutive_newlines_into_separate_lines() {
        let mut arena = TokenArena::new();
        let root = tokenize(&mut arena, "a\n\nb\n");
        let lines = line_kinds(&arena, root);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], vec![TokenKind::TextNl]);
    }

    #[test]
    fn star_tokens_are_single_characters() {
        let mut arena = TokenArena::new();
        let root = tokenize(&mut arena, "**a**\n");
        let lines = line_kinds(&arena, root);
        assert_eq!(
            lines[0],
            vec![
                TokenKind::Star,
                TokenKind::Star,
                TokenKind::TextPlain,
                TokenKind::Star,
                TokenKind::Star,
                TokenKind::TextNl,
            ]
        );
    }

    #[test]
    fn dash_run_of_three_or_more_is_dash_m() {
        let mut arena = TokenArena::new();
        let root = tokenize(&mut arena, "---\n");
        let lines = line_kinds(&arena, root);
        assert_eq!(lines[0][0], TokenKind::DashM);
    }
}
