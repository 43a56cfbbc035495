//! The line classifier (component D, §4.2): assigns each line token its
//! `LINE_*` type and performs the line-local rewrites the block grammar
//! relies on (marker retyping, whitespace stripping, ATX trailing-hash
//! elision, number/enumerator splitting).

use crate::charclass::is_whitespace;
use crate::engine::Engine;
use crate::kind::TokenKind;
use crate::scanners;
use crate::token::TokenId;

/// Classifies `line` in place, setting its `kind` to a `LINE_*` value and
/// possibly rewriting its children. Mirrors `mmd_assign_line_type`'s
/// decision order exactly; steps are numbered to match §4.2.
pub fn classify(engine: &mut Engine, line: TokenId) {
    if engine.arena.get(line).child.is_none() {
        // 1. No children.
        engine.arena.get_mut(line).kind = TokenKind::LineEmpty;
        return;
    }

    strip_leading_non_indent_space(engine, line);

    let Some(first) = engine.arena.get(line).child else {
        // Stripping the lone leading space emptied the line.
        engine.arena.get_mut(line).kind = TokenKind::LineEmpty;
        return;
    };

    let first_kind = engine.arena.get(first).kind;

    // 2. Leading indent.
    if matches!(first_kind, TokenKind::IndentTab | TokenKind::IndentSpace) {
        if rest_is_blank(engine, first) {
            engine.arena.get_mut(line).kind = TokenKind::LineEmpty;
            engine.allow_meta = false;
        } else {
            engine.arena.get_mut(line).kind = if first_kind == TokenKind::IndentTab {
                TokenKind::LineIndentedTab
            } else {
                TokenKind::LineIndentedSpace
            };
        }
        return;
    }

    match first_kind {
        // 3. ANGLE_LEFT.
        TokenKind::AngleLeft => {
            let bytes = line_bytes(engine, line);
            let kind = if scanners::scan_html_block(&bytes) > 0 {
                TokenKind::LineHtml
            } else {
                TokenKind::LinePlain
            };
            engine.arena.get_mut(line).kind = kind;
        }
        // 4. ANGLE_RIGHT: blockquote marker.
        TokenKind::AngleRight => {
            engine.arena.get_mut(first).kind = TokenKind::MarkerBlockquote;
            engine.arena.get_mut(line).kind = TokenKind::LineBlockquote;
        }
        // 5. BACKTICK: fenced code. Whether a matching bare fence line closes
        // a block is a question only the block grammar driver can answer (it
        // alone knows whether a fence is currently open), so this only ever
        // recognizes an *opening* fence; the driver checks for a close itself
        // via `scanners::scan_fence_end` while `Mode::CodeFenced` is active.
        TokenKind::Backtick => {
            if engine.extensions.contains(crate::extensions::Extensions::COMPATIBILITY) {
                engine.arena.get_mut(line).kind = TokenKind::LinePlain;
                return;
            }
            let bytes = line_bytes(engine, line);
            let kind =
                if scanners::scan_fence_start(&bytes) > 0 { TokenKind::LineFenceBacktickStart } else { TokenKind::LinePlain };
            engine.arena.get_mut(line).kind = kind;
        }
        // 6. ATX headers.
        k if k.is_hash() => {
            let level = k.hash_level().unwrap();
            engine.arena.get_mut(line).kind = TokenKind::atx_line_kind(level);
            engine.arena.get_mut(first).kind = TokenKind::atx_marker_kind(level);
            engine.arena.get_mut(first).len = level as usize;
            elide_trailing_hash_run(engine, line, k);
        }
        // 7. Enumerated list.
        TokenKind::TextNumberPossList => {
            if !try_enumerated_list(engine, line, first) {
                classify_fallthrough(engine, line, first, first_kind);
            }
        }
        TokenKind::DashN | TokenKind::DashM | TokenKind::Star | TokenKind::Ul => {
            // 8. HR-vs-bullet disambiguation.
            if is_thematic_break(engine, line, first, first_kind) {
                engine.arena.get_mut(line).kind = TokenKind::LineHr;
            } else {
                classify_fallthrough(engine, line, first, first_kind);
            }
        }
        TokenKind::Plus => {
            // 9. Bulleted list marker.
            if try_bulleted_list(engine, line, first) {
                // handled
            } else {
                engine.arena.get_mut(line).kind = TokenKind::LinePlain;
            }
        }
        // 10. Blank / hard line break.
        TokenKind::TextNl | TokenKind::TextLinebreak => {
            engine.arena.get_mut(line).kind = TokenKind::LineEmpty;
            engine.allow_meta = false;
        }
        // 11. Reference-link definition.
        TokenKind::BracketLeft => {
            let bytes = line_bytes(engine, line);
            let scan = if engine.extensions.contains(crate::extensions::Extensions::COMPATIBILITY) {
                scanners::scan_ref_link_no_attributes(&bytes)
            } else {
                scanners::scan_ref_link(&bytes)
            };
            engine.arena.get_mut(line).kind =
                if scan > 0 { TokenKind::LineDefLink } else { TokenKind::LinePlain };
        }
        // 12. Citation definition.
        TokenKind::BracketCitationLeft if engine.extensions.notes_enabled() => {
            let bytes = line_bytes(engine, line);
            let scan = scanners::scan_ref_citation(&bytes);
            engine.arena.get_mut(line).kind =
                if scan > 0 { TokenKind::LineDefCitation } else { TokenKind::LinePlain };
        }
        TokenKind::BracketCitationLeft => {
            engine.arena.get_mut(line).kind = TokenKind::LinePlain;
        }
        // 13. Footnote definition.
        TokenKind::BracketFootnoteLeft if engine.extensions.notes_enabled() => {
            let bytes = line_bytes(engine, line);
            let scan = scanners::scan_ref_foot(&bytes);
            engine.arena.get_mut(line).kind =
                if scan > 0 { TokenKind::LineDefFootnote } else { TokenKind::LinePlain };
        }
        TokenKind::BracketFootnoteLeft => {
            engine.arena.get_mut(line).kind = TokenKind::LinePlain;
        }
        // 14. Metadata.
        TokenKind::TextPlain => {
            let compat = engine.extensions.contains(crate::extensions::Extensions::COMPATIBILITY);
            let bytes = line_bytes(engine, line);
            if engine.allow_meta && !compat && scanners::scan_url(&bytes) == 0 {
                let scan = scanners::scan_meta_line(&bytes);
                engine.arena.get_mut(line).kind =
                    if scan > 0 { TokenKind::LineMeta } else { TokenKind::LinePlain };
            } else {
                engine.arena.get_mut(line).kind = TokenKind::LinePlain;
            }
        }
        // 15. Default.
        _ => {
            engine.arena.get_mut(line).kind = TokenKind::LinePlain;
        }
    }

    // Table post-check.
    if engine.arena.get(line).kind == TokenKind::LinePlain {
        let has_pipe = engine
            .arena
            .children(line)
            .iter()
            .any(|&t| engine.arena.get(t).kind == TokenKind::Pipe);
        if has_pipe {
            engine.arena.get_mut(line).kind = TokenKind::LineTable;
        }
    }
}

fn classify_fallthrough(engine: &mut Engine, line: TokenId, first: TokenId, first_kind: TokenKind) {
    if first_kind == TokenKind::Plus {
        unreachable!("PLUS handled by its own arm");
    }
    if first_kind == TokenKind::Ul {
        engine.arena.get_mut(line).kind = TokenKind::LinePlain;
        return;
    }
    // STAR and dashes only continue to the list-bullet check when the first
    // atom has length 1 (a bare marker, not a multi-char run already ruled
    // out as a thematic break).
    if engine.arena.get(first).len == 1 && try_bulleted_list(engine, line, first) {
        return;
    }
    engine.arena.get_mut(line).kind = TokenKind::LinePlain;
}

/// Removes a single leading `NON_INDENT_SPACE`, or a one-character space
/// `TEXT_PLAIN`, from `line`'s children before the decision match runs (§4.2:
/// "after removing one leading `NON_INDENT_SPACE` or a one-character
/// `TEXT_PLAIN` space"). Mirrors `mmd_assign_line_type`'s preamble exactly.
fn strip_leading_non_indent_space(engine: &mut Engine, line: TokenId) {
    let Some(first) = engine.arena.get(line).child else { return };
    let t = engine.arena.get(first);
    let is_lone_space = t.kind == TokenKind::TextPlain && t.len == 1 && engine.source.as_bytes()[t.start] == b' ';
    if t.kind == TokenKind::NonIndentSpace || is_lone_space {
        engine.arena.remove_first_child(line);
    }
}

fn rest_is_blank(engine: &Engine, after: TokenId) -> bool {
    let mut cur = engine.arena.get(after).next;
    while let Some(id) = cur {
        let t = engine.arena.get(id);
        if !matches!(t.kind, TokenKind::TextNl | TokenKind::TextLinebreak)
            && !(t.kind == TokenKind::TextPlain && engine.arena.text(id, &engine.source).bytes().all(is_whitespace))
        {
            return false;
        }
        cur = t.next;
    }
    true
}

pub(crate) fn line_bytes(engine: &Engine, line: TokenId) -> Vec<u8> {
    let Some(first) = engine.arena.get(line).child else { return Vec::new() };
    let start = engine.arena.get(first).start;
    let end = engine.arena.last_child(line).map(|l| engine.arena.get(l).end()).unwrap_or(start);
    engine.source.as_bytes()[start..end].to_vec()
}

fn elide_trailing_hash_run(engine: &mut Engine, line: TokenId, band: TokenKind) {
    let last = engine.arena.last_child(line);
    let Some(last) = last else { return };
    let mut cur = last;
    // Skip a trailing newline/linebreak.
    if matches!(engine.arena.get(cur).kind, TokenKind::TextNl | TokenKind::TextLinebreak) {
        let Some(prev) = engine.arena.get(cur).prev else { return };
        cur = prev;
    }
    if engine.arena.get(cur).kind == band {
        engine.arena.get_mut(cur).kind = TokenKind::TextEmpty;
    }
}

fn try_enumerated_list(engine: &mut Engine, line: TokenId, first: TokenId) -> bool {
    let after_digits = engine.arena.get(first).next;
    let Some(dot) = after_digits else { return false };
    let dot_tok = engine.arena.get(dot);
    if dot_tok.kind != TokenKind::TextPlain || engine.arena.text(dot, &engine.source) != "." {
        return false;
    }
    let after_dot = dot_tok.next;
    let Some(sep) = after_dot else { return false };
    let sep_kind = engine.arena.get(sep).kind;
    let sep_is_space = matches!(sep_kind, TokenKind::TextPlain)
        && engine
            .arena
            .text(sep, &engine.source)
            .as_bytes()
            .first()
            .is_some_and(|&b| is_whitespace(b));
    if !sep_is_space {
        return false;
    }

    engine.arena.get_mut(first).kind = TokenKind::MarkerListEnumerator;
    engine.arena.get_mut(dot).kind = TokenKind::TextEmpty;
    strip_marker_whitespace(engine, dot);
    engine.arena.get_mut(line).kind = TokenKind::LineListEnumerated;
    true
}

fn try_bulleted_list(engine: &mut Engine, line: TokenId, first: TokenId) -> bool {
    let after = engine.arena.get(first).next;
    let Some(after) = after else { return false };
    let t = engine.arena.get(after);
    let starts_space = t.kind == TokenKind::TextPlain
        && engine.arena.text(after, &engine.source).as_bytes().first().is_some_and(|&b| is_whitespace(b));
    if !(t.kind.is_indent() || starts_space) {
        return false;
    }
    engine.arena.get_mut(first).kind = TokenKind::MarkerListBullet;
    strip_marker_whitespace(engine, first);
    engine.arena.get_mut(line).kind = TokenKind::LineListBulleted;
    true
}

/// Strips whitespace between a list marker and its content: trims a leading
/// space off a following `TEXT_PLAIN`, or prunes a run of indent/non-indent
/// space tokens entirely.
fn strip_marker_whitespace(engine: &mut Engine, after: TokenId) {
    let Some(next) = engine.arena.get(after).next else { return };
    let kind = engine.arena.get(next).kind;

    if kind.is_indent() {
        engine.arena.get_mut(next).kind = TokenKind::TextEmpty;
        return;
    }

    if kind == TokenKind::TextPlain {
        let start = engine.arena.get(next).start;
        let end = engine.arena.get(next).end();
        let skip = engine.source.as_bytes()[start..end].iter().take_while(|&&b| is_whitespace(b)).count();
        if skip > 0 {
            engine.arena.get_mut(next).start = start + skip;
            engine.arena.get_mut(next).len -= skip;
        }
    }
}

fn is_thematic_break(engine: &Engine, line: TokenId, first: TokenId, marker: TokenKind) -> bool {
    let mut weight = engine.arena.get(first).len;
    let mut occurrences = 1usize;
    let mut cur = engine.arena.get(first).next;
    while let Some(id) = cur {
        let t = engine.arena.get(id);
        match t.kind {
            k if k == marker => {
                weight += t.len;
                occurrences += 1;
            }
            TokenKind::TextPlain => {
                let text = engine.arena.text(id, &engine.source);
                if text != " " {
                    break;
                }
            }
            TokenKind::TextNl | TokenKind::TextLinebreak => break,
            _ => break,
        }
        cur = t.next;
    }
    let _ = occurrences;
    let _ = line;
    weight > 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::Extensions;

    fn classify_source(src: &str) -> (Engine, TokenId) {
        let mut engine = Engine::create_with_string(src, Extensions::empty());
        let root = crate::lexer::tokenize(&mut engine.arena, &engine.source.clone());
        let first_line = engine.arena.get(root).child.unwrap();
        classify(&mut engine, first_line);
        (engine, first_line)
    }

    #[test]
    fn atx_header_truncates_marker_and_elides_trailing_run() {
        let (engine, line) = classify_source("## Title ##\n");
        assert_eq!(engine.arena.get(line).kind, TokenKind::LineAtx2);
        let first = engine.arena.get(line).child.unwrap();
        assert_eq!(engine.arena.get(first).kind, TokenKind::MarkerH2);
        assert_eq!(engine.arena.get(first).len, 2);
    }

    #[test]
    fn blank_line_disables_metadata() {
        let (engine, _) = classify_source("\n");
        assert!(!engine.allow_meta);
    }

    #[test]
    fn hr_requires_more_than_two_markers() {
        let (engine, line) = classify_source("---\n");
        assert_eq!(engine.arena.get(line).kind, TokenKind::LineHr);

        let (engine2, line2) = classify_source("--\n");
        assert_ne!(engine2.arena.get(line2).kind, TokenKind::LineHr);
    }

    #[test]
    fn enumerated_list_marker_is_retyped() {
        let (engine, line) = classify_source("1. item\n");
        assert_eq!(engine.arena.get(line).kind, TokenKind::LineListEnumerated);
        let first = engine.arena.get(line).child.unwrap();
        assert_eq!(engine.arena.get(first).kind, TokenKind::MarkerListEnumerator);
    }

    #[test]
    fn metadata_line_recognized_when_allowed() {
        let (engine, line) = classify_source("Title: Doc\n");
        assert_eq!(engine.arena.get(line).kind, TokenKind::LineMeta);
    }

    #[test]
    fn plain_line_with_pipe_becomes_table() {
        let (engine, line) = classify_source("a | b\n");
        assert_eq!(engine.arena.get(line).kind, TokenKind::LineTable);
    }

    #[test]
    fn lone_dash_falls_through_to_plain() {
        let (engine, line) = classify_source("-\n");
        assert_eq!(engine.arena.get(line).kind, TokenKind::LinePlain);
    }

    #[test]
    fn leading_non_indent_space_is_stripped_before_atx_check() {
        let (engine, line) = classify_source("  ## Title\n");
        assert_eq!(engine.arena.get(line).kind, TokenKind::LineAtx2);
        let first = engine.arena.get(line).child.unwrap();
        assert_eq!(engine.arena.get(first).kind, TokenKind::MarkerH2);
    }

    #[test]
    fn leading_one_space_text_plain_is_stripped_before_blockquote_check() {
        let (engine, line) = classify_source(" > quoted\n");
        assert_eq!(engine.arena.get(line).kind, TokenKind::LineBlockquote);
    }
}
