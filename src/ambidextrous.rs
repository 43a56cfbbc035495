//! Ambidextrous assignment (§4.4): computes `can_open`/`can_close` for every
//! atom whose kind can act as either a delimiter opener or closer, purely
//! from the surrounding bytes of the source buffer (token boundaries don't
//! matter here since every token's `start`/`len` already indexes the single
//! shared source buffer).

use crate::charclass::{
    byte_at_or_boundary, is_alphanumeric, is_punctuation, is_whitespace_or_line_ending,
    is_whitespace_or_line_ending_or_punctuation,
};
use crate::engine::Engine;
use crate::extensions::Extensions;
use crate::kind::TokenKind;
use crate::token::TokenId;

fn byte_before(bytes: &[u8], pos: usize) -> u8 {
    if pos == 0 {
        b'\n'
    } else {
        bytes[pos - 1]
    }
}

fn byte_after(bytes: &[u8], pos: usize) -> u8 {
    byte_at_or_boundary(bytes, pos)
}

/// Skips backward over a run of `*`/`_` immediately preceding `pos`, then
/// returns the byte before that run (boundary sentinel at start of buffer).
fn skip_star_ul_back(bytes: &[u8], pos: usize) -> u8 {
    let mut i = pos;
    while i > 0 && matches!(bytes[i - 1], b'*' | b'_') {
        i -= 1;
    }
    byte_before(bytes, i)
}

fn skip_star_ul_fwd(bytes: &[u8], pos: usize) -> u8 {
    let mut i = pos;
    while i < bytes.len() && matches!(bytes[i], b'*' | b'_') {
        i += 1;
    }
    byte_after(bytes, i)
}

/// Intraword-emphasis rule for `*` (§4.4): if the base left/right check still
/// leaves both open and close candidates standing, count the `*` run
/// touching the token (`lead`/`lag`) and the `*` run at the boundary of the
/// enclosing word (`pre`/`post`), then disable open/close per the reference's
/// arithmetic identities between those four counts.
fn star_intraword_rule(bytes: &[u8], start: usize, can_open: &mut bool, can_close: &mut bool) {
    if !(*can_open && *can_close) {
        return;
    }

    let mut lead_count: i64 = 0;
    let mut lag_count: i64 = 0;
    let mut pre_count: i64 = 0;
    let mut post_count: i64 = 0;

    if start > 0 {
        let mut offset = start - 1;
        while offset != 0 && bytes[offset] == b'*' {
            lead_count += 1;
            offset -= 1;
        }
        while offset != 0 && !is_whitespace_or_line_ending_or_punctuation(bytes[offset]) {
            offset -= 1;
        }
        loop {
            if bytes[offset] == b'*' {
                pre_count += 1;
                if offset == 0 {
                    break;
                }
                offset -= 1;
            } else {
                break;
            }
        }
    }

    let mut offset = start + 1;
    while offset < bytes.len() && bytes[offset] == b'*' {
        lag_count += 1;
        offset += 1;
    }
    while offset < bytes.len() && !is_whitespace_or_line_ending_or_punctuation(bytes[offset]) {
        offset += 1;
    }
    while offset < bytes.len() && bytes[offset] == b'*' {
        post_count += 1;
        offset += 1;
    }

    if pre_count + post_count > 0 {
        if pre_count + post_count == lead_count + lag_count + 1 {
            if pre_count == post_count {
                *can_open = false;
                *can_close = false;
            } else if pre_count == 0 {
                *can_close = false;
            } else if post_count == 0 {
                *can_open = false;
            }
        } else if pre_count == lead_count + lag_count + 1 + post_count {
            *can_open = false;
        } else if post_count == pre_count + lead_count + lag_count + 1 {
            *can_close = false;
        } else {
            if pre_count != lead_count + lag_count + 1 {
                *can_close = false;
            }
            if post_count != lead_count + lag_count + 1 {
                *can_open = false;
            }
        }
    }
}

/// Walks `root`'s children, descending into the block kinds the contract
/// names, and assigns `can_open`/`can_close` on every ambidextrous atom
/// found in a line's inline children.
pub fn assign(engine: &mut Engine, root: TokenId) {
    let children = engine.arena.children(root);
    for child in children {
        let kind = engine.arena.get(child).kind;

        if kind == TokenKind::BlockMeta && !engine.extensions.metadata_enabled() {
            engine.arena.get_mut(child).kind = TokenKind::BlockPara;
            assign_line_children(engine, child);
            continue;
        }

        let is_line = !matches!(
            kind,
            TokenKind::BlockBlockquote
                | TokenKind::BlockH1
                | TokenKind::BlockH2
                | TokenKind::BlockH3
                | TokenKind::BlockH4
                | TokenKind::BlockH5
                | TokenKind::BlockH6
                | TokenKind::BlockListBulleted
                | TokenKind::BlockListBulletedLoose
                | TokenKind::BlockListEnumerated
                | TokenKind::BlockListEnumeratedLoose
                | TokenKind::BlockListItem
                | TokenKind::BlockListItemTight
                | TokenKind::BlockPara
                | TokenKind::BlockTable
                | TokenKind::BlockCodeIndented
                | TokenKind::BlockCodeFenced
                | TokenKind::BlockHr
                | TokenKind::BlockHtml
                | TokenKind::BlockDefLink
                | TokenKind::BlockDefCitation
                | TokenKind::BlockDefFootnote
                | TokenKind::BlockMeta
                | TokenKind::BlockEmpty
        );

        if is_line {
            assign_atoms(engine, child);
            continue;
        }

        match kind {
            TokenKind::BlockCodeIndented
            | TokenKind::BlockCodeFenced
            | TokenKind::BlockHr
            | TokenKind::BlockHtml
            | TokenKind::BlockDefLink
            | TokenKind::BlockDefCitation
            | TokenKind::BlockDefFootnote
            | TokenKind::BlockMeta
            | TokenKind::BlockEmpty => {}
            _ => assign(engine, child),
        }
    }
}

fn assign_line_children(engine: &mut Engine, block: TokenId) {
    let lines = engine.arena.children(block);
    for line in lines {
        assign_atoms(engine, line);
    }
}

fn assign_atoms(engine: &mut Engine, line: TokenId) {
    let atoms = engine.arena.children(line);
    for atom in atoms {
        let kind = engine.arena.get(atom).kind;
        if !kind.is_ambidextrous() {
            continue;
        }
        assign_one(engine, atom, kind);
    }
}

fn assign_one(engine: &mut Engine, atom: TokenId, kind: TokenKind) {
    let smart = engine.extensions.smart_enabled();
    let compat = engine.extensions.contains(Extensions::COMPATIBILITY);
    let bytes: Vec<u8> = engine.source.as_bytes().to_vec();
    let bytes: &[u8] = &bytes;

    let start = engine.arena.get(atom).start;
    let end = engine.arena.get(atom).end();

    match kind {
        TokenKind::Star => {
            let before = skip_star_ul_back(bytes, start);
            let after = skip_star_ul_fwd(bytes, end);
            let mut can_close = !is_whitespace_or_line_ending(before);
            let mut can_open = !is_whitespace_or_line_ending(after);
            star_intraword_rule(bytes, start, &mut can_open, &mut can_close);
            let t = engine.arena.get_mut(atom);
            t.can_open = can_open;
            t.can_close = can_close;
        }
        TokenKind::Ul => {
            let before_skip = skip_star_ul_back(bytes, start);
            let after_skip = skip_star_ul_fwd(bytes, end);
            let mut can_close = !is_whitespace_or_line_ending_or_punctuation(before_skip);
            let mut can_open = !is_whitespace_or_line_ending_or_punctuation(after_skip);
            if is_alphanumeric(before_skip) {
                can_open = false;
            }
            if is_alphanumeric(after_skip) {
                can_close = false;
            }
            let t = engine.arena.get_mut(atom);
            t.can_open = can_open;
            t.can_close = can_close;
        }
        TokenKind::Backtick => {
            let t = engine.arena.get_mut(atom);
            if t.len == 2 {
                let before = byte_before(bytes, start);
                t.can_close = !(is_whitespace_or_line_ending(before) || is_punctuation(before));
            }
        }
        TokenKind::QuoteSingle => {
            if smart {
                let before = byte_before(bytes, start);
                let after = byte_after(bytes, end);
                let non_ws_punct_before = !is_whitespace_or_line_ending(before) && !is_punctuation(before);
                let non_ws_punct_after = !is_whitespace_or_line_ending(after) && !is_punctuation(after);
                if (non_ws_punct_before && non_ws_punct_after)
                    || (is_punctuation(before) && is_alphanumeric(after))
                {
                    engine.arena.get_mut(atom).kind = TokenKind::Apostrophe;
                }
            }
        }
        TokenKind::QuoteDouble => {
            if smart {
                let before = byte_before(bytes, start);
                let after = byte_after(bytes, end);
                let t = engine.arena.get_mut(atom);
                if start == 0 || is_whitespace_or_line_ending(before) {
                    t.can_close = false;
                }
                if is_whitespace_or_line_ending(after) {
                    t.can_open = false;
                }
            }
        }
        TokenKind::DashN => {
            // `1-2` stays a dash; `a-b` does not (§4.4, "smart" only).
            if smart && engine.arena.get(atom).len == 1 && !crate::scanners::is_digit_dash_digit(bytes, start) {
                engine.arena.get_mut(atom).kind = TokenKind::TextPlain;
            }
        }
        TokenKind::MathDollarSingle | TokenKind::MathDollarDouble => {
            if !compat {
                let before = byte_before(bytes, start);
                let after = byte_after(bytes, end);
                let t = engine.arena.get_mut(atom);
                if is_whitespace_or_line_ending(before) {
                    t.can_close = false;
                }
                if !is_whitespace_or_line_ending(before) && !is_punctuation(before) {
                    t.can_open = false;
                }
                if is_whitespace_or_line_ending(after) {
                    t.can_open = false;
                }
                if !is_whitespace_or_line_ending(after) && !is_punctuation(after) {
                    t.can_close = false;
                }
            }
        }
        TokenKind::Superscript | TokenKind::Subscript => {
            if !compat {
                assign_sup_sub(engine, atom, bytes, start, end);
            }
        }
        TokenKind::CriticSubDiv => {
            let t = engine.arena.get_mut(atom);
            t.len = 1;
            let a = engine.arena.alloc(TokenKind::CriticSubDivA, start, 1);
            let b = engine.arena.alloc(TokenKind::CriticSubDivB, start + 1, 1);
            splice_one_into_two(engine, atom, a, b);
        }
        _ => {}
    }
}

/// Superscript/subscript per §4.4: disabled as open/close in the usual
/// contexts, then if still a candidate opener/closer with no matching
/// delimiter nearby, treated as standalone and made to absorb the adjacent
/// run of non-whitespace-non-punct bytes into its own length (`x^2`).
fn assign_sup_sub(engine: &mut Engine, atom: TokenId, bytes: &[u8], start: usize, end: usize) {
    let before = byte_before(bytes, start);
    let after = byte_after(bytes, end);

    let mut can_open = !is_whitespace_or_line_ending_or_punctuation(before);
    let can_close = !is_whitespace_or_line_ending(before);
    if is_whitespace_or_line_ending_or_punctuation(after) {
        can_open = false;
    }

    if can_open {
        let has_closer_ahead = bytes[end..]
            .iter()
            .take_while(|&&b| !is_whitespace_or_line_ending(b))
            .any(|&b| b == bytes[start]);
        if !has_closer_ahead {
            let absorb = bytes[end..]
                .iter()
                .take_while(|&&b| !is_whitespace_or_line_ending(b) && !is_punctuation(b))
                .count();
            let t = engine.arena.get_mut(atom);
            t.can_open = true;
            t.can_close = false;
            if absorb > 0 {
                t.len += absorb;
                shrink_next_sibling(engine, atom, absorb);
            }
            return;
        }
    }

    let t = engine.arena.get_mut(atom);
    t.can_open = can_open;
    t.can_close = can_close;
}

fn shrink_next_sibling(engine: &mut Engine, atom: TokenId, absorb: usize) {
    if let Some(next) = engine.arena.get(atom).next {
        let n = engine.arena.get(next);
        if matches!(n.kind, TokenKind::TextPlain | TokenKind::TextNumberPossList) {
            engine.arena.get_mut(next).start += absorb;
            engine.arena.get_mut(next).len = engine.arena.get(next).len.saturating_sub(absorb);
        }
    }
}

fn splice_one_into_two(engine: &mut Engine, old: TokenId, a: TokenId, b: TokenId) {
    let prev = engine.arena.get(old).prev;
    let next = engine.arena.get(old).next;
    engine.arena.get_mut(a).prev = prev;
    engine.arena.get_mut(a).next = Some(b);
    engine.arena.get_mut(b).prev = Some(a);
    engine.arena.get_mut(b).next = next;
    if let Some(p) = prev {
        engine.arena.get_mut(p).next = Some(a);
    }
    if let Some(n) = next {
        engine.arena.get_mut(n).prev = Some(b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::Extensions;

    fn build(src: &str, ext: Extensions) -> Engine {
        let mut engine = Engine::create_with_string(src, ext);
        let source = engine.source.clone();
        let root = crate::lexer::tokenize(&mut engine.arena, &source);
        crate::block_grammar::drive(&mut engine, root);
        assign(&mut engine, root);
        engine.root = Some(root);
        engine
    }

    #[test]
    fn intraword_star_pair_opens_then_closes() {
        // `a*b*c`: a single-character prefix and suffix around the run, so
        // `pre_count == 0`/`post_count == 0` disable one flag per star
        // rather than both, giving a valid intraword `*b*` pair.
        let engine = build("a*b*c\n", Extensions::empty());
        let block = engine.arena.children(engine.root.unwrap())[0];
        let line = engine.arena.children(block)[0];
        let atoms = engine.arena.children(line);
        let stars: Vec<_> = atoms.iter().filter(|&&t| engine.arena.get(t).kind == TokenKind::Star).collect();
        assert_eq!(stars.len(), 2);
        let first = engine.arena.get(*stars[0]);
        assert!(first.can_open && !first.can_close);
        let second = engine.arena.get(*stars[1]);
        assert!(!second.can_open && second.can_close);
    }

    #[test]
    fn intraword_star_asymmetric_run_lengths() {
        // `fo*o*bar`: asymmetric word lengths around the run (`pre_count=0,
        // post_count=1`), matching the reference's lead/lag/pre/post
        // arithmetic rather than a naive alphanumeric-neighbor check.
        let engine = build("fo*o*bar\n", Extensions::empty());
        let block = engine.arena.children(engine.root.unwrap())[0];
        let line = engine.arena.children(block)[0];
        let atoms = engine.arena.children(line);
        let stars: Vec<_> = atoms.iter().filter(|&&t| engine.arena.get(t).kind == TokenKind::Star).collect();
        assert_eq!(stars.len(), 2);
        let first = engine.arena.get(*stars[0]);
        assert!(first.can_open && !first.can_close);
        let second = engine.arena.get(*stars[1]);
        assert!(!second.can_open && second.can_close);
    }

    #[test]
    fn underscore_disabled_next_to_alphanumeric() {
        let engine = build("wo_rd_s\n", Extensions::empty());
        let block = engine.arena.children(engine.root.unwrap())[0];
        let line = engine.arena.children(block)[0];
        let atoms = engine.arena.children(line);
        let uls: Vec<_> = atoms.iter().filter(|&&t| engine.arena.get(t).kind == TokenKind::Ul).collect();
        assert_eq!(uls.len(), 2);
        for u in uls {
            let t = engine.arena.get(*u);
            assert!(!t.can_open || !t.can_close);
        }
    }

    #[test]
    fn smart_single_dash_between_digits_is_not_demoted() {
        let engine = build("1-2\n", Extensions::SMART);
        let block = engine.arena.children(engine.root.unwrap())[0];
        let line = engine.arena.children(block)[0];
        let atoms = engine.arena.children(line);
        let dash = atoms.iter().find(|&&t| engine.arena.get(t).kind == TokenKind::DashN);
        assert!(dash.is_some());
    }

    #[test]
    fn smart_lone_dash_is_demoted_to_text() {
        let engine = build("a - b\n", Extensions::SMART);
        let block = engine.arena.children(engine.root.unwrap())[0];
        let line = engine.arena.children(block)[0];
        let atoms = engine.arena.children(line);
        assert!(atoms.iter().all(|&t| engine.arena.get(t).kind != TokenKind::DashN));
    }
}
