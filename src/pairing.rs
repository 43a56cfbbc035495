//! The token-pair engine (§4.5) and the three-pass pairing driver (§4.6).
//!
//! Pairing runs per line: a block's lines are joined structurally only
//! later, during line-token absorption (§4.8), so each line's own chain of
//! inline children is the unit a pass operates over here. This means a
//! delimiter pair cannot span a line break within a paragraph -- a
//! deliberate, documented simplification of the reference engine, which
//! flattens a block's lines into one chain before pairing.

use crate::engine::Engine;
use crate::kind::TokenKind;
use crate::token::TokenId;

struct PairRule {
    open: TokenKind,
    close: TokenKind,
    pair: TokenKind,
    allow_empty: bool,
    prune_match: bool,
    match_length: bool,
}

fn rule(open: TokenKind, close: TokenKind, pair: TokenKind, allow_empty: bool, prune_match: bool, match_length: bool) -> PairRule {
    PairRule { open, close, pair, allow_empty, prune_match, match_length }
}

fn critic_rules() -> Vec<PairRule> {
    use TokenKind::*;
    vec![
        rule(CriticAddOpen, CriticAddClose, PairCriticAdd, true, true, false),
        rule(CriticDelOpen, CriticDelClose, PairCriticDel, true, true, false),
        rule(CriticComOpen, CriticComClose, PairCriticCom, true, true, false),
        rule(CriticHiOpen, CriticHiClose, PairCriticHi, true, true, false),
        rule(CriticSubOpen, CriticSubDivA, PairCriticSubDel, true, true, false),
        rule(CriticSubDivB, CriticSubClose, PairCriticSubAdd, true, true, false),
    ]
}

fn bracket_rules(math_enabled: bool) -> Vec<PairRule> {
    use TokenKind::*;
    let mut rules = vec![
        rule(BracketLeft, BracketRight, PairBracket, false, true, false),
        rule(BracketCitationLeft, BracketRight, PairBracketCitation, false, true, false),
        rule(BracketFootnoteLeft, BracketRight, PairBracketFootnote, false, true, false),
        rule(BracketImageLeft, BracketRight, PairBracketImage, false, true, false),
        rule(BracketVariableLeft, BracketRight, PairBracketVariable, false, true, false),
        rule(ParenLeft, ParenRight, PairParen, false, true, true),
        rule(AngleLeft, AngleRight, PairAngle, false, true, true),
        rule(BraceDoubleLeft, BraceDoubleRight, PairBraces, false, true, true),
        rule(Backtick, Backtick, PairBacktick, false, true, true),
    ];
    if math_enabled {
        rules.push(rule(MathParenOpen, MathParenClose, PairMath, true, true, false));
        rules.push(rule(MathBracketOpen, MathBracketClose, PairMath, true, true, false));
        rules.push(rule(MathDollarSingle, MathDollarSingle, PairMath, true, true, false));
        rules.push(rule(MathDollarDouble, MathDollarDouble, PairMath, true, true, false));
    }
    rules
}

fn emphasis_rules(non_compat: bool) -> Vec<PairRule> {
    use TokenKind::*;
    let mut rules = vec![
        rule(Star, Star, PairStar, false, false, false),
        rule(Ul, Ul, PairUl, false, false, false),
        rule(Backtick, QuoteRightAlt, PairQuoteAlt, true, false, true),
        rule(QuoteSingle, QuoteSingle, PairQuoteSingle, false, false, false),
        rule(QuoteDouble, QuoteDouble, PairQuoteDouble, false, false, false),
    ];
    if non_compat {
        rules.push(rule(Superscript, Superscript, PairSuperscript, false, false, false));
        rules.push(rule(Subscript, Subscript, PairSuperscript, false, false, false));
    }
    rules
}

/// Runs one pairing pass over `line`'s top-level children with a fresh
/// candidate stack (§4.5). Ambidextrous kinds (`*`, `_`, quotes, ...) only
/// ever act as opener/closer where `can_open`/`can_close` (set during
/// ambidextrous assignment, §4.4) allow it; kinds with distinct open/close
/// tokens (brackets, backticks, critic markup) always can.
fn pair_sequence(engine: &mut Engine, line: TokenId, rules: &[PairRule]) {
    let mut stack: Vec<TokenId> = Vec::new();
    let mut cur = engine.arena.get(line).child;

    while let Some(tok) = cur {
        let kind = engine.arena.get(tok).kind;
        let next = engine.arena.get(tok).next;
        let t = engine.arena.get(tok);
        let can_open = !kind.is_ambidextrous() || t.can_open;
        let can_close = !kind.is_ambidextrous() || t.can_close;

        let close_match = if can_close {
            (0..stack.len()).rev().find_map(|i| {
                let opener_kind = engine.arena.get(stack[i]).kind;
                rules
                    .iter()
                    .find(|r| r.open == opener_kind && r.close == kind)
                    .map(|r| (i, r))
            })
        } else {
            None
        };

        let can_open_here = can_open && rules.iter().any(|r| r.open == kind);

        if let Some((pos, matched_rule)) = close_match {
            let PairRule { pair, allow_empty, prune_match, match_length, .. } = *matched_rule;
            let opener = stack[pos];
            stack.truncate(pos);

            let zero_distance = engine.arena.get(opener).next == Some(tok);
            let length_ok =
                !match_length || engine.arena.get(opener).len == engine.arena.get(tok).len;
            let distance_ok = allow_empty || !zero_distance;

            if length_ok && distance_ok {
                engine.arena.get_mut(opener).mate = Some(tok);
                engine.arena.get_mut(tok).mate = Some(opener);
                engine.arena.get_mut(opener).kind = pair;
                engine.arena.get_mut(tok).kind = pair;

                if prune_match {
                    let from = engine.arena.get(opener).next;
                    let to = engine.arena.get(tok).prev;
                    if let (Some(from), Some(to)) = (from, to) {
                        engine.arena.unlink_range(from, to);
                        engine.arena.get_mut(opener).child = Some(from);
                        engine.arena.get_mut(from).tail = Some(to);
                    }
                }
            } else {
                stack.push(opener);
                if can_open_here {
                    stack.push(tok);
                }
            }
        } else if can_open_here {
            stack.push(tok);
        }

        cur = next;
    }
}

fn pair_line(engine: &mut Engine, line: TokenId) {
    if engine.extensions.critic_enabled() {
        let rules = critic_rules();
        pair_sequence(engine, line, &rules);
    }
    let rules = bracket_rules(engine.extensions.math_enabled());
    pair_sequence(engine, line, &rules);

    let rules = emphasis_rules(!engine.extensions.contains(crate::extensions::Extensions::COMPATIBILITY));
    pair_sequence(engine, line, &rules);
}

fn should_descend(kind: TokenKind) -> bool {
    matches!(
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
    )
}

/// Runs the three-pass pairing driver over every block's inline children,
/// recursing into blockquotes, headings, list items/lists, paragraphs, and
/// tables (§4.6).
pub fn pair_all(engine: &mut Engine, root: TokenId) {
    let children = engine.arena.children(root);
    for child in children {
        let kind = engine.arena.get(child).kind;
        if should_descend(kind) {
            pair_all(engine, child);
        } else if is_line_token(kind) {
            pair_line(engine, child);
        }
    }
}

fn is_line_token(kind: TokenKind) -> bool {
    !matches!(
        kind,
        TokenKind::BlockCodeIndented
            | TokenKind::BlockCodeFenced
            | TokenKind::BlockHr
            | TokenKind::BlockHtml
            | TokenKind::BlockDefLink
            | TokenKind::BlockDefCitation
            | TokenKind::BlockDefFootnote
            | TokenKind::BlockMeta
            | TokenKind::BlockEmpty
            | TokenKind::BlockBlockquote
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
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::Extensions;

    fn build(src: &str) -> Engine {
        let mut engine = Engine::create_with_string(src, Extensions::empty());
        let source = engine.source.clone();
        let root = crate::lexer::tokenize(&mut engine.arena, &source);
        crate::block_grammar::drive(&mut engine, root);
        crate::ambidextrous::assign(&mut engine, root);
        pair_all(&mut engine, root);
        engine.root = Some(root);
        engine
    }

    #[test]
    fn backtick_code_span_pairs_and_prunes_content() {
        let engine = build("`code`\n");
        let block = engine.arena.children(engine.root.unwrap())[0];
        let line = engine.arena.children(block)[0];
        let atoms = engine.arena.children(line);
        let ticks: Vec<_> = atoms.iter().filter(|&&t| engine.arena.get(t).kind == TokenKind::PairBacktick).collect();
        assert_eq!(ticks.len(), 2);
        let opener = *ticks[0];
        assert_eq!(engine.arena.get(opener).mate, Some(*ticks[1]));
        let contents = engine.arena.children(opener);
        assert_eq!(contents.len(), 1);
    }

    #[test]
    fn bracket_pair_prunes_label_as_children() {
        let engine = build("[text](url)\n");
        let block = engine.arena.children(engine.root.unwrap())[0];
        let line = engine.arena.children(block)[0];
        let atoms = engine.arena.children(line);
        let open = atoms.iter().find(|&&t| engine.arena.get(t).kind == TokenKind::PairBracket).unwrap();
        assert_eq!(engine.arena.children(*open).len(), 1);
    }

    #[test]
    fn unmatched_star_remains_literal() {
        let engine = build("a * b\n");
        let block = engine.arena.children(engine.root.unwrap())[0];
        let line = engine.arena.children(block)[0];
        let atoms = engine.arena.children(line);
        assert!(atoms.iter().any(|&t| engine.arena.get(t).kind == TokenKind::Star));
    }
}
