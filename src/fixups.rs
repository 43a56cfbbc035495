//! Post-pairing fixups (§4.7, §4.8): emphasis-to-strong promotion, structural
//! restructuring (recursive list-item/blockquote reparse, paragraph→HTML
//! reclassification, list looseness), line-token absorption, and metadata
//! extraction.
//!
//! `restructure` runs between the block grammar driver and ambidextrous
//! assignment so that nested list-item/blockquote content gets exactly one
//! ambidextrous-assignment and pairing pass, rather than being processed
//! once as raw lines and again after reparsing.

use crate::charclass::is_whitespace;
use crate::engine::Engine;
use crate::kind::TokenKind;
use crate::scanners;
use crate::stacks::MetadataEntry;
use crate::token::TokenId;

// ---------------------------------------------------------------------
// Structural restructuring: recursive list-item/blockquote reparse,
// paragraph→HTML reclassification, list looseness.
// ---------------------------------------------------------------------

pub fn restructure(engine: &mut Engine, root: TokenId) {
    let children = engine.arena.children(root);
    for child in children {
        match engine.arena.get(child).kind {
            TokenKind::BlockBlockquote => reparse_blockquote(engine, child),
            TokenKind::BlockListBulleted | TokenKind::BlockListEnumerated => {
                let items = engine.arena.children(child);
                let loose = items.iter().any(|&item| {
                    engine
                        .arena
                        .children(item)
                        .iter()
                        .any(|&l| engine.arena.get(l).kind == TokenKind::LineEmpty)
                });
                for &item in &items {
                    reparse_list_item(engine, item, loose);
                }
                if loose {
                    let kind = engine.arena.get(child).kind;
                    let loose_kind = match kind {
                        TokenKind::BlockListBulleted => TokenKind::BlockListBulletedLoose,
                        TokenKind::BlockListEnumerated => TokenKind::BlockListEnumeratedLoose,
                        other => other,
                    };
                    engine.arena.get_mut(child).kind = loose_kind;
                }
            }
            TokenKind::BlockPara => try_html_reclassify(engine, child),
            _ => {}
        }
    }
}

fn drive_pseudo_root(engine: &mut Engine, lines: Vec<TokenId>) -> Option<TokenId> {
    let pseudo_root = engine.arena.alloc(TokenKind::DocStartToken, 0, 0);
    for line in lines {
        engine.arena.get_mut(line).prev = None;
        engine.arena.get_mut(line).next = None;
        engine.arena.append_child(pseudo_root, line);
    }
    crate::block_grammar::drive(engine, pseudo_root);
    engine.arena.get(pseudo_root).child
}

fn reparse_list_item(engine: &mut Engine, item: TokenId, loose: bool) {
    let lines = engine.arena.children(item);
    engine.arena.get_mut(item).child = None;
    engine.arena.get_mut(item).tail = None;

    if let Some(&first) = lines.first() {
        strip_leading_marker(engine, first);
    }
    for &line in lines.iter().skip(1) {
        dedent_one_level(engine, line);
    }

    engine.arena.get_mut(item).child = drive_pseudo_root(engine, lines);
    restructure(engine, item);

    if !loose {
        unwrap_tight_item(engine, item);
    }
}

/// A tight item's single paragraph loses its `BlockPara` wrapper: the
/// paragraph's own (still line-shaped) children become the item's direct
/// children, matching the shape ambidextrous assignment and pairing already
/// expect from a line-bearing container.
fn unwrap_tight_item(engine: &mut Engine, item: TokenId) {
    let children = engine.arena.children(item);
    if children.len() == 1 && engine.arena.get(children[0]).kind == TokenKind::BlockPara {
        let para = children[0];
        let inner = engine.arena.get(para).child;
        engine.arena.get_mut(item).child = inner;
        engine.arena.get_mut(item).tail = None;
    }
    engine.arena.get_mut(item).kind = TokenKind::BlockListItemTight;
}

fn reparse_blockquote(engine: &mut Engine, block: TokenId) {
    let lines = engine.arena.children(block);
    engine.arena.get_mut(block).child = None;
    engine.arena.get_mut(block).tail = None;

    for &line in &lines {
        strip_blockquote_marker(engine, line);
    }

    engine.arena.get_mut(block).child = drive_pseudo_root(engine, lines);
    restructure(engine, block);
}

fn strip_leading_marker(engine: &mut Engine, line: TokenId) {
    loop {
        let Some(first) = engine.arena.get(line).child else { break };
        let kind = engine.arena.get(first).kind;
        if matches!(kind, TokenKind::MarkerListBullet | TokenKind::MarkerListEnumerator | TokenKind::TextEmpty) {
            engine.arena.remove_first_child(line);
        } else {
            break;
        }
    }
}

fn dedent_one_level(engine: &mut Engine, line: TokenId) {
    if let Some(first) = engine.arena.get(line).child {
        if matches!(engine.arena.get(first).kind, TokenKind::IndentSpace | TokenKind::IndentTab) {
            engine.arena.remove_first_child(line);
        }
    }
}

fn strip_blockquote_marker(engine: &mut Engine, line: TokenId) {
    if let Some(first) = engine.arena.get(line).child {
        if engine.arena.get(first).kind == TokenKind::MarkerBlockquote {
            engine.arena.remove_first_child(line);
        }
    }
    if let Some(first) = engine.arena.get(line).child {
        if engine.arena.get(first).kind == TokenKind::NonIndentSpace {
            engine.arena.remove_first_child(line);
        }
    }
    if let Some(first) = engine.arena.get(line).child {
        if engine.arena.get(first).kind == TokenKind::TextPlain {
            let start = engine.arena.get(first).start;
            let end = engine.arena.get(first).end();
            let skip =
                engine.source.as_bytes()[start..end].iter().take_while(|&&b| is_whitespace(b)).count();
            if skip >= end - start {
                engine.arena.remove_first_child(line);
            } else if skip > 0 {
                engine.arena.get_mut(first).start = start + skip;
                engine.arena.get_mut(first).len -= skip;
            }
        }
    }
}

fn try_html_reclassify(engine: &mut Engine, block: TokenId) {
    let Some(first_line) = engine.arena.get(block).child else { return };
    if engine.arena.get(first_line).kind != TokenKind::LinePlain {
        return;
    }
    let Some(first_atom) = engine.arena.get(first_line).child else { return };
    if engine.arena.get(first_atom).kind != TokenKind::AngleLeft {
        return;
    }
    let start = engine.arena.get(first_atom).start;
    let bytes = &engine.source.as_bytes()[start..];
    if scanners::scan_html_block(bytes) > 0 || scanners::scan_html_line(bytes) > 0 {
        engine.arena.get_mut(block).kind = TokenKind::BlockHtml;
    }
}

// ---------------------------------------------------------------------
// Emphasis → strong promotion (§4.7).
// ---------------------------------------------------------------------

pub fn promote(engine: &mut Engine, root: TokenId) {
    let children = engine.arena.children(root);
    for child in children {
        let kind = engine.arena.get(child).kind;
        if is_container(kind) {
            promote(engine, child);
        } else if is_line_bearing(kind) {
            for line in engine.arena.children(child) {
                promote_chain(engine, engine.arena.get(line).child);
            }
        } else if is_bare_line(kind) {
            // A tight list item whose solitary paragraph has already been
            // unwrapped holds raw line tokens directly as its own children.
            promote_chain(engine, engine.arena.get(child).child);
        }
    }
}

fn is_bare_line(kind: TokenKind) -> bool {
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
    ) && !is_container(kind)
        && !is_line_bearing(kind)
}

fn promote_chain(engine: &mut Engine, first: Option<TokenId>) {
    let Some(first) = first else { return };
    let ids = engine.arena.siblings_from(first);

    for &id in &ids {
        let child = engine.arena.get(id).child;
        promote_chain(engine, child);
    }

    let mut removed = std::collections::HashSet::new();
    for &t in &ids {
        if removed.contains(&t) {
            continue;
        }
        if !matches!(engine.arena.get(t).kind, TokenKind::PairStar | TokenKind::PairUl) {
            continue;
        }
        let Some(c) = engine.arena.get(t).mate else { continue };
        if engine.arena.get(t).start >= engine.arena.get(c).start {
            continue;
        }
        try_promote(engine, t, c, &mut removed);
    }

    for &id in &ids {
        if removed.contains(&id) {
            continue;
        }
        let kind = engine.arena.get(id).kind;
        if matches!(kind, TokenKind::PairStar | TokenKind::PairUl) {
            let Some(mate) = engine.arena.get(id).mate else { continue };
            if engine.arena.get(id).start < engine.arena.get(mate).start {
                engine.arena.get_mut(id).kind = TokenKind::EmphStart;
            } else {
                engine.arena.get_mut(id).kind = TokenKind::EmphStop;
            }
        }
    }
}

fn try_promote(engine: &mut Engine, t: TokenId, c: TokenId, removed: &mut std::collections::HashSet<TokenId>) {
    let Some(tn) = engine.arena.get(t).next else { return };
    let Some(cp) = engine.arena.get(c).prev else { return };
    if tn == c || cp == t {
        return;
    }
    let t_kind = engine.arena.get(t).kind;
    if engine.arena.get(tn).kind != t_kind {
        return;
    }
    if engine.arena.get(tn).mate != Some(cp) {
        return;
    }
    if engine.arena.get(t).end() != engine.arena.get(tn).start {
        return;
    }
    if engine.arena.get(c).start != engine.arena.get(cp).end() {
        return;
    }

    engine.arena.get_mut(t).kind = TokenKind::StrongStart;
    engine.arena.get_mut(t).len = 2;
    engine.arena.get_mut(c).kind = TokenKind::StrongStop;
    engine.arena.get_mut(c).len = 2;
    engine.arena.get_mut(c).start -= 1;

    unlink_single(engine, tn);
    unlink_single(engine, cp);
    removed.insert(tn);
    removed.insert(cp);
}

fn unlink_single(engine: &mut Engine, id: TokenId) {
    let prev = engine.arena.get(id).prev;
    let next = engine.arena.get(id).next;
    if let Some(p) = prev {
        engine.arena.get_mut(p).next = next;
    }
    if let Some(n) = next {
        engine.arena.get_mut(n).prev = prev;
    }
}

fn is_container(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::BlockBlockquote
            | TokenKind::BlockListBulleted
            | TokenKind::BlockListBulletedLoose
            | TokenKind::BlockListEnumerated
            | TokenKind::BlockListEnumeratedLoose
            | TokenKind::BlockListItem
            | TokenKind::BlockListItemTight
    )
}

fn is_line_bearing(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::BlockH1
            | TokenKind::BlockH2
            | TokenKind::BlockH3
            | TokenKind::BlockH4
            | TokenKind::BlockH5
            | TokenKind::BlockH6
            | TokenKind::BlockPara
            | TokenKind::BlockTable
    )
}

// ---------------------------------------------------------------------
// Line-token absorption and metadata extraction (§4.8).
// ---------------------------------------------------------------------

/// True for every `Block*` kind that can appear as a list item's content
/// (as opposed to the raw line tokens a tight item holds directly once its
/// solitary paragraph wrapper has been unwrapped).
fn is_block_kind(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::BlockPara
            | TokenKind::BlockH1
            | TokenKind::BlockH2
            | TokenKind::BlockH3
            | TokenKind::BlockH4
            | TokenKind::BlockH5
            | TokenKind::BlockH6
            | TokenKind::BlockBlockquote
            | TokenKind::BlockCodeIndented
            | TokenKind::BlockCodeFenced
            | TokenKind::BlockListBulleted
            | TokenKind::BlockListBulletedLoose
            | TokenKind::BlockListEnumerated
            | TokenKind::BlockListEnumeratedLoose
            | TokenKind::BlockListItem
            | TokenKind::BlockListItemTight
            | TokenKind::BlockHtml
            | TokenKind::BlockDefLink
            | TokenKind::BlockDefCitation
            | TokenKind::BlockDefFootnote
            | TokenKind::BlockMeta
            | TokenKind::BlockTable
            | TokenKind::BlockEmpty
            | TokenKind::BlockHr
    )
}

pub fn run(engine: &mut Engine, root: TokenId) {
    let children = engine.arena.children(root);
    for child in children {
        let kind = engine.arena.get(child).kind;
        match kind {
            TokenKind::BlockBlockquote
            | TokenKind::BlockListBulleted
            | TokenKind::BlockListBulletedLoose
            | TokenKind::BlockListEnumerated
            | TokenKind::BlockListEnumeratedLoose
            | TokenKind::BlockListItem => run(engine, child),
            TokenKind::BlockListItemTight => {
                let holds_blocks = engine.arena.get(child).child.is_some_and(|f| is_block_kind(engine.arena.get(f).kind));
                if holds_blocks {
                    run(engine, child);
                } else {
                    absorb(engine, child, false, false);
                }
            }
            TokenKind::BlockTable => retype_rows(engine, child),
            TokenKind::BlockCodeIndented => absorb(engine, child, true, true),
            TokenKind::BlockCodeFenced => absorb(engine, child, true, false),
            TokenKind::BlockMeta => {
                extract_metadata(engine, child);
                absorb(engine, child, false, false);
            }
            TokenKind::BlockH1
            | TokenKind::BlockH2
            | TokenKind::BlockH3
            | TokenKind::BlockH4
            | TokenKind::BlockH5
            | TokenKind::BlockH6
            | TokenKind::BlockPara
            | TokenKind::BlockHtml
            | TokenKind::BlockDefLink
            | TokenKind::BlockDefCitation
            | TokenKind::BlockDefFootnote => absorb(engine, child, false, false),
            _ => {}
        }
    }
}

fn retype_rows(engine: &mut Engine, block: TokenId) {
    for line in engine.arena.children(block) {
        if engine.arena.get(line).kind == TokenKind::LineTable {
            engine.arena.get_mut(line).kind = TokenKind::RowTable;
        }
    }
}

fn absorb(engine: &mut Engine, block: TokenId, is_code: bool, shed_trailing_blanks: bool) {
    let mut lines = engine.arena.children(block);
    if shed_trailing_blanks {
        while lines.last().is_some_and(|&l| engine.arena.get(l).kind == TokenKind::LineEmpty) {
            lines.pop();
        }
    }

    engine.arena.get_mut(block).child = None;
    engine.arena.get_mut(block).tail = None;

    for line in lines {
        strip_indent(engine, line, is_code);
        let atoms = engine.arena.children(line);
        for atom in atoms {
            engine.arena.get_mut(atom).prev = None;
            engine.arena.get_mut(atom).next = None;
            engine.arena.append_child(block, atom);
        }
    }
}

fn strip_indent(engine: &mut Engine, line: TokenId, is_code: bool) {
    if let Some(first) = engine.arena.get(line).child {
        if engine.arena.get(first).kind == TokenKind::NonIndentSpace {
            engine.arena.remove_first_child(line);
        }
    }

    let mut first_stripped = false;
    loop {
        let Some(first) = engine.arena.get(line).child else { break };
        if !matches!(engine.arena.get(first).kind, TokenKind::IndentSpace | TokenKind::IndentTab) {
            break;
        }
        if is_code && first_stripped {
            break;
        }
        engine.arena.remove_first_child(line);
        first_stripped = true;
        if is_code {
            break;
        }
    }
}

fn line_text(engine: &Engine, line: TokenId) -> String {
    let children = engine.arena.children(line);
    let Some(&first) = children.first() else { return String::new() };
    let start = engine.arena.get(first).start;
    let end = match children.last() {
        Some(&last) if matches!(engine.arena.get(last).kind, TokenKind::TextNl | TokenKind::TextLinebreak) => {
            engine.arena.get(last).start
        }
        Some(&last) => engine.arena.get(last).end(),
        None => start,
    };
    String::from_utf8_lossy(&engine.source.as_bytes()[start..end]).into_owned()
}

fn extract_metadata(engine: &mut Engine, block: TokenId) {
    let lines = engine.arena.children(block);
    let mut current: Option<usize> = None;

    for line in lines {
        let kind = engine.arena.get(line).kind;
        if kind == TokenKind::LineMeta {
            let text = line_text(engine, line);
            let key_len = scanners::scan_meta_key(text.as_bytes());
            if key_len == 0 {
                log::warn!("metadata line failed key scan, dropping: {text:?}");
                continue;
            }
            let key = text[..key_len].trim().to_string();
            let value = text[key_len + 1..].trim_start().to_string();
            engine.stacks.metadata.push(MetadataEntry { key, value });
            current = Some(engine.stacks.metadata.len() - 1);
        } else if matches!(kind, TokenKind::LineIndentedTab | TokenKind::LineIndentedSpace | TokenKind::LinePlain) {
            if let Some(idx) = current {
                let text = line_text(engine, line);
                let entry = &mut engine.stacks.metadata[idx];
                entry.value.push('\n');
                entry.value.push_str(text.trim());
            }
        }
    }
}
