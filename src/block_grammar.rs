//! The block grammar driver (component E, §4.3): consumes the flat chain of
//! line tokens the tokenizer produced, classifying each on consumption, and
//! emits the block tree rooted at the document's `DOC_START_TOKEN`.
//!
//! Blocks that are themselves reparsed recursively (list items, blockquotes,
//! §4.8) are built here with their *raw* line children only; the recursive
//! reparse fixup replaces those children with a parsed sub-tree afterwards.
//! This keeps the driver itself a single linear pass with no lookahead
//! beyond "is this line a continuation of what's currently open."

use crate::classify::{classify, line_bytes};
use crate::engine::Engine;
use crate::kind::TokenKind;
use crate::scanners;
use crate::token::TokenId;

enum ListKind {
    Bulleted,
    Enumerated,
}

enum Mode {
    None,
    Para(TokenId),
    Blockquote(TokenId),
    CodeIndented(TokenId),
    CodeFenced(TokenId),
    Table(TokenId),
    Meta(TokenId),
    List { block: TokenId, kind: ListKind, item: TokenId },
}

/// Runs the block grammar over `root`'s line children and replaces them with
/// the resulting block children.
pub fn drive(engine: &mut Engine, root: TokenId) {
    let lines = engine.arena.children(root);
    engine.arena.get_mut(root).child = None;
    engine.arena.get_mut(root).tail = None;

    let mut mode = Mode::None;
    let mut blank_run = 0usize;

    for line in lines {
        classify(engine, line);
        let kind = engine.arena.get(line).kind;

        if let Mode::CodeFenced(block) = mode {
            engine.arena.append_child(block, line);
            let bytes = line_bytes(engine, line);
            if scanners::scan_fence_end(&bytes) > 0 {
                engine.arena.get_mut(line).kind = TokenKind::LineFenceBacktick;
                engine.arena.append_child(root, block);
                mode = Mode::None;
            }
            continue;
        }

        if kind == TokenKind::LineEmpty {
            blank_run += 1;
            match &mode {
                Mode::List { item, .. } => {
                    engine.arena.append_child(*item, line);
                    if blank_run >= 2 {
                        close(engine, root, mode);
                        mode = Mode::None;
                    }
                }
                Mode::CodeIndented(block) => {
                    engine.arena.append_child(*block, line);
                }
                Mode::None => {
                    let empty = engine.arena.alloc(TokenKind::BlockEmpty, engine.arena.get(line).start, 0);
                    engine.arena.append_child(empty, line);
                    engine.arena.append_child(root, empty);
                }
                _ => {
                    close(engine, root, mode);
                    mode = Mode::None;
                }
            }
            continue;
        }
        blank_run = 0;

        match kind {
            TokenKind::LineAtx1
            | TokenKind::LineAtx2
            | TokenKind::LineAtx3
            | TokenKind::LineAtx4
            | TokenKind::LineAtx5
            | TokenKind::LineAtx6 => {
                close(engine, root, mode);
                let level = header_level(kind);
                let block = engine.arena.alloc(TokenKind::atx_block_kind(level), engine.arena.get(line).start, 0);
                engine.arena.append_child(block, line);
                engine.arena.append_child(root, block);
                mode = Mode::None;
            }
            TokenKind::LineHr => {
                close(engine, root, mode);
                let block = engine.arena.alloc(TokenKind::BlockHr, engine.arena.get(line).start, 0);
                engine.arena.append_child(block, line);
                engine.arena.append_child(root, block);
                mode = Mode::None;
            }
            TokenKind::LineFenceBacktickStart => {
                close(engine, root, mode);
                let block = engine.arena.alloc(TokenKind::BlockCodeFenced, engine.arena.get(line).start, 0);
                engine.arena.append_child(block, line);
                mode = Mode::CodeFenced(block);
            }
            TokenKind::LineBlockquote => {
                if let Mode::Blockquote(block) = mode {
                    engine.arena.append_child(block, line);
                    mode = Mode::Blockquote(block);
                } else {
                    close(engine, root, mode);
                    let block = engine.arena.alloc(TokenKind::BlockBlockquote, engine.arena.get(line).start, 0);
                    engine.arena.append_child(block, line);
                    mode = Mode::Blockquote(block);
                }
            }
            TokenKind::LineIndentedTab | TokenKind::LineIndentedSpace => {
                if let Mode::CodeIndented(block) = mode {
                    engine.arena.append_child(block, line);
                    mode = Mode::CodeIndented(block);
                } else {
                    close(engine, root, mode);
                    let block = engine.arena.alloc(TokenKind::BlockCodeIndented, engine.arena.get(line).start, 0);
                    engine.arena.append_child(block, line);
                    mode = Mode::CodeIndented(block);
                }
            }
            TokenKind::LineListBulleted | TokenKind::LineListEnumerated => {
                let want_bulleted = kind == TokenKind::LineListBulleted;
                let same_list = matches!(
                    &mode,
                    Mode::List { kind: ListKind::Bulleted, .. } if want_bulleted
                ) || matches!(
                    &mode,
                    Mode::List { kind: ListKind::Enumerated, .. } if !want_bulleted
                );
                if same_list {
                    if let Mode::List { block, kind: lk, item } = mode {
                        engine.arena.append_child(block, item);
                        let new_item = engine.arena.alloc(TokenKind::BlockListItem, engine.arena.get(line).start, 0);
                        engine.arena.append_child(new_item, line);
                        mode = Mode::List { block, kind: lk, item: new_item };
                    }
                } else {
                    close(engine, root, mode);
                    let list_kind = TokenKind::BlockListBulleted;
                    let list_kind = if want_bulleted { list_kind } else { TokenKind::BlockListEnumerated };
                    let block = engine.arena.alloc(list_kind, engine.arena.get(line).start, 0);
                    let item = engine.arena.alloc(TokenKind::BlockListItem, engine.arena.get(line).start, 0);
                    engine.arena.append_child(item, line);
                    mode = Mode::List {
                        block,
                        kind: if want_bulleted { ListKind::Bulleted } else { ListKind::Enumerated },
                        item,
                    };
                }
            }
            TokenKind::LineDefLink => {
                close(engine, root, mode);
                let block = engine.arena.alloc(TokenKind::BlockDefLink, engine.arena.get(line).start, 0);
                engine.arena.append_child(block, line);
                engine.arena.append_child(root, block);
                mode = Mode::None;
            }
            TokenKind::LineDefCitation => {
                close(engine, root, mode);
                let block = engine.arena.alloc(TokenKind::BlockDefCitation, engine.arena.get(line).start, 0);
                engine.arena.append_child(block, line);
                engine.arena.append_child(root, block);
                mode = Mode::None;
            }
            TokenKind::LineDefFootnote => {
                close(engine, root, mode);
                let block = engine.arena.alloc(TokenKind::BlockDefFootnote, engine.arena.get(line).start, 0);
                engine.arena.append_child(block, line);
                engine.arena.append_child(root, block);
                mode = Mode::None;
            }
            TokenKind::LineMeta => {
                if let Mode::Meta(block) = mode {
                    engine.arena.append_child(block, line);
                    mode = Mode::Meta(block);
                } else {
                    close(engine, root, mode);
                    let block = engine.arena.alloc(TokenKind::BlockMeta, engine.arena.get(line).start, 0);
                    engine.arena.append_child(block, line);
                    mode = Mode::Meta(block);
                }
            }
            TokenKind::LineTable => {
                if let Mode::Table(block) = mode {
                    engine.arena.append_child(block, line);
                    mode = Mode::Table(block);
                } else {
                    close(engine, root, mode);
                    let block = engine.arena.alloc(TokenKind::BlockTable, engine.arena.get(line).start, 0);
                    engine.arena.append_child(block, line);
                    mode = Mode::Table(block);
                }
            }
            TokenKind::LinePlain | TokenKind::LineContinuation => match mode {
                Mode::Para(block) => {
                    engine.arena.append_child(block, line);
                    mode = Mode::Para(block);
                }
                Mode::Meta(block) => {
                    engine.arena.append_child(block, line);
                    mode = Mode::Meta(block);
                }
                Mode::List { block, kind: lk, item } => {
                    engine.arena.append_child(item, line);
                    mode = Mode::List { block, kind: lk, item };
                }
                _ => {
                    close(engine, root, mode);
                    let block = engine.arena.alloc(TokenKind::BlockPara, engine.arena.get(line).start, 0);
                    engine.arena.append_child(block, line);
                    mode = Mode::Para(block);
                }
            },
            _ => {
                close(engine, root, mode);
                let block = engine.arena.alloc(TokenKind::BlockPara, engine.arena.get(line).start, 0);
                engine.arena.append_child(block, line);
                mode = Mode::Para(block);
            }
        }
    }

    close(engine, root, mode);
}

fn header_level(kind: TokenKind) -> u8 {
    match kind {
        TokenKind::LineAtx1 => 1,
        TokenKind::LineAtx2 => 2,
        TokenKind::LineAtx3 => 3,
        TokenKind::LineAtx4 => 4,
        TokenKind::LineAtx5 => 5,
        _ => 6,
    }
}

fn close(engine: &mut Engine, root: TokenId, mode: Mode) {
    match mode {
        Mode::None => {}
        Mode::Para(block) | Mode::Blockquote(block) | Mode::CodeIndented(block) | Mode::Meta(block) => {
            engine.arena.append_child(root, block);
        }
        Mode::CodeFenced(block) => {
            engine.arena.append_child(root, block);
        }
        Mode::Table(block) => {
            engine.arena.append_child(root, block);
        }
        Mode::List { block, item, .. } => {
            engine.arena.append_child(block, item);
            engine.arena.append_child(root, block);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::Extensions;

    fn build(src: &str) -> (Engine, TokenId) {
        let mut engine = Engine::create_with_string(src, Extensions::empty());
        let source = engine.source.clone();
        let root = crate::lexer::tokenize(&mut engine.arena, &source);
        drive(&mut engine, root);
        (engine, root)
    }

    #[test]
    fn heading_becomes_its_own_block() {
        let (engine, root) = build("# Hello\n");
        let blocks = engine.arena.children(root);
        assert_eq!(blocks.len(), 1);
        assert_eq!(engine.arena.get(blocks[0]).kind, TokenKind::BlockH1);
    }

    #[test]
    fn consecutive_plain_lines_join_one_paragraph() {
        let (engine, root) = build("line one\nline two\n");
        let blocks = engine.arena.children(root);
        assert_eq!(blocks.len(), 1);
        assert_eq!(engine.arena.get(blocks[0]).kind, TokenKind::BlockPara);
        assert_eq!(engine.arena.children(blocks[0]).len(), 2);
    }

    #[test]
    fn blank_line_splits_paragraphs() {
        let (engine, root) = build("one\n\ntwo\n");
        let blocks = engine.arena.children(root);
        assert_eq!(blocks.len(), 2);
        assert_eq!(engine.arena.get(blocks[0]).kind, TokenKind::BlockPara);
        assert_eq!(engine.arena.get(blocks[1]).kind, TokenKind::BlockPara);
    }

    #[test]
    fn blank_line_at_top_level_becomes_its_own_block() {
        let (engine, root) = build("\nafter\n");
        let blocks = engine.arena.children(root);
        assert_eq!(blocks.len(), 2);
        assert_eq!(engine.arena.get(blocks[0]).kind, TokenKind::BlockEmpty);
        assert_eq!(engine.arena.get(blocks[1]).kind, TokenKind::BlockPara);
    }

    #[test]
    fn list_markers_group_into_items() {
        let (engine, root) = build("* a\n* b\n");
        let blocks = engine.arena.children(root);
        assert_eq!(blocks.len(), 1);
        assert_eq!(engine.arena.get(blocks[0]).kind, TokenKind::BlockListBulleted);
        assert_eq!(engine.arena.children(blocks[0]).len(), 2);
    }

    #[test]
    fn fenced_code_absorbs_raw_lines_until_closing_fence() {
        let (engine, root) = build("```\n# not a heading\n```\n");
        let blocks = engine.arena.children(root);
        assert_eq!(blocks.len(), 1);
        assert_eq!(engine.arena.get(blocks[0]).kind, TokenKind::BlockCodeFenced);
        assert_eq!(engine.arena.children(blocks[0]).len(), 3);
    }
}
