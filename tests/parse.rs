use test_case::test_case;

use lightmark::{Engine, Extensions, TokenKind};

fn parse(src: &str, extensions: Extensions) -> Engine {
    let mut engine = Engine::create_with_string(src, extensions);
    engine.parse();
    engine
}

#[test]
fn heading_paragraph_and_list_end_to_end() {
    let engine = parse(
        "# Title\n\nHello **world**, this is *nice*.\n\n* one\n* two\n",
        Extensions::empty(),
    );
    let blocks = engine.arena.children(engine.root.unwrap());
    assert_eq!(engine.arena.get(blocks[0]).kind, TokenKind::BlockH1);
    assert_eq!(engine.arena.get(blocks[1]).kind, TokenKind::BlockEmpty);
    assert_eq!(engine.arena.get(blocks[2]).kind, TokenKind::BlockPara);
    assert_eq!(engine.arena.get(blocks[3]).kind, TokenKind::BlockListBulleted);

    let para_atoms = engine.arena.children(blocks[2]);
    assert!(para_atoms.iter().any(|&t| engine.arena.get(t).kind == TokenKind::StrongStart));
    assert!(para_atoms.iter().any(|&t| engine.arena.get(t).kind == TokenKind::EmphStart));

    let items = engine.arena.children(blocks[3]);
    assert_eq!(items.len(), 2);
    assert_eq!(engine.arena.get(items[0]).kind, TokenKind::BlockListItemTight);
}

#[test]
fn fenced_code_survives_absorption_with_raw_content() {
    let engine = parse("```\nfn f() {}\n```\n", Extensions::empty());
    let blocks = engine.arena.children(engine.root.unwrap());
    assert_eq!(blocks.len(), 1);
    assert_eq!(engine.arena.get(blocks[0]).kind, TokenKind::BlockCodeFenced);
    let atoms = engine.arena.children(blocks[0]);
    assert!(!atoms.is_empty());
}

#[test]
fn blockquote_reparses_nested_paragraph() {
    let engine = parse("> quoted text\n> more text\n", Extensions::empty());
    let blocks = engine.arena.children(engine.root.unwrap());
    assert_eq!(engine.arena.get(blocks[0]).kind, TokenKind::BlockBlockquote);
    let inner = engine.arena.children(blocks[0]);
    assert_eq!(engine.arena.get(inner[0]).kind, TokenKind::BlockPara);
}

#[test]
fn loose_list_when_item_contains_blank_separated_paragraphs() {
    let engine = parse("* one\n\n  still one\n* two\n", Extensions::empty());
    let blocks = engine.arena.children(engine.root.unwrap());
    assert_eq!(engine.arena.get(blocks[0]).kind, TokenKind::BlockListBulletedLoose);
}

#[test]
fn metadata_extracted_into_stacks_when_enabled() {
    let engine = parse("Title: My Doc\nAuthor: Jane\n\nBody text.\n", Extensions::empty());
    assert_eq!(engine.stacks.metadata_get("Title"), Some("My Doc"));
    assert_eq!(engine.stacks.metadata_get("Author"), Some("Jane"));
}

#[test]
fn metadata_disabled_under_compatibility() {
    let engine = parse("Title: My Doc\n\nBody.\n", Extensions::COMPATIBILITY);
    assert!(engine.stacks.metadata.is_empty());
    let blocks = engine.arena.children(engine.root.unwrap());
    assert_eq!(engine.arena.get(blocks[0]).kind, TokenKind::BlockPara);
}

#[test]
fn critic_markup_only_pairs_when_extension_enabled() {
    let engine = parse("plain {++added++} text\n", Extensions::CRITIC);
    let blocks = engine.arena.children(engine.root.unwrap());
    let atoms = engine.arena.children(blocks[0]);
    assert!(atoms.iter().any(|&t| engine.arena.get(t).kind == TokenKind::PairCriticAdd));
}

#[test_case("# Heading", TokenKind::BlockH1; "atx_h1")]
#[test_case("## Heading", TokenKind::BlockH2; "atx_h2")]
#[test_case("###### Heading", TokenKind::BlockH6; "atx_h6")]
#[test_case("> quote", TokenKind::BlockBlockquote; "blockquote")]
#[test_case("    indented code", TokenKind::BlockCodeIndented; "indented_code")]
#[test_case("```\ncode\n```", TokenKind::BlockCodeFenced; "fenced_code")]
#[test_case("---", TokenKind::BlockHr; "horizontal_rule")]
#[test_case("plain paragraph text", TokenKind::BlockPara; "paragraph")]
fn classifies_first_block_kind(src: &str, expected: TokenKind) {
    let engine = parse(&format!("{src}\n"), Extensions::empty());
    let blocks = engine.arena.children(engine.root.unwrap());
    assert_eq!(engine.arena.get(blocks[0]).kind, expected);
}
