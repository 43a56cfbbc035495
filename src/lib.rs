//! A from-scratch MultiMarkdown-family parser core: tokenizer, line
//! classifier, block grammar driver, ambidextrous delimiter assignment, a
//! token-pair engine, and post-pairing fixups, all operating over one mutable
//! token arena per parse (§3).

pub use engine::Engine;
pub use extensions::Extensions;
pub use i18n::{translate, Language, QuoteLanguage};
pub use kind::TokenKind;
pub use stacks::{CitationEntry, DefinitionEntry, FootnoteEntry, HeaderEntry, LinkEntry, MetadataEntry, Stacks};
pub use token::{Token, TokenArena, TokenId};

mod ambidextrous;
mod block_grammar;
mod charclass;
mod classify;
mod engine;
mod extensions;
mod fixups;
mod i18n;
mod kind;
mod lexer;
mod pairing;
mod scanners;
mod stacks;
mod token;

/// Parses `source` under the given extension set and returns the finished
/// engine, with `engine.root` set to the document's root token.
pub fn parse(source: &str, extensions: Extensions) -> Engine {
    let mut engine = Engine::create_with_string(source, extensions);
    engine.parse();
    engine
}
