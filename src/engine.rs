//! The parse engine (§3 "engine-level state", §6 "public Engine API"): the
//! single owner of a parse's token arena, source buffer, extension set,
//! language, and the six cross-reference stacks.

use arcstr::ArcStr;

use crate::extensions::Extensions;
use crate::i18n::{Language, QuoteLanguage};
use crate::stacks::Stacks;
use crate::token::{TokenArena, TokenId};

/// Owns everything a single parse needs. Constructed fresh per document;
/// nothing here is shared across parses (§5 concurrency model -- no shared
/// mutable state between engines).
pub struct Engine {
    pub arena: TokenArena,
    pub source: ArcStr,
    pub extensions: Extensions,
    pub language: Language,
    pub quotes_language: QuoteLanguage,
    /// Monotonic: once any non-metadata/non-empty line is seen, metadata
    /// lines are no longer recognized for the rest of the document (§9).
    pub allow_meta: bool,
    pub stacks: Stacks,
    pub root: Option<TokenId>,
}

impl Engine {
    pub fn create(bytes: &[u8], extensions: Extensions) -> Engine {
        Engine::create_with_string(&String::from_utf8_lossy(bytes), extensions)
    }

    pub fn create_with_string(source: &str, extensions: Extensions) -> Engine {
        Engine {
            arena: TokenArena::new(),
            source: ArcStr::from(source),
            extensions,
            language: Language::default(),
            quotes_language: QuoteLanguage::default(),
            allow_meta: extensions.metadata_enabled(),
            stacks: Stacks::new(),
            root: None,
        }
    }

    pub fn set_language(&mut self, tag: &str) {
        self.language = Language::from_tag(tag);
        self.quotes_language = self.language.quotes_language();
    }

    /// Parses the whole source buffer, populating `self.root`.
    pub fn parse(&mut self) {
        log::debug!("starting parse: {} bytes, extensions={:?}", self.source.len(), self.extensions);
        let source = self.source.clone();
        let root = crate::lexer::tokenize(&mut self.arena, &source);
        crate::block_grammar::drive(self, root);
        crate::fixups::restructure(self, root);
        crate::ambidextrous::assign(self, root);
        crate::pairing::pair_all(self, root);
        crate::fixups::promote(self, root);
        crate::fixups::run(self, root);
        self.root = Some(root);
        log::debug!("parse complete: {} top-level blocks", self.arena.children(root).len());
    }

    /// Parses just the `len` bytes of `self.source` starting at `start` as a
    /// standalone document, without touching `self.root`. Used for re-running
    /// the pipeline over a substring (e.g. a single cell's contents) while
    /// keeping the engine's accumulated stacks (§6).
    pub fn parse_substring(&mut self, start: usize, len: usize) -> TokenId {
        let end = (start + len).min(self.source.len());
        let start = start.min(end);
        let text = self.source[start..end].to_string();

        let saved_source = std::mem::replace(&mut self.source, ArcStr::from(text));
        let source = self.source.clone();
        let root = crate::lexer::tokenize(&mut self.arena, &source);
        crate::block_grammar::drive(self, root);
        crate::fixups::restructure(self, root);
        crate::ambidextrous::assign(self, root);
        crate::pairing::pair_all(self, root);
        crate::fixups::promote(self, root);
        crate::fixups::run(self, root);
        self.source = saved_source;

        root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_language_tag_falls_back_to_english() {
        let mut engine = Engine::create_with_string("x", Extensions::empty());
        engine.set_language("xx");
        assert_eq!(engine.language, Language::En);
    }
}
