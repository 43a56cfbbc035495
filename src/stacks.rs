//! The six engine-level stacks (§3 "engine-level state"): accumulated
//! records that cross block boundaries during a parse, each populated by
//! the post-pairing fixups and consulted by cross-reference resolution
//! (resolving a citation, a footnote, a reference-style link, and so on).

use crate::token::TokenId;

#[derive(Clone, Debug)]
pub struct CitationEntry {
    pub label: String,
    pub line: TokenId,
}

#[derive(Clone, Debug)]
pub struct DefinitionEntry {
    pub label: String,
    pub destination: String,
    pub title: Option<String>,
}

#[derive(Clone, Debug)]
pub struct FootnoteEntry {
    pub label: String,
    pub line: TokenId,
}

#[derive(Clone, Debug)]
pub struct HeaderEntry {
    pub level: u8,
    pub block: TokenId,
}

#[derive(Clone, Debug)]
pub struct LinkEntry {
    pub label: String,
    pub destination: String,
    pub title: Option<String>,
}

#[derive(Clone, Debug)]
pub struct MetadataEntry {
    pub key: String,
    pub value: String,
}

/// Owns all six engine-level stacks for the duration of one parse. Kept as
/// one struct on [`Engine`](crate::Engine) rather than six loose fields so a
/// fresh parse resets them in a single assignment.
#[derive(Clone, Debug, Default)]
pub struct Stacks {
    pub citations: Vec<CitationEntry>,
    pub definitions: Vec<DefinitionEntry>,
    pub footnotes: Vec<FootnoteEntry>,
    pub headers: Vec<HeaderEntry>,
    pub links: Vec<LinkEntry>,
    pub metadata: Vec<MetadataEntry>,
}

impl Stacks {
    pub fn new() -> Self {
        Stacks::default()
    }

    pub fn metadata_get(&self, key: &str) -> Option<&str> {
        self.metadata.iter().find(|e| e.key.eq_ignore_ascii_case(key)).map(|e| e.value.as_str())
    }

    pub fn link_get(&self, label: &str) -> Option<&LinkEntry> {
        self.links.iter().find(|e| e.label.eq_ignore_ascii_case(label))
    }

    pub fn footnote_get(&self, label: &str) -> Option<&FootnoteEntry> {
        self.footnotes.iter().find(|e| e.label == label)
    }

    pub fn citation_get(&self, label: &str) -> Option<&CitationEntry> {
        self.citations.iter().find(|e| e.label == label)
    }
}
