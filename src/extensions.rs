//! The extension bitset (§6) that gates optional syntax. Modeled as
//! `bitflags`, the same way the reference `TokenFlags` type represents
//! per-token context bits -- the crate uses one flags type for per-run
//! configuration and another for per-token metadata, rather than inventing a
//! bespoke bitset type for each.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Extensions: u32 {
        /// Disables metadata, critic markup, notes, math, sub/sup, smart
        /// quotes, and fenced code, reverting to a plain-vanilla dialect.
        const COMPATIBILITY = 1 << 0;
        /// Disables metadata lines/blocks; they are parsed as paragraphs.
        const NO_METADATA   = 1 << 1;
        /// Enables CriticMarkup insertion/deletion/comment/substitution/
        /// highlight delimiters and their pairing pass.
        const CRITIC        = 1 << 2;
        /// Enables footnote and citation reference-definition lines.
        const NOTES         = 1 << 3;
        /// Enables smart quote/apostrophe/dash disambiguation.
        const SMART         = 1 << 4;
    }
}

impl Extensions {
    #[inline]
    pub fn metadata_enabled(self) -> bool {
        !self.contains(Extensions::COMPATIBILITY) && !self.contains(Extensions::NO_METADATA)
    }

    #[inline]
    pub fn critic_enabled(self) -> bool {
        self.contains(Extensions::CRITIC) && !self.contains(Extensions::COMPATIBILITY)
    }

    #[inline]
    pub fn notes_enabled(self) -> bool {
        self.contains(Extensions::NOTES) && !self.contains(Extensions::COMPATIBILITY)
    }

    #[inline]
    pub fn smart_enabled(self) -> bool {
        self.contains(Extensions::SMART) && !self.contains(Extensions::COMPATIBILITY)
    }

    #[inline]
    pub fn math_enabled(self) -> bool {
        !self.contains(Extensions::COMPATIBILITY)
    }

    #[inline]
    pub fn fenced_code_enabled(self) -> bool {
        !self.contains(Extensions::COMPATIBILITY)
    }
}
