//! The closed token-type enumeration (§3). Every token produced anywhere in
//! the engine -- by the tokenizer, the line classifier, the block grammar, or
//! a pairing pass -- carries one of these kinds, and passes mutate `kind` in
//! place rather than replacing the token, exactly as the reference design
//! requires (see the design notes on in-place type rewriting).

#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // --- Inline atom types (tokenizer output) ---
    NonIndentSpace,
    IndentSpace,
    IndentTab,
    TextNl,
    TextLinebreak,
    BracketLeft,
    BracketRight,
    BracketCitationLeft,
    BracketFootnoteLeft,
    BracketImageLeft,
    BracketVariableLeft,
    ParenLeft,
    ParenRight,
    AngleLeft,
    AngleRight,
    BraceDoubleLeft,
    BraceDoubleRight,
    MathParenOpen,
    MathParenClose,
    MathBracketOpen,
    MathBracketClose,
    MathDollarSingle,
    MathDollarDouble,
    Backtick,
    Star,
    Ul,
    Superscript,
    Subscript,
    QuoteSingle,
    QuoteDouble,
    QuoteRightAlt,
    Apostrophe,
    DashN,
    DashM,
    Plus,
    Hash1,
    Hash2,
    Hash3,
    Hash4,
    Hash5,
    Hash6,
    Pipe,
    TextPlain,
    TextEmpty,
    TextNumberPossList,
    CriticAddOpen,
    CriticAddClose,
    CriticDelOpen,
    CriticDelClose,
    CriticComOpen,
    CriticComClose,
    CriticSubOpen,
    CriticSubClose,
    CriticSubDiv,
    CriticSubDivA,
    CriticSubDivB,
    CriticHiOpen,
    CriticHiClose,

    // --- Markers (retyped atoms after classification) ---
    MarkerBlockquote,
    MarkerListBullet,
    MarkerListEnumerator,
    MarkerH1,
    MarkerH2,
    MarkerH3,
    MarkerH4,
    MarkerH5,
    MarkerH6,

    // --- Line types (classifier output) ---
    LineEmpty,
    LinePlain,
    LineIndentedTab,
    LineIndentedSpace,
    LineAtx1,
    LineAtx2,
    LineAtx3,
    LineAtx4,
    LineAtx5,
    LineAtx6,
    LineBlockquote,
    LineHr,
    LineHtml,
    LineFenceBacktickStart,
    LineFenceBacktick,
    LineListBulleted,
    LineListEnumerated,
    LineDefLink,
    LineDefCitation,
    LineDefFootnote,
    LineMeta,
    LineTable,
    LineContinuation,

    // --- Block types (grammar output) ---
    DocStartToken,
    BlockPara,
    BlockH1,
    BlockH2,
    BlockH3,
    BlockH4,
    BlockH5,
    BlockH6,
    BlockBlockquote,
    BlockCodeIndented,
    BlockCodeFenced,
    BlockListBulleted,
    BlockListBulletedLoose,
    BlockListEnumerated,
    BlockListEnumeratedLoose,
    BlockListItem,
    BlockListItemTight,
    BlockHtml,
    BlockDefLink,
    BlockDefCitation,
    BlockDefFootnote,
    BlockMeta,
    BlockTable,
    BlockEmpty,
    BlockHr,
    RowTable,

    // --- Pair types (pairing engine output) ---
    PairStar,
    PairUl,
    PairBracket,
    PairBracketCitation,
    PairBracketFootnote,
    PairBracketImage,
    PairBracketVariable,
    PairParen,
    PairAngle,
    PairBraces,
    PairBacktick,
    PairQuoteAlt,
    PairQuoteSingle,
    PairQuoteDouble,
    PairMath,
    PairSuperscript,
    PairCriticAdd,
    PairCriticDel,
    PairCriticSubDel,
    PairCriticSubAdd,
    PairCriticCom,
    PairCriticHi,

    // --- Emphasis/strong replacement atoms ---
    StrongStart,
    StrongStop,
    EmphStart,
    EmphStop,
}

impl TokenKind {
    /// `true` for the kinds the ambidextrous-assignment pass (§4.4) inspects.
    pub fn is_ambidextrous(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Star | Ul
                | Backtick
                | QuoteSingle
                | QuoteDouble
                | DashN
                | MathDollarSingle
                | MathDollarDouble
                | Superscript
                | Subscript
                | CriticSubDiv
        )
    }

    pub fn is_hash(self) -> bool {
        matches!(
            self,
            TokenKind::Hash1
                | TokenKind::Hash2
                | TokenKind::Hash3
                | TokenKind::Hash4
                | TokenKind::Hash5
                | TokenKind::Hash6
        )
    }

    /// Numeric band of an ATX hash run, 1-6.
    pub fn hash_level(self) -> Option<u8> {
        use TokenKind::*;
        Some(match self {
            Hash1 => 1,
            Hash2 => 2,
            Hash3 => 3,
            Hash4 => 4,
            Hash5 => 5,
            Hash6 => 6,
            _ => return None,
        })
    }

    pub fn atx_line_kind(level: u8) -> TokenKind {
        use TokenKind::*;
        match level {
            1 => LineAtx1,
            2 => LineAtx2,
            3 => LineAtx3,
            4 => LineAtx4,
            5 => LineAtx5,
            _ => LineAtx6,
        }
    }

    pub fn atx_marker_kind(level: u8) -> TokenKind {
        use TokenKind::*;
        match level {
            1 => MarkerH1,
            2 => MarkerH2,
            3 => MarkerH3,
            4 => MarkerH4,
            5 => MarkerH5,
            _ => MarkerH6,
        }
    }

    pub fn atx_block_kind(level: u8) -> TokenKind {
        use TokenKind::*;
        match level {
            1 => BlockH1,
            2 => BlockH2,
            3 => BlockH3,
            4 => BlockH4,
            5 => BlockH5,
            _ => BlockH6,
        }
    }

    pub fn is_indent(self) -> bool {
        matches!(
            self,
            TokenKind::IndentSpace | TokenKind::IndentTab | TokenKind::NonIndentSpace
        )
    }

    pub fn is_line_ending(self) -> bool {
        matches!(self, TokenKind::TextNl | TokenKind::TextLinebreak)
    }

    pub fn is_list_block(self) -> bool {
        matches!(
            self,
            TokenKind::BlockListBulleted
                | TokenKind::BlockListBulletedLoose
                | TokenKind::BlockListEnumerated
                | TokenKind::BlockListEnumeratedLoose
        )
    }
}
