//! Language tag and quote-rendering-language derivation (§6), plus a tiny
//! localization lookup in the spirit of the reference engine's `i18n.h`
//! helper. Writers (out of scope for this crate) consult [`Language`] and
//! [`QuoteLanguage`] when rendering smart quotes and other locale-sensitive
//! punctuation; the core only owns and derives the tag.

/// ISO 639-1 language tag recognized by the engine. Unrecognized tags fall
/// back to [`Language::En`] at the API boundary (see [`Engine::set_language`](crate::Engine::set_language)).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Language {
    #[default]
    En,
    Es,
    De,
}

impl Language {
    pub fn from_tag(tag: &str) -> Language {
        match tag {
            "de" => Language::De,
            "es" => Language::Es,
            _ => Language::En,
        }
    }

    pub fn quotes_language(self) -> QuoteLanguage {
        match self {
            Language::De => QuoteLanguage::German,
            Language::Es | Language::En => QuoteLanguage::English,
        }
    }
}

/// The quote-rendering locale derived from [`Language`]. Only English and
/// German are distinguished; every other tag renders with English quotes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QuoteLanguage {
    #[default]
    English,
    German,
}

/// Looks up a fixed translation key for the given language. Unknown keys
/// return the literal string `"localization error"` rather than panicking or
/// propagating an error, matching §7's error-handling contract for this
/// helper.
pub fn translate(key: &str, language: Language) -> &'static str {
    match (key, language) {
        ("toc", Language::En) => "Table of Contents",
        ("toc", Language::Es) => "Tabla de Contenidos",
        ("toc", Language::De) => "Inhaltsverzeichnis",
        ("footnotes", Language::En) => "Footnotes",
        ("footnotes", Language::Es) => "Notas al pie",
        ("footnotes", Language::De) => "Fußnoten",
        ("citations", Language::En) => "Citations",
        ("citations", Language::Es) => "Citas",
        ("citations", Language::De) => "Zitate",
        _ => "localization error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_quote_language_from_tag() {
        assert_eq!(Language::from_tag("de").quotes_language(), QuoteLanguage::German);
        assert_eq!(Language::from_tag("es").quotes_language(), QuoteLanguage::English);
        assert_eq!(Language::from_tag("xx").quotes_language(), QuoteLanguage::English);
    }

    #[test]
    fn unknown_key_returns_localization_error() {
        assert_eq!(translate("nope", Language::En), "localization error");
    }
}
