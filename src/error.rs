//! Error taxonomy for dictionary compilation.
//!
//! Compilation either succeeds or fails with a `DictionaryError` pointing at
//! the offending line and phrase. Tokenization and matching are total and
//! never produce errors: a degenerate document simply yields no tokens and
//! no hits, and unrecognized characters pass through normalization
//! unchanged.

use thiserror::Error;

/// Maximum nesting depth of bracketed sub-expressions in a proximity
/// criterion.
pub const MAX_BRACKET_DEPTH: usize = 5;

/// A malformed dictionary record. Unrecoverable for the dictionary load;
/// carries the 1-based source line and, where applicable, the search phrase
/// being compiled.
#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("line {line}: expected 4 tab-separated columns, found {found}")]
    MissingColumns { line: usize, found: usize },

    #[error("line {line}: invalid date range '{value}' (expected dd/mm/yy-dd/mm/yy)")]
    BadDateRange { line: usize, value: String },

    #[error("line {line}, phrase '{phrase}': {kind}")]
    Phrase {
        line: usize,
        phrase: String,
        kind: PhraseError,
    },
}

impl DictionaryError {
    pub(crate) fn phrase(line: usize, phrase: &str, kind: PhraseError) -> Self {
        DictionaryError::Phrase {
            line,
            phrase: phrase.to_string(),
            kind,
        }
    }
}

/// Defects local to a single search phrase.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PhraseError {
    #[error("empty keyword")]
    EmptyKeyword,

    #[error("unknown criterion tag '{0}'")]
    UnknownTag(String),

    #[error("criterion tag '{0}' given more than once")]
    DuplicateTag(char),

    #[error("missing '~<distance>' in proximity criterion")]
    MissingDistance,

    #[error("invalid word distance '{0}'")]
    BadDistance(String),

    #[error("invalid date range '{0}' (expected dd/mm/yy-dd/mm/yy)")]
    BadDateRange(String),

    #[error("unbalanced brackets in expression")]
    UnbalancedBrackets,

    #[error("mixed '&' and '|' operators within one bracket")]
    MixedOperators,

    #[error("bracket must contain at least two operands")]
    SingleOperandBracket,

    #[error("brackets nested deeper than {MAX_BRACKET_DEPTH} levels")]
    TooDeep,

    #[error("empty word in expression")]
    EmptyWord,

    #[error("malformed expression near '{0}'")]
    Malformed(String),
}
