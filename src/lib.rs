//! codebook: dictionary-based, syntax-aware concept coding for text corpora
//!
//! The library is a pure pipeline with no I/O in the core:
//! - Token types and the compiled query model (WordPattern, BoolExpr,
//!   ConceptQuery, DictionaryTable)
//! - Language normalization (transliteration and folding, shared by
//!   dictionary and text)
//! - Tokenizer with punctuation-weighted filler tokens
//! - Dictionary compiler for the tab-delimited query language
//! - Matching engines (generic and morphology-aware)
//! - Result serializers (results list, annotated text, replaced text,
//!   KWIC, term-document matrix)
//!
//! The CLI binary wires the corpus reader through the pipeline.

pub mod ast;
pub mod compiler;
pub mod corpus;
pub mod error;
pub mod language;
pub mod matcher;
pub mod morphology;
pub mod output;
pub mod tokenizer;

// Re-export the types most callers touch
pub use ast::{
    BoolExpr, ConceptQuery, DateWindow, DictionaryTable, Filler, Hit, Polarity,
    ProximityCriterion, SuffixPattern, Token, TokenKind, WordPattern,
};
pub use compiler::{compile, dictionary_language};
pub use corpus::{read_corpus, CorpusError, Document, Field, LanguageIndex};
pub use error::{DictionaryError, PhraseError, MAX_BRACKET_DEPTH};
pub use language::Language;
pub use matcher::{match_tokens, MatchOptions, DEDUP_WINDOW};
pub use morphology::EffectiveAffixes;
pub use output::{CodedDocument, CodedField};
pub use tokenizer::tokenize;
