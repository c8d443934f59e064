//! Compiled dictionary data model.
//!
//! One dictionary line yields one or more [`ConceptQuery`] values (one per
//! search phrase), all sharing the line's concept id, name, and date window
//! unless a phrase overrides the window. The whole dictionary compiles into
//! an immutable [`DictionaryTable`] that is shared read-only across all
//! matching invocations.
//!
//! ## Pipeline
//!
//! ```text
//! Dictionary source → compiler → DictionaryTable
//! Document field    → tokenizer → Vec<Token>
//! (tokens, table, document date) → matcher → Vec<Hit>
//! ```

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::language::Language;
use crate::morphology::EffectiveAffixes;

// =============================================================================
// TOKENS
// =============================================================================

/// Synthetic filler inserted for punctuation and paragraph weight.
///
/// Fillers occupy token positions (so proximity windows pay a distance
/// penalty across clause/sentence/paragraph boundaries) but never match a
/// keyword or criterion literal. The non-`Pad` variants remember which
/// punctuation produced them so serializers can restore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Filler {
    /// Extra weight position following a sentence or paragraph filler.
    Pad,
    Period,
    Exclamation,
    Question,
    Comma,
    Colon,
    Semicolon,
    Paragraph,
    Apostrophe,
    Dash,
    QuoteOpen,
    QuoteClose,
}

/// What kind of token this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    Word,
    Filler(Filler),
}

/// One position in a tokenized text field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Normalized text. Empty for fillers.
    pub text: String,
    pub kind: TokenKind,
}

impl Token {
    pub fn word(text: impl Into<String>) -> Self {
        Token {
            text: text.into(),
            kind: TokenKind::Word,
        }
    }

    pub fn filler(f: Filler) -> Self {
        Token {
            text: String::new(),
            kind: TokenKind::Filler(f),
        }
    }

    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Word
    }
}

// =============================================================================
// WORD PATTERNS
// =============================================================================

/// A keyword or criterion literal with its truncation flags.
///
/// `open_start` permits arbitrary leading characters (`*foo`), `open_end`
/// arbitrary trailing characters (`foo*`); both together give substring
/// semantics (`*foo*`). Truncation is recorded, never expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPattern {
    pub text: String,
    pub open_start: bool,
    pub open_end: bool,
}

impl WordPattern {
    pub fn exact(text: impl Into<String>) -> Self {
        WordPattern {
            text: text.into(),
            open_start: false,
            open_end: false,
        }
    }

    /// Parse a raw phrase word, stripping leading/trailing `*` markers into
    /// truncation flags. Returns `None` for an empty word.
    pub fn parse(raw: &str) -> Option<Self> {
        let open_start = raw.starts_with('*');
        let open_end = raw.ends_with('*') && raw.len() > 1;
        let text = raw.trim_matches('*');
        if text.is_empty() {
            return None;
        }
        Some(WordPattern {
            text: text.to_string(),
            open_start,
            open_end,
        })
    }

    /// Does this pattern match the given word?
    pub fn matches(&self, word: &str) -> bool {
        match (self.open_start, self.open_end) {
            (false, false) => word == self.text,
            (false, true) => word.starts_with(&self.text),
            (true, false) => word.ends_with(&self.text),
            (true, true) => word.contains(&self.text),
        }
    }

    /// The part of `word` following the matched pattern text, if the
    /// pattern matches. Used to test excluded suffixes against the
    /// remainder of a truncated match.
    pub fn remainder<'a>(&self, word: &'a str) -> Option<&'a str> {
        if !self.matches(word) {
            return None;
        }
        if !self.open_end {
            // The match is anchored at the end of the word, so nothing
            // can follow it.
            return Some("");
        }
        let start = if self.open_start {
            word.find(&self.text)?
        } else {
            0
        };
        Some(&word[start + self.text.len()..])
    }

    /// A copy of this pattern matching the simple plural form
    /// (`text + "s"`). Only meaningful when the pattern is not
    /// suffix-truncated.
    pub fn plural(&self) -> Self {
        WordPattern {
            text: format!("{}s", self.text),
            open_start: self.open_start,
            open_end: false,
        }
    }
}

/// An excluded-suffix entry: rejects a truncated match whose remainder
/// equals the text (or merely begins with it, when the entry itself was
/// suffix-truncated).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuffixPattern {
    pub text: String,
    pub open_end: bool,
}

impl SuffixPattern {
    pub fn parse(raw: &str) -> Option<Self> {
        let open_end = raw.ends_with('*');
        let text = raw.trim_end_matches('*');
        if text.is_empty() {
            return None;
        }
        Some(SuffixPattern {
            text: text.to_string(),
            open_end,
        })
    }

    pub fn matches(&self, remainder: &str) -> bool {
        if self.open_end {
            remainder.starts_with(&self.text)
        } else {
            remainder == self.text
        }
    }
}

// =============================================================================
// BOOLEAN EXPRESSION TREE
// =============================================================================

/// A Boolean expression over word patterns.
///
/// Operator nodes are exclusively AND or OR with at least two children;
/// nesting is bounded at compile time ([`crate::error::MAX_BRACKET_DEPTH`]).
/// Built once by the compiler, immutable, shared across evaluations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BoolExpr {
    Word(WordPattern),
    All(Vec<BoolExpr>),
    Any(Vec<BoolExpr>),
}

impl BoolExpr {
    /// Evaluate against a predicate deciding whether a single word pattern
    /// is satisfied in the current context window.
    pub fn eval<F>(&self, satisfied: &F) -> bool
    where
        F: Fn(&WordPattern) -> bool,
    {
        match self {
            BoolExpr::Word(p) => satisfied(p),
            BoolExpr::All(children) => children.iter().all(|c| c.eval(satisfied)),
            BoolExpr::Any(children) => children.iter().any(|c| c.eval(satisfied)),
        }
    }

    /// Maximum bracket depth of this tree (a bare literal is depth 0).
    pub fn depth(&self) -> usize {
        match self {
            BoolExpr::Word(_) => 0,
            BoolExpr::All(children) | BoolExpr::Any(children) => {
                1 + children.iter().map(BoolExpr::depth).max().unwrap_or(0)
            }
        }
    }
}

/// Presence or absence requirement of a proximity criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Polarity {
    /// `_y(...)`: the expression must hold within the window.
    Required,
    /// `_n(...)`: the expression must not hold within the window.
    Forbidden,
}

/// One `_y`/`_n` tag: a Boolean expression that must (or must not) be
/// satisfied within `distance` word positions of the keyword.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProximityCriterion {
    pub polarity: Polarity,
    pub distance: usize,
    pub expr: BoolExpr,
}

// =============================================================================
// DATE WINDOWS
// =============================================================================

/// Sentinel year marking a window that recurs every year.
pub const RECURRING_YEAR: i32 = 2099;

/// A validity window for a query or phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateWindow {
    /// A literal calendar range, inclusive on both ends.
    Fixed { from: NaiveDate, to: NaiveDate },
    /// A month/day range that applies in every year. Resolved against the
    /// document's year at match time; may span a year boundary
    /// (e.g. December through January).
    Recurring { from: (u32, u32), to: (u32, u32) },
}

impl DateWindow {
    /// Is the document date inside this window?
    ///
    /// A recurring window is anchored to whichever of (document year − 1,
    /// document year, document year + 1) places the document inside it.
    pub fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            DateWindow::Fixed { from, to } => from <= date && date <= to,
            DateWindow::Recurring { from, to } => {
                let year = date.year();
                let at = |y: i32, (m, d): (u32, u32)| NaiveDate::from_ymd_opt(y, m, d);
                if from <= to {
                    match (at(year, from), at(year, to)) {
                        (Some(f), Some(t)) => f <= date && date <= t,
                        _ => false,
                    }
                } else {
                    // Window crosses the year boundary; try both anchorings.
                    let spans = [(year - 1, year), (year, year + 1)];
                    spans.iter().any(|&(fy, ty)| {
                        matches!(
                            (at(fy, from), at(ty, to)),
                            (Some(f), Some(t)) if f <= date && date <= t
                        )
                    })
                }
            }
        }
    }
}

// =============================================================================
// CONCEPT QUERIES
// =============================================================================

/// One compiled search phrase for one concept.
///
/// Concept ids are not required to be unique: several queries may share an
/// id, and matching any of them codes the concept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptQuery {
    pub id: String,
    pub name: String,
    pub keyword: WordPattern,
    pub window: Option<DateWindow>,
    pub criteria: Vec<ProximityCriterion>,
    /// Generic mode `_p(...)`: the token before the keyword must match one
    /// of these. Empty when unused or in morphological mode.
    pub precedents: Vec<WordPattern>,
    /// Generic mode `_s(...)`: suffixes that reject a truncated match.
    pub excluded_suffixes: Vec<SuffixPattern>,
    /// Morphological mode only: the permitted affix tables for this query,
    /// computed at compile time from the language tables minus the
    /// phrase's `_p`/`_s` exclusions.
    pub affixes: Option<EffectiveAffixes>,
}

/// The compiled dictionary: ordered queries plus derived lookups used by
/// output serializers. Loaded once per run, never mutated during matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryTable {
    pub language: Language,
    pub queries: Vec<ConceptQuery>,
    /// Distinct concept ids, sorted.
    pub concept_ids: Vec<String>,
}

impl DictionaryTable {
    pub fn new(language: Language, queries: Vec<ConceptQuery>) -> Self {
        let mut concept_ids: Vec<String> = Vec::new();
        for q in &queries {
            if !concept_ids.iter().any(|id| id == &q.id) {
                concept_ids.push(q.id.clone());
            }
        }
        concept_ids.sort();
        DictionaryTable {
            language,
            queries,
            concept_ids,
        }
    }

    /// Name of a concept id (first query wins, as in the source order).
    pub fn concept_name(&self, id: &str) -> Option<&str> {
        self.queries
            .iter()
            .find(|q| q.id == id)
            .map(|q| q.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}

// =============================================================================
// HITS
// =============================================================================

/// A recognized concept at a token position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hit {
    pub position: usize,
    pub concept: String,
}

impl Hit {
    pub fn new(position: usize, concept: impl Into<String>) -> Self {
        Hit {
            position,
            concept: concept.into(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
