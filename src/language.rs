//! Supported languages and their shared normalization rules.
//!
//! The dictionary compiler and the tokenizer must place keywords and token
//! text in the same normalized character space, so both call
//! [`Language::normalize`]. Script-family behavior (generic vs
//! morphology-aware matching, Latin transliteration of Cyrillic text,
//! diacritic folding) is selected once per language, never re-dispatched
//! per character or token.

use serde::{Deserialize, Serialize};

/// The closed set of supported languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    English,
    French,
    German,
    Albanian,
    Serbian,
    Macedonian,
    Arabic,
    Hebrew,
}

impl Language {
    /// Parse a two-letter dictionary code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_uppercase().as_str() {
            "EN" => Some(Language::English),
            "FR" => Some(Language::French),
            "DE" => Some(Language::German),
            "AL" => Some(Language::Albanian),
            "SR" => Some(Language::Serbian),
            "MA" => Some(Language::Macedonian),
            "AR" => Some(Language::Arabic),
            "HE" => Some(Language::Hebrew),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "EN",
            Language::French => "FR",
            Language::German => "DE",
            Language::Albanian => "AL",
            Language::Serbian => "SR",
            Language::Macedonian => "MA",
            Language::Arabic => "AR",
            Language::Hebrew => "HE",
        }
    }

    /// Does this language use the morphology-aware matching predicate
    /// (productive prefixes/suffixes around word roots)?
    pub fn is_morphological(&self) -> bool {
        matches!(self, Language::Arabic | Language::Hebrew)
    }

    /// Does the tokenizer split in-word apostrophes into separate tokens
    /// (contractions, elision)?
    pub(crate) fn splits_apostrophes(&self) -> bool {
        matches!(
            self,
            Language::English | Language::French | Language::Albanian
        )
    }

    /// Does the tokenizer drop a possessive `'s`?
    pub(crate) fn drops_possessive(&self) -> bool {
        matches!(self, Language::English | Language::Albanian)
    }

    /// Lowercase and fold text into this language's working character
    /// space. Applied identically to dictionary phrases and document text;
    /// characters without a fold rule pass through unchanged.
    pub fn normalize(&self, text: &str) -> String {
        let text = text.to_lowercase();
        match self {
            Language::English | Language::German | Language::Albanian => text,
            Language::French => apply_folds(&text, FR_FOLDS),
            Language::Macedonian => {
                let text = fold_c_to_ts(&text);
                let text = apply_folds(&text, MK_LATIN_FOLDS);
                apply_folds(&text, MK_CYRILLIC_FOLDS)
            }
            Language::Serbian => {
                let text = fold_c_to_ts(&text);
                let text = apply_folds(&text, SR_LATIN_FOLDS);
                apply_folds(&text, SR_CYRILLIC_FOLDS)
            }
            Language::Arabic => {
                let text = apply_folds(&text, AR_FOLDS);
                text.replace('\'', "\"")
            }
            Language::Hebrew => text.replace('\'', "\""),
        }
    }
}

fn apply_folds(text: &str, folds: &[(&str, &str)]) -> String {
    let mut out = text.to_string();
    for (from, to) in folds {
        if out.contains(from) {
            out = out.replace(from, to);
        }
    }
    out
}

/// Replace `c` by `ts` except in the digraph `ch` (Latin-script Macedonian
/// and Serbian orthography variants).
fn fold_c_to_ts(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == 'c' && chars.peek() != Some(&'h') {
            out.push_str("ts");
        } else {
            out.push(c);
        }
    }
    out
}

// =============================================================================
// FOLD TABLES
// =============================================================================
// Applied in order; ordering matters where sequences overlap.

const FR_FOLDS: &[(&str, &str)] = &[
    ("œ", "oe"),
    ("æ", "ae"),
    ("ï", "i"),
    ("ü", "u"),
    ("ÿ", "y"),
];

const MK_LATIN_FOLDS: &[(&str, &str)] = &[
    ("č", "ch"),
    ("dzh", "dj"),
    ("ẑ", "dz"),
    ("ž", "zh"),
    ("ǵ", "gj"),
    ("đ", "gj"),
    ("ǰ", "j"),
    ("ḱ", "kj"),
    ("ć", "kj"),
    ("dž", "dj"),
    ("š", "sh"),
];

const MK_CYRILLIC_FOLDS: &[(&str, &str)] = &[
    ("а", "a"),
    ("б", "b"),
    ("в", "v"),
    ("г", "g"),
    ("д", "d"),
    ("ѓ", "gj"),
    ("е", "e"),
    ("ж", "zh"),
    ("з", "z"),
    ("ѕ", "dz"),
    ("и", "i"),
    ("ј", "j"),
    ("к", "k"),
    ("л", "l"),
    ("љ", "lj"),
    ("м", "m"),
    ("н", "n"),
    ("њ", "nj"),
    ("о", "o"),
    ("п", "p"),
    ("р", "r"),
    ("с", "s"),
    ("т", "t"),
    ("ќ", "kj"),
    ("у", "u"),
    ("ф", "f"),
    ("х", "h"),
    ("ц", "ts"),
    ("ч", "ch"),
    ("џ", "dj"),
    ("ш", "sh"),
];

const SR_LATIN_FOLDS: &[(&str, &str)] = &[
    ("č", "ch"),
    ("ž", "zh"),
    ("ć", "kj"),
    ("đ", "dj"),
    ("dž", "dj"),
    ("š", "sh"),
];

const SR_CYRILLIC_FOLDS: &[(&str, &str)] = &[
    ("а", "a"),
    ("б", "b"),
    ("в", "v"),
    ("г", "g"),
    ("д", "d"),
    ("ђ", "gj"),
    ("е", "e"),
    ("ж", "zh"),
    ("з", "z"),
    ("и", "i"),
    ("ј", "j"),
    ("к", "k"),
    ("л", "l"),
    ("љ", "lj"),
    ("м", "m"),
    ("н", "n"),
    ("њ", "nj"),
    ("о", "o"),
    ("п", "p"),
    ("р", "r"),
    ("с", "s"),
    ("т", "t"),
    ("ћ", "kj"),
    ("у", "u"),
    ("ф", "f"),
    ("х", "h"),
    ("ц", "ts"),
    ("ч", "ch"),
    ("џ", "dj"),
    ("ш", "sh"),
];

// Tatweel and pointing marks are stripped; Eastern Arabic digits and
// regional letter variants fold to one spelling; hamza forms fold to a
// bare alef.
const AR_FOLDS: &[(&str, &str)] = &[
    ("ـ", ""),
    ("؛", ""),
    ("ً", ""),
    ("ٌ", ""),
    ("ٍ", ""),
    ("َ", ""),
    ("ُ", ""),
    ("ِ", ""),
    ("ّ", ""),
    ("ْ", ""),
    ("٠", "0"),
    ("١", "1"),
    ("٢", "2"),
    ("٣", "3"),
    ("٤", "4"),
    ("٥", "5"),
    ("٦", "6"),
    ("٧", "7"),
    ("٨", "8"),
    ("٩", "9"),
    ("ی", "ى"),
    ("پ", "ب"),
    ("چ", "غ"),
    ("ڤ", "و"),
    ("گ", "ج"),
    ("ۆ", "و"),
    ("إ", "ا"),
    ("أ", "ا"),
    ("آ", "اا"),
];

// =============================================================================
// TESTS
// =============================================================================
