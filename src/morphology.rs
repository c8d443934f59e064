//! Morphology-aware matching for Arabic and Hebrew.
//!
//! Both languages write many function words (conjunctions, articles,
//! prepositions, possessives) as affixes on the content word, so an exact
//! token comparison would miss most inflected occurrences. A keyword is
//! therefore allowed to carry any of a fixed set of productive prefixes and
//! suffixes. Criterion literals get a narrower license: only the query
//! prefix rule ([`literal_matches`]), never suffixes.
//!
//! A query's `_p`/`_s` tags narrow the license further. The narrowing is
//! resolved once at compile time into an [`EffectiveAffixes`] value per
//! query; the shared language tables are never mutated.

use serde::{Deserialize, Serialize};

use crate::ast::WordPattern;
use crate::language::Language;

// =============================================================================
// LANGUAGE TABLES
// =============================================================================

struct AffixTables {
    /// Single-character prefixes permitted on a keyword.
    singles: &'static str,
    /// Multi-character prefixes permitted on a keyword.
    multis: &'static [&'static str],
    /// Conjunction characters that may stack before another single prefix.
    conjunctions: &'static str,
    /// Suffixes permitted after a keyword.
    suffixes: &'static [&'static str],
}

const AR_TABLES: AffixTables = AffixTables {
    singles: "فمكبولتينل",
    multis: &["ال", "لل", "فال"],
    conjunctions: "",
    suffixes: &[
        "ان", "ين", "ية", "ة", "كن", "ها", "هم", "ه", "ك", "كم", "ي", "وا",
        "ن", "ت", "تم", "تن", "نا", "ون", "ا",
    ],
};

const HE_TABLES: AffixTables = AffixTables {
    singles: "ובכלמהשאיתנ",
    multis: &["מה"],
    conjunctions: "וש",
    suffixes: &[
        "ים", "ות", "י", "כ", "ו", "נו", "הם", "הן", "כם", "כן", "ה", "תי",
        "תם", "תן", "ת", "ך", "ן", "ם", "ית",
    ],
};

fn tables(language: Language) -> Option<&'static AffixTables> {
    match language {
        Language::Arabic => Some(&AR_TABLES),
        Language::Hebrew => Some(&HE_TABLES),
        _ => None,
    }
}

// =============================================================================
// EFFECTIVE AFFIXES
// =============================================================================

/// The affix license of one compiled query: the language tables minus the
/// phrase's `_p`/`_s` exclusions. A `*` exclusion leaves the corresponding
/// side empty (bare-stem matching only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveAffixes {
    pub single_prefixes: Vec<char>,
    pub multi_prefixes: Vec<String>,
    pub conjunctions: Vec<char>,
    pub suffixes: Vec<String>,
}

impl EffectiveAffixes {
    /// Build the license for one query. `excluded_prefixes` and
    /// `excluded_suffixes` are the `|`-separated items of the `_p`/`_s`
    /// tags (empty when the tag is absent); a `*` item excludes the whole
    /// corresponding side.
    pub fn for_query(
        language: Language,
        excluded_prefixes: &[String],
        excluded_suffixes: &[String],
    ) -> Option<Self> {
        let base = tables(language)?;

        let mut single_prefixes: Vec<char> = base.singles.chars().collect();
        let mut multi_prefixes: Vec<String> =
            base.multis.iter().map(|p| p.to_string()).collect();
        let mut conjunctions: Vec<char> = base.conjunctions.chars().collect();
        if excluded_prefixes.iter().any(|x| x == "*") {
            single_prefixes.clear();
            multi_prefixes.clear();
            conjunctions.clear();
        } else {
            for item in excluded_prefixes {
                let mut chars = item.chars();
                match (chars.next(), chars.next()) {
                    // One excluded character removes the single prefix and
                    // every multi prefix containing it.
                    (Some(c), None) => {
                        single_prefixes.retain(|&p| p != c);
                        conjunctions.retain(|&p| p != c);
                        multi_prefixes.retain(|p| !p.contains(c));
                    }
                    // A longer exclusion drops exactly that prefix.
                    (Some(_), Some(_)) => multi_prefixes.retain(|p| p != item),
                    (None, _) => {}
                }
            }
        }

        let mut suffixes: Vec<String> =
            base.suffixes.iter().map(|s| s.to_string()).collect();
        if excluded_suffixes.iter().any(|x| x == "*") {
            suffixes.clear();
        } else {
            for item in excluded_suffixes {
                suffixes.retain(|s| s != item);
            }
        }

        Some(EffectiveAffixes {
            single_prefixes,
            multi_prefixes,
            conjunctions,
            suffixes,
        })
    }

    /// Does the keyword pattern match this word under the license?
    ///
    /// The word is tried bare and with each permitted prefix stripped; a
    /// non-truncated keyword additionally accepts one permitted suffix on
    /// the stem.
    pub fn keyword_matches(&self, pattern: &WordPattern, word: &str) -> bool {
        let relaxed = WordPattern {
            text: pattern.text.clone(),
            open_start: pattern.open_start,
            open_end: true,
        };
        for base in self.prefix_stripped_bases(word) {
            if pattern.matches(base) {
                return true;
            }
            if !pattern.open_end {
                if let Some(rest) = relaxed.remainder(base) {
                    if !rest.is_empty() && self.suffixes.iter().any(|s| s == rest) {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// The word itself plus every permitted-prefix-stripped form of it.
    fn prefix_stripped_bases<'a>(&self, word: &'a str) -> Vec<&'a str> {
        let mut bases = vec![word];

        let mut chars = word.chars();
        let first = match chars.next() {
            Some(c) => c,
            None => return bases,
        };
        let after_first = chars.as_str();
        let second = chars.next();

        if self.single_prefixes.contains(&first) && !after_first.is_empty() {
            bases.push(after_first);
        }
        for prefix in &self.multi_prefixes {
            if let Some(rest) = word.strip_prefix(prefix.as_str()) {
                if !rest.is_empty() {
                    bases.push(rest);
                }
            }
        }
        // A conjunction may stack before another single prefix.
        if let Some(second) = second {
            if self.conjunctions.contains(&first)
                && self.single_prefixes.contains(&second)
                && !self.conjunctions.contains(&second)
            {
                let rest = chars.as_str();
                if !rest.is_empty() {
                    bases.push(rest);
                }
            }
        }
        bases
    }
}

// =============================================================================
// CRITERION LITERALS
// =============================================================================

/// Does a criterion literal match this word?
///
/// Literals get the narrower query prefix rule: Arabic allows an optional
/// single prefix followed by an optional article (`ال` or `لل`); Hebrew an
/// optional conjunction followed by an optional second prefix. The
/// literal's own truncation flags then apply to the stripped stem. For
/// non-morphological languages this is a plain pattern match.
pub fn literal_matches(language: Language, pattern: &WordPattern, word: &str) -> bool {
    literal_bases(language, word)
        .iter()
        .any(|base| pattern.matches(base))
}

fn literal_bases(language: Language, word: &str) -> Vec<&str> {
    let mut bases = vec![word];
    match language {
        Language::Arabic => {
            let mut layer = vec![word];
            if let Some(rest) = strip_one_of(word, "فمكبولتينل") {
                layer.push(rest);
            }
            let articled: Vec<&str> = layer
                .iter()
                .filter_map(|w| {
                    w.strip_prefix("ال").or_else(|| w.strip_prefix("لل"))
                })
                .collect();
            layer.extend(articled);
            bases = layer;
        }
        Language::Hebrew => {
            let mut layer = vec![word];
            if let Some(rest) = strip_one_of(word, "וש") {
                layer.push(rest);
            }
            let stripped: Vec<&str> = layer
                .iter()
                .filter_map(|w| strip_one_of(w, "בכלמהאיתנ"))
                .collect();
            layer.extend(stripped);
            bases = layer;
        }
        _ => {}
    }
    bases.retain(|b| !b.is_empty());
    bases
}

fn strip_one_of<'a>(word: &'a str, prefixes: &str) -> Option<&'a str> {
    let mut chars = word.chars();
    let first = chars.next()?;
    if prefixes.contains(first) {
        Some(chars.as_str())
    } else {
        None
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn full(language: Language) -> EffectiveAffixes {
        EffectiveAffixes::for_query(language, &[], &[]).unwrap()
    }

    fn items(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn only_morphological_languages_have_tables() {
        assert!(EffectiveAffixes::for_query(Language::English, &[], &[]).is_none());
        assert!(EffectiveAffixes::for_query(Language::Arabic, &[], &[]).is_some());
        assert!(EffectiveAffixes::for_query(Language::Hebrew, &[], &[]).is_some());
    }

    #[test]
    fn hebrew_prefix_and_suffix_on_stem() {
        let affixes = full(Language::Hebrew);
        let stem = WordPattern::exact("חבר");
        assert!(affixes.keyword_matches(&stem, "חבר"));
        // Conjunction prefix plus masculine-plural suffix.
        assert!(affixes.keyword_matches(&stem, "וחברים"));
        // Stacked conjunction + preposition.
        assert!(affixes.keyword_matches(&stem, "ובחבר"));
        assert!(!affixes.keyword_matches(&stem, "חברות2"));
    }

    #[test]
    fn arabic_article_prefix() {
        let affixes = full(Language::Arabic);
        let stem = WordPattern::exact("امن");
        assert!(affixes.keyword_matches(&stem, "امن"));
        assert!(affixes.keyword_matches(&stem, "الامن"));
        assert!(affixes.keyword_matches(&stem, "فالامن"));
        assert!(affixes.keyword_matches(&stem, "امنها"));
    }

    #[test]
    fn truncated_keyword_ignores_suffix_table() {
        let affixes = full(Language::Hebrew);
        let open = WordPattern::parse("חבר*").unwrap();
        // Any trailing characters are fine once the stem prefix-matches.
        assert!(affixes.keyword_matches(&open, "חברותxyz"));
    }

    #[test]
    fn excluded_prefix_narrows_license() {
        let affixes =
            EffectiveAffixes::for_query(Language::Hebrew, &items(&["ו"]), &[]).unwrap();
        let stem = WordPattern::exact("חבר");
        assert!(!affixes.keyword_matches(&stem, "וחבר"));
        assert!(affixes.keyword_matches(&stem, "החבר"));
    }

    #[test]
    fn excluded_suffix_narrows_license() {
        let affixes =
            EffectiveAffixes::for_query(Language::Hebrew, &[], &items(&["ה"])).unwrap();
        let stem = WordPattern::exact("חבר");
        assert!(!affixes.keyword_matches(&stem, "חברה"));
        assert!(affixes.keyword_matches(&stem, "חברים"));
    }

    #[test]
    fn wildcard_exclusion_forces_bare_stem() {
        let affixes =
            EffectiveAffixes::for_query(Language::Arabic, &items(&["*"]), &items(&["*"])).unwrap();
        let stem = WordPattern::exact("امن");
        assert!(affixes.keyword_matches(&stem, "امن"));
        assert!(!affixes.keyword_matches(&stem, "الامن"));
        assert!(!affixes.keyword_matches(&stem, "امنها"));
    }

    #[test]
    fn literal_prefix_rule_is_narrower() {
        let lit = WordPattern::exact("שלום");
        assert!(literal_matches(Language::Hebrew, &lit, "שלום"));
        assert!(literal_matches(Language::Hebrew, &lit, "ושלום"));
        assert!(literal_matches(Language::Hebrew, &lit, "ולשלום"));
        // Suffixes are not licensed on literals.
        assert!(!literal_matches(Language::Hebrew, &lit, "שלומים"));

        let ar = WordPattern::exact("امن");
        assert!(literal_matches(Language::Arabic, &ar, "للامن"));
        assert!(literal_matches(Language::Arabic, &ar, "والامن"));
    }

    #[test]
    fn literal_truncation_respected() {
        let open = WordPattern::parse("שלו*").unwrap();
        assert!(literal_matches(Language::Hebrew, &open, "שלומים"));
        assert!(literal_matches(Language::Hebrew, &open, "ושלום"));
        assert!(!literal_matches(Language::Hebrew, &open, "לום"));
    }

    #[test]
    fn generic_language_literal_is_plain_match() {
        let lit = WordPattern::exact("peace");
        assert!(literal_matches(Language::English, &lit, "peace"));
        assert!(!literal_matches(Language::English, &lit, "peaces"));
    }
}
