//! The matching engine: tokens + compiled table + document date → hits.
//!
//! One pass over the token list. At every content token, each query is
//! given a chance to fire: date window first, then the keyword predicate,
//! then the proximity criteria. A repeat hit of the same concept within
//! [`DEDUP_WINDOW`] positions of its previous hit is suppressed unless
//! [`MatchOptions::allow_adjacent`] is set. Matching is total and shares
//! the table read-only, so documents can be coded in parallel.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::trace;

use crate::ast::{ConceptQuery, DictionaryTable, Hit, Polarity, Token};
use crate::language::Language;
use crate::morphology;

/// Positions a concept must advance before it may fire again.
pub const DEDUP_WINDOW: usize = 5;

/// Per-run matching switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchOptions {
    /// Disable repeat-hit suppression.
    pub allow_adjacent: bool,
}

/// Code one tokenized field. Hits come out in token order; queries are
/// tried in dictionary order at every position.
pub fn match_tokens(
    tokens: &[Token],
    table: &DictionaryTable,
    date: Option<NaiveDate>,
    options: MatchOptions,
) -> Vec<Hit> {
    let mut hits = Vec::new();
    // Last hit position per concept id, scoped to this invocation.
    let mut last_hit: HashMap<&str, usize> = HashMap::new();

    for w in 0..tokens.len() {
        if !tokens[w].is_word() {
            continue;
        }
        for query in &table.queries {
            if !options.allow_adjacent {
                if let Some(&last) = last_hit.get(query.id.as_str()) {
                    if w <= last + DEDUP_WINDOW {
                        continue;
                    }
                }
            }
            if let Some(window) = query.window {
                match date {
                    Some(d) if window.contains(d) => {}
                    _ => continue,
                }
            }
            if !keyword_matches(query, tokens, w) {
                continue;
            }
            if !criteria_hold(query, tokens, w, table.language) {
                continue;
            }
            trace!(position = w, concept = %query.id, "hit");
            hits.push(Hit::new(w, query.id.clone()));
            last_hit.insert(query.id.as_str(), w);
        }
    }
    hits
}

/// The keyword predicate at position `w`.
fn keyword_matches(query: &ConceptQuery, tokens: &[Token], w: usize) -> bool {
    let word = tokens[w].text.as_str();

    if let Some(affixes) = &query.affixes {
        return affixes.keyword_matches(&query.keyword, word);
    }

    if query.keyword.matches(word) {
        if let Some(rest) = query.keyword.remainder(word) {
            if query.excluded_suffixes.iter().any(|s| s.matches(rest)) {
                return false;
            }
        }
        return precedent_ok(query, tokens, w);
    }

    // Simple-plural shortcut for an untruncated keyword, unless `s` is an
    // excluded suffix.
    if !query.keyword.open_end
        && !query.excluded_suffixes.iter().any(|s| s.matches("s"))
        && query.keyword.plural().matches(word)
    {
        return precedent_ok(query, tokens, w);
    }
    false
}

fn precedent_ok(query: &ConceptQuery, tokens: &[Token], w: usize) -> bool {
    if query.precedents.is_empty() {
        return true;
    }
    if w == 0 {
        return false;
    }
    let previous = &tokens[w - 1];
    previous.is_word()
        && query
            .precedents
            .iter()
            .any(|p| p.matches(&previous.text))
}

/// Evaluate every proximity criterion of the query around position `w`.
///
/// The context window spans `distance` positions on either side of the
/// keyword, clipped to the field; fillers occupy positions but only
/// content tokens can satisfy a literal.
fn criteria_hold(
    query: &ConceptQuery,
    tokens: &[Token],
    w: usize,
    language: Language,
) -> bool {
    for criterion in &query.criteria {
        let lo = w.saturating_sub(criterion.distance);
        let hi = (w + criterion.distance + 1).min(tokens.len());
        let satisfied = criterion.expr.eval(&|pattern| {
            tokens[lo..hi].iter().enumerate().any(|(i, token)| {
                lo + i != w
                    && token.is_word()
                    && morphology::literal_matches(language, pattern, &token.text)
            })
        });
        let ok = match criterion.polarity {
            Polarity::Required => satisfied,
            Polarity::Forbidden => !satisfied,
        };
        if !ok {
            return false;
        }
    }
    true
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::tokenizer::tokenize;
    use pretty_assertions::assert_eq;

    fn code(
        dictionary: &str,
        text: &str,
        language: Language,
        options: MatchOptions,
    ) -> Vec<(usize, String)> {
        let table = compile(dictionary, language).unwrap();
        let tokens = tokenize(text, language);
        match_tokens(&tokens, &table, None, options)
            .into_iter()
            .map(|h| (h.position, h.concept))
            .collect()
    }

    fn positions(hits: &[(usize, String)]) -> Vec<usize> {
        hits.iter().map(|(p, _)| *p).collect()
    }

    const COMBINED: &str = "101\tWord\t\tword*_s(ing) expression_n(free*~5) \
                            term_n(first|second|third|another~5) term*_y(technical~3)";
    const SAMPLE: &str =
        "the word was wording free expression another term technical term";

    #[test]
    fn combined_phrases_with_dedup() {
        let hits = code(COMBINED, SAMPLE, Language::English, MatchOptions::default());
        assert_eq!(positions(&hits), vec![1, 7]);
        assert!(hits.iter().all(|(_, id)| id == "101"));
    }

    #[test]
    fn combined_phrases_adjacent() {
        let hits = code(
            COMBINED,
            SAMPLE,
            Language::English,
            MatchOptions {
                allow_adjacent: true,
            },
        );
        assert_eq!(positions(&hits), vec![1, 7, 9]);
    }

    #[test]
    fn distinct_concepts_do_not_suppress_each_other() {
        let dict = "1\tA\t\talpha\n2\tB\t\tbeta";
        let hits = code(
            dict,
            "alpha beta alpha",
            Language::English,
            MatchOptions::default(),
        );
        assert_eq!(
            hits,
            vec![
                (0, "1".to_string()),
                (1, "2".to_string()),
                // Second alpha is within the dedup window of the first.
            ]
        );
    }

    #[test]
    fn dedup_reopens_after_the_window() {
        let hits = code(
            "1\tA\t\talpha",
            "alpha x x x x x alpha",
            Language::English,
            MatchOptions::default(),
        );
        assert_eq!(positions(&hits), vec![0, 6]);

        let hits = code(
            "1\tA\t\talpha",
            "alpha x x x x alpha",
            Language::English,
            MatchOptions::default(),
        );
        assert_eq!(positions(&hits), vec![0]);
    }

    #[test]
    fn fillers_count_toward_criterion_distance() {
        // "deal" is 4 positions from "peace" across a comma, but the
        // sentence break weighs three positions instead of one.
        let dict = "7\tDeal\t\tdeal_y(peace~4)";
        let hits = code(
            dict,
            "peace ends. The deal",
            Language::English,
            MatchOptions::default(),
        );
        assert!(hits.is_empty());

        let hits = code(
            dict,
            "peace ends, the deal",
            Language::English,
            MatchOptions::default(),
        );
        assert_eq!(positions(&hits), vec![4]);
    }

    #[test]
    fn fillers_never_satisfy_literals() {
        // A comma filler occupies a position but cannot match a literal.
        let dict = "8\tX\t\tx_y(xxcom~2)";
        let hits = code(dict, "x, y", Language::English, MatchOptions::default());
        assert!(hits.is_empty());
    }

    #[test]
    fn forbidden_criterion_suppresses_hit() {
        let dict = "9\tStrike\t\tstrike_n(bowling~4)";
        assert!(code(
            dict,
            "a bowling strike today",
            Language::English,
            MatchOptions::default()
        )
        .is_empty());
        assert_eq!(
            positions(&code(
                dict,
                "a general strike today",
                Language::English,
                MatchOptions::default()
            )),
            vec![2]
        );
    }

    #[test]
    fn plural_shortcut() {
        let hits = code(
            "10\tTank\t\ttank",
            "tanks rolled in",
            Language::English,
            MatchOptions::default(),
        );
        assert_eq!(positions(&hits), vec![0]);
    }

    #[test]
    fn plural_shortcut_blocked_by_excluded_s() {
        let hits = code(
            "10\tTank\t\ttank_s(s)",
            "tanks rolled in",
            Language::English,
            MatchOptions::default(),
        );
        assert!(hits.is_empty());
    }

    #[test]
    fn no_plural_shortcut_for_truncated_keyword() {
        // "fundings" matches "funding*" directly; "funding" must not grow
        // a second plural form "fundingss".
        let table = compile("11\tF\t\tfunding*", Language::English).unwrap();
        let q = &table.queries[0];
        assert!(q.keyword.open_end);
        let tokens = tokenize("fundings", Language::English);
        assert!(keyword_matches(q, &tokens, 0));
    }

    #[test]
    fn excluded_suffix_rejects_truncated_match() {
        let dict = "12\tAid\t\taid*_s(e|es)";
        let hits = code(
            dict,
            "aides delivered aid",
            Language::English,
            MatchOptions::default(),
        );
        assert_eq!(positions(&hits), vec![2]);
    }

    #[test]
    fn excluded_suffix_ignores_end_anchored_match() {
        // "_s" only constrains suffix-truncated matches; "*aid" is
        // anchored at the word end, so a repeated stem earlier in the
        // word must not be mistaken for a remainder.
        let dict = "12\tAid\t\t*aid_s(aid)";
        let hits = code(dict, "aidaid", Language::English, MatchOptions::default());
        assert_eq!(positions(&hits), vec![0]);
    }

    #[test]
    fn required_precedent() {
        let dict = "13\tGS\t\tstrike_p(general|nationwide)";
        assert_eq!(
            positions(&code(
                dict,
                "a general strike began",
                Language::English,
                MatchOptions::default()
            )),
            vec![2]
        );
        assert!(code(
            dict,
            "a hunger strike began",
            Language::English,
            MatchOptions::default()
        )
        .is_empty());
        // No previous token at the start of the field.
        assert!(code(dict, "strike", Language::English, MatchOptions::default()).is_empty());
    }

    #[test]
    fn precedent_must_be_a_content_token() {
        let dict = "13\tGS\t\tstrike_p(general)";
        assert!(code(
            dict,
            "general, strike",
            Language::English,
            MatchOptions::default()
        )
        .is_empty());
    }

    #[test]
    fn date_window_filters_hits() {
        let table = compile(
            "14\tVote\t01/03/14-30/06/14\tballot",
            Language::English,
        )
        .unwrap();
        let tokens = tokenize("the ballot opened", Language::English);
        let inside = NaiveDate::from_ymd_opt(2014, 5, 2).unwrap();
        let outside = NaiveDate::from_ymd_opt(2014, 8, 2).unwrap();
        assert_eq!(
            match_tokens(&tokens, &table, Some(inside), MatchOptions::default()).len(),
            1
        );
        assert!(match_tokens(&tokens, &table, Some(outside), MatchOptions::default()).is_empty());
        // A windowed query needs a document date at all.
        assert!(match_tokens(&tokens, &table, None, MatchOptions::default()).is_empty());
    }

    #[test]
    fn recurring_window_matches_every_year() {
        let table = compile(
            "15\tHoliday\t15/12/99-15/01/99\tcelebration",
            Language::English,
        )
        .unwrap();
        let tokens = tokenize("a celebration", Language::English);
        for year in [2009, 2015, 2021] {
            let date = NaiveDate::from_ymd_opt(year, 12, 20).unwrap();
            assert_eq!(
                match_tokens(&tokens, &table, Some(date), MatchOptions::default()).len(),
                1,
                "year {year}"
            );
        }
        let off = NaiveDate::from_ymd_opt(2015, 6, 20).unwrap();
        assert!(match_tokens(&tokens, &table, Some(off), MatchOptions::default()).is_empty());
    }

    #[test]
    fn hebrew_morphological_pipeline() {
        let hits = code(
            "20\tFriend\t\tחבר",
            "החברים באו",
            Language::Hebrew,
            MatchOptions::default(),
        );
        assert_eq!(positions(&hits), vec![0]);
    }

    #[test]
    fn hebrew_criterion_literal_with_prefix() {
        let hits = code(
            "21\tPeaceTalk\t\tשיחות_y(שלום~3)",
            "שיחות לשלום נמשכות",
            Language::Hebrew,
            MatchOptions::default(),
        );
        assert_eq!(positions(&hits), vec![0]);
    }

    #[test]
    fn arabic_morphological_pipeline() {
        let hits = code(
            "22\tSecurity\t\tامن",
            "قوات الامن وصلت",
            Language::Arabic,
            MatchOptions::default(),
        );
        assert_eq!(positions(&hits), vec![1]);
    }

    #[test]
    fn empty_tokens_no_hits() {
        let table = compile("1\tA\t\talpha", Language::English).unwrap();
        assert!(match_tokens(&[], &table, None, MatchOptions::default()).is_empty());
    }
}
