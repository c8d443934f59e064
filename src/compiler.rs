//! Dictionary source → compiled [`DictionaryTable`].
//!
//! A dictionary is a tab-delimited text file, one concept per line:
//!
//! ```text
//! <id> TAB <name> TAB [dd/mm/yy-dd/mm/yy] TAB <phrase> [<phrase> ...]
//! ```
//!
//! Each phrase is a keyword optionally followed by `_`-joined tags:
//! `t(<date range>)` (validity window, overrides the line's),
//! `p(...)`/`s(...)` (precedent words / excluded suffixes, or excluded
//! affixes in the morphological languages), and repeatable
//! `y(<expr>~<distance>)` / `n(<expr>~<distance>)` proximity criteria.
//! Criterion expressions combine words with `&` and `|` inside brackets;
//! one bracket carries one operator and at least two operands, and nesting
//! is bounded by [`MAX_BRACKET_DEPTH`].
//!
//! Compilation is all-or-nothing: the first malformed record aborts with a
//! [`DictionaryError`] naming the line and phrase.

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, one_of},
    combinator::map,
    multi::many0,
    sequence::{delimited, pair},
    IResult,
};
use tracing::info;

use crate::ast::{
    BoolExpr, ConceptQuery, DateWindow, DictionaryTable, Polarity, ProximityCriterion,
    SuffixPattern, WordPattern, RECURRING_YEAR,
};
use crate::error::{DictionaryError, PhraseError, MAX_BRACKET_DEPTH};
use crate::language::Language;
use crate::morphology::EffectiveAffixes;

/// Language of a dictionary named `DICT_<name>.txt`: the last two
/// characters of `<name>`.
pub fn dictionary_language(name: &str) -> Option<Language> {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() < 3 {
        return None;
    }
    let code: String = chars[chars.len() - 2..].iter().collect();
    Language::from_code(&code)
}

/// Compile a whole dictionary. Blank lines are skipped; line numbers in
/// errors are 1-based.
pub fn compile(source: &str, language: Language) -> Result<DictionaryTable, DictionaryError> {
    let mut queries = Vec::new();
    for (idx, raw_line) in source.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        compile_line(line, line_no, language, &mut queries)?;
    }
    let table = DictionaryTable::new(language, queries);
    info!(
        language = table.language.code(),
        queries = table.len(),
        concepts = table.concept_ids.len(),
        "dictionary compiled"
    );
    Ok(table)
}

fn compile_line(
    line: &str,
    line_no: usize,
    language: Language,
    queries: &mut Vec<ConceptQuery>,
) -> Result<(), DictionaryError> {
    let columns: Vec<&str> = line.split('\t').collect();
    if columns.len() != 4 {
        return Err(DictionaryError::MissingColumns {
            line: line_no,
            found: columns.len(),
        });
    }
    let (id, name, window_col, phrases) = (columns[0], columns[1], columns[2], columns[3]);

    let line_window = if window_col.trim().is_empty() {
        None
    } else {
        Some(
            parse_date_range(window_col.trim()).map_err(|_| DictionaryError::BadDateRange {
                line: line_no,
                value: window_col.trim().to_string(),
            })?,
        )
    };

    // Phrases live in the same normalized character space as tokens.
    let phrases = language.normalize(phrases);
    for phrase in phrases.split_whitespace() {
        let query = compile_phrase(phrase, id, name, language, line_window)
            .map_err(|kind| DictionaryError::phrase(line_no, phrase, kind))?;
        queries.push(query);
    }
    Ok(())
}

fn compile_phrase(
    phrase: &str,
    id: &str,
    name: &str,
    language: Language,
    line_window: Option<DateWindow>,
) -> Result<ConceptQuery, PhraseError> {
    let mut parts = phrase.split('_');
    let keyword = WordPattern::parse(parts.next().unwrap_or(""))
        .ok_or(PhraseError::EmptyKeyword)?;

    let mut phrase_window: Option<DateWindow> = None;
    let mut excluded_prefixes: Vec<String> = Vec::new();
    let mut excluded_suffixes: Vec<String> = Vec::new();
    let mut seen = (false, false, false); // t, p, s
    let mut criteria = Vec::new();

    for tag in parts {
        let (head, body) = split_tag(tag)?;
        match head {
            't' => {
                if seen.0 {
                    return Err(PhraseError::DuplicateTag('t'));
                }
                seen.0 = true;
                phrase_window = Some(
                    parse_date_range(body)
                        .map_err(|_| PhraseError::BadDateRange(body.to_string()))?,
                );
            }
            'p' => {
                if seen.1 {
                    return Err(PhraseError::DuplicateTag('p'));
                }
                seen.1 = true;
                excluded_prefixes = body.split('|').map(str::to_string).collect();
            }
            's' => {
                if seen.2 {
                    return Err(PhraseError::DuplicateTag('s'));
                }
                seen.2 = true;
                excluded_suffixes = body.split('|').map(str::to_string).collect();
            }
            'y' => criteria.push(parse_criterion(body, Polarity::Required)?),
            'n' => criteria.push(parse_criterion(body, Polarity::Forbidden)?),
            _ => return Err(PhraseError::UnknownTag(head.to_string())),
        }
    }

    let (precedents, suffix_patterns, affixes) = if language.is_morphological() {
        let affixes =
            EffectiveAffixes::for_query(language, &excluded_prefixes, &excluded_suffixes);
        (Vec::new(), Vec::new(), affixes)
    } else {
        let precedents = excluded_prefixes
            .iter()
            .filter_map(|p| WordPattern::parse(p))
            .collect();
        let suffixes = excluded_suffixes
            .iter()
            .filter_map(|s| SuffixPattern::parse(s))
            .collect();
        (precedents, suffixes, None)
    };

    Ok(ConceptQuery {
        id: id.to_string(),
        name: name.to_string(),
        keyword,
        window: phrase_window.or(line_window),
        criteria,
        precedents,
        excluded_suffixes: suffix_patterns,
        affixes,
    })
}

/// Split a raw tag into its letter and the body between the brackets.
fn split_tag(tag: &str) -> Result<(char, &str), PhraseError> {
    let mut chars = tag.chars();
    let head = chars.next().ok_or_else(|| PhraseError::UnknownTag(String::new()))?;
    let rest = chars.as_str();
    if !rest.starts_with('(') || !tag.ends_with(')') {
        return Err(PhraseError::UnknownTag(tag.to_string()));
    }
    Ok((head, &rest[1..rest.len() - 1]))
}

// =============================================================================
// DATE RANGES
// =============================================================================

/// Parse `dd/mm/yy-dd/mm/yy`. A `from` year of 99 marks a window that
/// recurs every year.
fn parse_date_range(raw: &str) -> Result<DateWindow, ()> {
    let (from_raw, to_raw) = raw.split_once('-').ok_or(())?;
    let (fd, fm, fy) = parse_date_parts(from_raw)?;
    let (td, tm, ty) = parse_date_parts(to_raw)?;
    if fy == RECURRING_YEAR {
        // Validate month/day against a leap year so 29/02 is legal.
        for (m, d) in [(fm, fd), (tm, td)] {
            chrono::NaiveDate::from_ymd_opt(2000, m, d).ok_or(())?;
        }
        Ok(DateWindow::Recurring {
            from: (fm, fd),
            to: (tm, td),
        })
    } else {
        let from = chrono::NaiveDate::from_ymd_opt(fy, fm, fd).ok_or(())?;
        let to = chrono::NaiveDate::from_ymd_opt(ty, tm, td).ok_or(())?;
        Ok(DateWindow::Fixed { from, to })
    }
}

fn parse_date_parts(raw: &str) -> Result<(u32, u32, i32), ()> {
    let mut parts = raw.trim().split('/');
    let day: u32 = parts.next().ok_or(())?.parse().map_err(|_| ())?;
    let month: u32 = parts.next().ok_or(())?.parse().map_err(|_| ())?;
    let yy: i32 = parts.next().ok_or(())?.parse().map_err(|_| ())?;
    if parts.next().is_some() {
        return Err(());
    }
    Ok((day, month, 2000 + yy))
}

// =============================================================================
// CRITERION EXPRESSIONS
// =============================================================================

fn parse_criterion(body: &str, polarity: Polarity) -> Result<ProximityCriterion, PhraseError> {
    let (expr_src, dist_src) = body.rsplit_once('~').ok_or(PhraseError::MissingDistance)?;
    let distance: usize = dist_src
        .parse()
        .map_err(|_| PhraseError::BadDistance(dist_src.to_string()))?;
    let expr = parse_expression(expr_src)?;
    if expr.depth() > MAX_BRACKET_DEPTH {
        return Err(PhraseError::TooDeep);
    }
    Ok(ProximityCriterion {
        polarity,
        distance,
        expr,
    })
}

/// Raw parse tree: operands joined by the operators between them, before
/// the single-operator and operand-count rules are enforced.
#[derive(Debug)]
enum RawExpr {
    Word(String),
    Group(RawSeq),
}

#[derive(Debug)]
struct RawSeq {
    operands: Vec<RawExpr>,
    operators: Vec<char>,
}

fn word(input: &str) -> IResult<&str, RawExpr> {
    map(
        take_while1(|c: char| !matches!(c, '&' | '|' | '(' | ')' | '~')),
        |w: &str| RawExpr::Word(w.to_string()),
    )(input)
}

fn group(input: &str) -> IResult<&str, RawExpr> {
    map(delimited(char('('), sequence, char(')')), RawExpr::Group)(input)
}

fn operand(input: &str) -> IResult<&str, RawExpr> {
    alt((group, word))(input)
}

fn sequence(input: &str) -> IResult<&str, RawSeq> {
    map(
        pair(operand, many0(pair(one_of("&|"), operand))),
        |(first, rest)| {
            let mut operands = vec![first];
            let mut operators = Vec::new();
            for (op, next) in rest {
                operators.push(op);
                operands.push(next);
            }
            RawSeq { operands, operators }
        },
    )(input)
}

fn parse_expression(src: &str) -> Result<BoolExpr, PhraseError> {
    let opens = src.matches('(').count();
    let closes = src.matches(')').count();
    if opens != closes {
        return Err(PhraseError::UnbalancedBrackets);
    }
    match sequence(src) {
        Ok(("", seq)) => lower_sequence(seq, true),
        Ok((rest, _)) => {
            if rest.starts_with(')') {
                Err(PhraseError::UnbalancedBrackets)
            } else {
                Err(PhraseError::Malformed(rest.to_string()))
            }
        }
        Err(_) => Err(PhraseError::Malformed(src.to_string())),
    }
}

fn lower_sequence(seq: RawSeq, top: bool) -> Result<BoolExpr, PhraseError> {
    let has_and = seq.operators.contains(&'&');
    let has_or = seq.operators.contains(&'|');
    if has_and && has_or {
        return Err(PhraseError::MixedOperators);
    }
    if !top && seq.operands.len() < 2 {
        return Err(PhraseError::SingleOperandBracket);
    }
    let mut children = Vec::with_capacity(seq.operands.len());
    for operand in seq.operands {
        children.push(lower_operand(operand)?);
    }
    if children.len() == 1 {
        return Ok(children.pop().unwrap());
    }
    Ok(if has_and {
        BoolExpr::All(children)
    } else {
        BoolExpr::Any(children)
    })
}

fn lower_operand(operand: RawExpr) -> Result<BoolExpr, PhraseError> {
    match operand {
        RawExpr::Word(w) => WordPattern::parse(&w)
            .map(BoolExpr::Word)
            .ok_or(PhraseError::EmptyWord),
        RawExpr::Group(seq) => lower_sequence(seq, false),
    }
}

// =============================================================================
// TESTS
// =============================================================================
