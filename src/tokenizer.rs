//! Text field → position-indexed token list.
//!
//! The tokenizer turns a raw text field into words plus synthetic filler
//! tokens that give punctuation a distance weight: a paragraph break costs
//! five positions, a sentence end three, a clause break one. Proximity
//! criteria in the matcher therefore "pay" to cross syntactic boundaries
//! without any grammatical analysis.
//!
//! Tokenization is total. Unrecognized characters stay inside their word
//! token unchanged.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::{Filler, Token};
use crate::language::Language;

// Internal sentinels from the private use area, so marker text can never
// collide with document content.
const M_PAR: &str = "\u{e000}";
const M_PAD: &str = "\u{e001}";
const M_DOT: &str = "\u{e002}";
const M_EXC: &str = "\u{e003}";
const M_QUE: &str = "\u{e004}";
const M_COM: &str = "\u{e005}";
const M_COL: &str = "\u{e006}";
const M_SEM: &str = "\u{e007}";
const M_APO: &str = "\u{e008}";
const M_DASH: &str = "\u{e009}";
const M_LQU: &str = "\u{e00a}";
const M_RQU: &str = "\u{e00b}";
const M_ACRONYM: char = '\u{e00c}';

static IN_WORD_QUOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(\w)['"]+(\w)"#).unwrap());
static IN_WORD_APOSTROPHE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w)'(\w)").unwrap());

/// Tokenize one text field. Empty input yields an empty list.
pub fn tokenize(text: &str, language: Language) -> Vec<Token> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let text = straighten_quotes(text);
    let text = pad_symbols(&text);
    let mut text = language.normalize(&text);

    if language.is_morphological() {
        // Quotes inside a word mark acronyms; shield them from quote and
        // apostrophe handling and restore them after splitting.
        text = replace_until_stable(&IN_WORD_QUOTE, &text, &format!("${{1}}{M_ACRONYM}${{2}}"));
    }
    if language.drops_possessive() {
        text = text.replace("'s ", " ");
    }
    if language.splits_apostrophes() {
        text = replace_until_stable(&IN_WORD_APOSTROPHE, &text, "$1 $2");
    }

    let text = mark_quote_edges(&text);

    let mut text = format!("{text} ");
    text = text.replace("\n \n", "\n");
    while text.contains("\n\n") {
        text = text.replace("\n\n", "\n");
    }
    let text = text
        .replace('\n', &format!(" {M_PAR} {M_PAD} {M_PAD} {M_PAD} {M_PAD} "))
        .replace('\'', &format!(" {M_APO} "))
        .replace('-', &format!(" {M_DASH} "))
        .replace(". ", &format!(" {M_DOT} {M_PAD} {M_PAD} "))
        .replace("! ", &format!(" {M_EXC} {M_PAD} {M_PAD} "))
        .replace("? ", &format!(" {M_QUE} {M_PAD} {M_PAD} "))
        .replace(", ", &format!(" {M_COM} "))
        .replace(": ", &format!(" {M_COL} "))
        .replace("; ", &format!(" {M_SEM} "));

    text.split_whitespace()
        .map(|raw| match raw {
            _ if raw == M_PAR => Token::filler(Filler::Paragraph),
            _ if raw == M_PAD => Token::filler(Filler::Pad),
            _ if raw == M_DOT => Token::filler(Filler::Period),
            _ if raw == M_EXC => Token::filler(Filler::Exclamation),
            _ if raw == M_QUE => Token::filler(Filler::Question),
            _ if raw == M_COM => Token::filler(Filler::Comma),
            _ if raw == M_COL => Token::filler(Filler::Colon),
            _ if raw == M_SEM => Token::filler(Filler::Semicolon),
            _ if raw == M_APO => Token::filler(Filler::Apostrophe),
            _ if raw == M_DASH => Token::filler(Filler::Dash),
            _ if raw == M_LQU => Token::filler(Filler::QuoteOpen),
            _ if raw == M_RQU => Token::filler(Filler::QuoteClose),
            _ => Token::word(raw.replace(M_ACRONYM, "\"")),
        })
        .collect()
}

/// Normalize typographic apostrophes and quotation marks to their straight
/// ASCII forms (guillemets included).
fn straighten_quotes(text: &str) -> String {
    text.replace(['’', '‘', '´', '`'], "'")
        .replace(['“', '”'], "\"")
        .replace("« ", "\"")
        .replace(" »", "\"")
        .replace(['«', '»'], "\"")
}

/// Detach free-standing symbols so they become their own tokens.
fn pad_symbols(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(
            c,
            '%' | '$' | '€' | '&' | '@' | '#' | '*' | '(' | ')' | '[' | ']' | '{' | '}'
        ) {
            out.push(' ');
            out.push(c);
            out.push(' ');
        } else {
            out.push(c);
        }
    }
    out
}

fn replace_until_stable(re: &Regex, text: &str, rep: &str) -> String {
    let mut out = text.to_string();
    loop {
        let next = re.replace_all(&out, rep).into_owned();
        if next == out {
            return next;
        }
        out = next;
    }
}

/// Turn double quotes that open or close a quotation into filler markers.
/// Quotes in any other position (weights, inch marks, protected acronyms)
/// are left alone.
fn mark_quote_edges(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        if c != '"' {
            out.push(c);
            continue;
        }
        let prev = if i == 0 { None } else { Some(chars[i - 1]) };
        let next = chars.get(i + 1).copied();
        let opens = prev.map_or(true, |p| p.is_whitespace())
            && next.map_or(false, is_word_char);
        let closes = prev.map_or(false, |p| is_word_char(p) || is_clause_mark(p))
            && next.map_or(true, |n| n.is_whitespace() || is_clause_mark(n));
        if opens {
            out.push(' ');
            out.push_str(M_LQU);
            out.push(' ');
        } else if closes {
            out.push(' ');
            out.push_str(M_RQU);
            out.push(' ');
        } else {
            out.push(c);
        }
    }
    out
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_clause_mark(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | ':' | ';' | ',')
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::TokenKind;

    fn words(tokens: &[Token]) -> Vec<&str> {
        tokens
            .iter()
            .filter(|t| t.is_word())
            .map(|t| t.text.as_str())
            .collect()
    }

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn empty_and_blank_input() {
        assert!(tokenize("", Language::English).is_empty());
        assert!(tokenize("   \n  ", Language::English).is_empty());
    }

    #[test]
    fn sentence_end_weighs_three_positions() {
        let tokens = tokenize("One end. Two", Language::English);
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Word,
                TokenKind::Word,
                TokenKind::Filler(Filler::Period),
                TokenKind::Filler(Filler::Pad),
                TokenKind::Filler(Filler::Pad),
                TokenKind::Word,
            ]
        );
        assert_eq!(words(&tokens), vec!["one", "end", "two"]);
    }

    #[test]
    fn paragraph_weighs_five_positions() {
        let tokens = tokenize("up\ndown", Language::English);
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Word,
                TokenKind::Filler(Filler::Paragraph),
                TokenKind::Filler(Filler::Pad),
                TokenKind::Filler(Filler::Pad),
                TokenKind::Filler(Filler::Pad),
                TokenKind::Filler(Filler::Pad),
                TokenKind::Word,
            ]
        );
    }

    #[test]
    fn clause_breaks_weigh_one_position() {
        let tokens = tokenize("a, b: c; d", Language::English);
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Word,
                TokenKind::Filler(Filler::Comma),
                TokenKind::Word,
                TokenKind::Filler(Filler::Colon),
                TokenKind::Word,
                TokenKind::Filler(Filler::Semicolon),
                TokenKind::Word,
            ]
        );
    }

    #[test]
    fn trailing_sentence_mark() {
        let tokens = tokenize("the end.", Language::English);
        assert_eq!(words(&tokens), vec!["the", "end"]);
        assert_eq!(tokens[2].kind, TokenKind::Filler(Filler::Period));
        assert_eq!(tokens.len(), 5);
    }

    #[test]
    fn english_possessive_and_contraction() {
        assert_eq!(
            words(&tokenize("John's car", Language::English)),
            vec!["john", "car"]
        );
        assert_eq!(
            words(&tokenize("don't panic", Language::English)),
            vec!["don", "t", "panic"]
        );
    }

    #[test]
    fn trailing_apostrophe_becomes_filler() {
        let tokens = tokenize("dogs' tails", Language::English);
        assert_eq!(words(&tokens), vec!["dogs", "tails"]);
        assert_eq!(tokens[1].kind, TokenKind::Filler(Filler::Apostrophe));
    }

    #[test]
    fn french_elision_splits() {
        assert_eq!(
            words(&tokenize("l'état c'est moi", Language::French)),
            vec!["l", "état", "c", "est", "moi"]
        );
    }

    #[test]
    fn quotation_marks_become_fillers() {
        let tokens = tokenize("he said \"peace now\" loudly", Language::English);
        assert_eq!(words(&tokens), vec!["he", "said", "peace", "now", "loudly"]);
        assert_eq!(tokens[2].kind, TokenKind::Filler(Filler::QuoteOpen));
        assert_eq!(tokens[5].kind, TokenKind::Filler(Filler::QuoteClose));
    }

    #[test]
    fn curly_quotes_are_straightened() {
        let tokens = tokenize("“peace” talks", Language::English);
        assert_eq!(tokens[0].kind, TokenKind::Filler(Filler::QuoteOpen));
        assert_eq!(words(&tokens), vec!["peace", "talks"]);
    }

    #[test]
    fn dash_becomes_filler() {
        let tokens = tokenize("well-known", Language::English);
        assert_eq!(words(&tokens), vec!["well", "known"]);
        assert_eq!(tokens[1].kind, TokenKind::Filler(Filler::Dash));
    }

    #[test]
    fn symbols_are_detached() {
        assert_eq!(
            words(&tokenize("a 50% cut (net)", Language::English)),
            vec!["a", "50", "%", "cut", "(", "net", ")"]
        );
    }

    #[test]
    fn hebrew_acronym_quote_survives() {
        let tokens = tokenize("חיילי צה\"ל חזרו", Language::Hebrew);
        assert_eq!(words(&tokens), vec!["חיילי", "צה\"ל", "חזרו"]);
    }

    #[test]
    fn serbian_text_is_transliterated() {
        assert_eq!(
            words(&tokenize("Чачак и Ниш", Language::Serbian)),
            vec!["chachak", "i", "nish"]
        );
    }

    #[test]
    fn decimal_points_stay_inside_words() {
        assert_eq!(
            words(&tokenize("rose by 3.5 points", Language::English)),
            vec!["rose", "by", "3.5", "points"]
        );
    }
}
