//! Annotated text: the tokenized field rendered back to readable prose,
//! with each recognized concept's name in parentheses after the hit word.

use crate::ast::{DictionaryTable, Filler, TokenKind};

use super::CodedField;

/// Render one coded field. Punctuation is restored from the filler
/// tokens; pads disappear.
pub fn render(field: &CodedField, table: &DictionaryTable) -> String {
    let mut out = String::new();
    for (w, token) in field.tokens.iter().enumerate() {
        match token.kind {
            TokenKind::Word => {
                out.push_str(&token.text);
                for hit in field.hits.iter().filter(|h| h.position == w) {
                    let name = table
                        .concept_name(&hit.concept)
                        .unwrap_or(hit.concept.as_str());
                    out.push('(');
                    out.push_str(name);
                    out.push(')');
                }
                out.push(' ');
            }
            TokenKind::Filler(f) => match f {
                Filler::Pad => {}
                Filler::Period => attach(&mut out, ". "),
                Filler::Exclamation => attach(&mut out, "! "),
                Filler::Question => attach(&mut out, "? "),
                Filler::Comma => attach(&mut out, ", "),
                Filler::Colon => attach(&mut out, ": "),
                Filler::Semicolon => attach(&mut out, "; "),
                Filler::Paragraph => attach(&mut out, "\n"),
                Filler::Apostrophe => attach(&mut out, "'"),
                Filler::Dash => out.push_str("- "),
                Filler::QuoteOpen => out.push('“'),
                Filler::QuoteClose => attach(&mut out, "” "),
            },
        }
    }
    out.trim().to_string()
}

/// Append a punctuation mark glued to the preceding word.
fn attach(out: &mut String, mark: &str) {
    while out.ends_with(' ') {
        out.pop();
    }
    out.push_str(mark);
}
