//! Result serializers.
//!
//! Every serializer consumes the same input: a [`CodedDocument`] holding
//! the tokens and hits of the three text fields, plus the compiled table
//! for concept names. They only format; nothing here re-runs matching.

pub mod annotate;
pub mod kwic;
pub mod matrix;
pub mod replace;
pub mod results;

use chrono::NaiveDate;

use crate::ast::{Filler, Hit, Token, TokenKind};

/// One coded text field: its tokens and the hits found in them.
#[derive(Debug, Clone, Default)]
pub struct CodedField {
    pub tokens: Vec<Token>,
    pub hits: Vec<Hit>,
}

/// A fully coded document, ready for serialization.
#[derive(Debug, Clone)]
pub struct CodedDocument {
    pub id: u64,
    pub medium: String,
    pub date: Option<NaiveDate>,
    pub title: CodedField,
    pub subtitle: CodedField,
    pub body: CodedField,
}

impl CodedDocument {
    pub fn fields(&self) -> [(&CodedField, char); 3] {
        [(&self.title, 't'), (&self.subtitle, 's'), (&self.body, 'a')]
    }
}

/// Compact display form of a token for context output. Pads vanish;
/// punctuation fillers come back as their mark.
pub(crate) fn token_display(token: &Token) -> Option<&str> {
    match token.kind {
        TokenKind::Word => Some(token.text.as_str()),
        TokenKind::Filler(f) => match f {
            Filler::Pad => None,
            Filler::Period => Some("."),
            Filler::Exclamation => Some("!"),
            Filler::Question => Some("?"),
            Filler::Comma => Some(","),
            Filler::Colon => Some(":"),
            Filler::Semicolon => Some(";"),
            Filler::Paragraph => Some("|"),
            Filler::Apostrophe => Some("'"),
            Filler::Dash => Some("-"),
            Filler::QuoteOpen | Filler::QuoteClose => Some("\""),
        },
    }
}
