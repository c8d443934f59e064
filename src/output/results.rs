//! The primary results list: one CSV line per hit,
//! `<doc id>,<field><position>,<concept id>`, title hits first, then
//! subtitle, then body.

use super::CodedDocument;

pub fn render(document: &CodedDocument) -> String {
    let mut out = String::new();
    for (field, prefix) in document.fields() {
        for hit in &field.hits {
            out.push_str(&format!(
                "{},{}{},{}\n",
                document.id, prefix, hit.position, hit.concept
            ));
        }
    }
    out
}
