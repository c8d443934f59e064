//! Keyword-in-context rows: `<concept id>,<name>,<before>,<keyword>,<after>`
//! per hit, with `bandwidth` token positions of context on either side.
//! Concepts without a single hit in a document still get one empty row, so
//! every concept is visible in the sorted output.

use crate::ast::{DictionaryTable, Hit};

use super::{token_display, CodedDocument, CodedField};

pub const DEFAULT_BANDWIDTH: usize = 5;

/// All KWIC rows of one document, grouped by concept id in table order.
pub fn rows(
    document: &CodedDocument,
    table: &DictionaryTable,
    bandwidth: usize,
) -> Vec<String> {
    let mut grouped: Vec<Vec<String>> = vec![Vec::new(); table.concept_ids.len()];
    for (field, _) in document.fields() {
        for hit in &field.hits {
            if let Some(slot) = table.concept_ids.iter().position(|id| id == &hit.concept) {
                grouped[slot].push(row(hit, field, table, bandwidth));
            }
        }
    }
    let mut out = Vec::new();
    for (slot, instances) in grouped.into_iter().enumerate() {
        if instances.is_empty() {
            let id = &table.concept_ids[slot];
            let name = table.concept_name(id).unwrap_or("");
            out.push(format!("{id},{name},,,"));
        } else {
            out.extend(instances);
        }
    }
    out
}

fn row(hit: &Hit, field: &CodedField, table: &DictionaryTable, bandwidth: usize) -> String {
    let keyword = field
        .tokens
        .get(hit.position)
        .map(|t| t.text.as_str())
        .unwrap_or("");
    let lo = hit.position.saturating_sub(bandwidth);
    let hi = (hit.position + bandwidth + 1).min(field.tokens.len());
    let before = context(&field.tokens[lo..hit.position]);
    let after = context(&field.tokens[hit.position + 1..hi]);
    let name = table.concept_name(&hit.concept).unwrap_or("");
    format!("{},{name},{before},{keyword},{after}", hit.concept)
}

fn context(tokens: &[crate::ast::Token]) -> String {
    tokens
        .iter()
        .filter_map(token_display)
        .collect::<Vec<_>>()
        .join(" ")
}
