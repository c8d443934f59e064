//! Term-document matrix: one row of per-concept hit counts per document.
//!
//! Two styles. `simple`: a single `id,<concept ids...>` header. `extended`:
//! two header rows (concept names, then ids) and `id,medium,date` columns
//! in every row.

use crate::ast::DictionaryTable;

use super::CodedDocument;

pub fn simple_header(table: &DictionaryTable) -> String {
    let mut cols = vec!["id".to_string()];
    cols.extend(table.concept_ids.iter().cloned());
    cols.join(",")
}

pub fn simple_row(document: &CodedDocument, table: &DictionaryTable) -> String {
    let mut cols = vec![document.id.to_string()];
    cols.extend(counts(document, table).iter().map(usize::to_string));
    cols.join(",")
}

pub fn extended_header(table: &DictionaryTable) -> String {
    let mut names = vec![String::new(), String::new(), String::new()];
    let mut ids = vec!["id".to_string(), "medium".to_string(), "date".to_string()];
    for id in &table.concept_ids {
        let name = table.concept_name(id).unwrap_or("");
        names.push(name.replace(',', " "));
        ids.push(id.clone());
    }
    format!("{}\n{}", names.join(","), ids.join(","))
}

pub fn extended_row(document: &CodedDocument, table: &DictionaryTable) -> String {
    let date = document
        .date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    let mut cols = vec![
        document.id.to_string(),
        document.medium.replace(',', " "),
        date,
    ];
    cols.extend(counts(document, table).iter().map(usize::to_string));
    cols.join(",")
}

/// Hit counts per concept id, all three fields combined, in
/// `concept_ids` order.
fn counts(document: &CodedDocument, table: &DictionaryTable) -> Vec<usize> {
    let mut counts = vec![0usize; table.concept_ids.len()];
    for (field, _) in document.fields() {
        for hit in &field.hits {
            if let Some(slot) = table.concept_ids.iter().position(|id| id == &hit.concept) {
                counts[slot] += 1;
            }
        }
    }
    counts
}
