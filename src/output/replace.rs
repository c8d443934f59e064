//! Replaced text: each field reduced to the sequence of recognized
//! concept ids, one tab-separated record per document.

use super::CodedDocument;

pub fn render(document: &CodedDocument) -> String {
    let fields: Vec<String> = document
        .fields()
        .iter()
        .map(|(field, _)| {
            field
                .hits
                .iter()
                .map(|h| h.concept.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect();
    format!("{}\t{}\t{}\t{}", document.id, fields[0], fields[1], fields[2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Hit;
    use crate::output::CodedField;

    #[test]
    fn concept_id_stream_per_field() {
        let doc = CodedDocument {
            id: 5,
            medium: String::new(),
            date: None,
            title: CodedField {
                tokens: vec![],
                hits: vec![Hit::new(0, "102")],
            },
            subtitle: CodedField::default(),
            body: CodedField {
                tokens: vec![],
                hits: vec![
                    Hit::new(2, "102"),
                    Hit::new(9, "101"),
                    Hit::new(20, "102"),
                ],
            },
        };
        assert_eq!(render(&doc), "5\t102\t\t102 101 102");
    }
}
