//! Corpus input: document records, the JSONL reader, and the per-document
//! dictionary index for multi-dictionary runs.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Corpus input failures. Line numbers are 1-based.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: invalid document record: {source}")]
    Record {
        path: String,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path}:{line}: invalid index line (expected '<doc id>,<dictionary>')")]
    IndexLine { path: String, line: usize },
}

/// One corpus document. Absent fields default to empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: u64,
    #[serde(default)]
    pub medium: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub body: String,
}

/// The three coded text fields of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Subtitle,
    Body,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Title, Field::Subtitle, Field::Body];

    /// Field marker used in result lines (`t`/`s`/`a`).
    pub fn prefix(&self) -> char {
        match self {
            Field::Title => 't',
            Field::Subtitle => 's',
            Field::Body => 'a',
        }
    }

    pub fn text<'a>(&self, document: &'a Document) -> &'a str {
        match self {
            Field::Title => &document.title,
            Field::Subtitle => &document.subtitle,
            Field::Body => &document.body,
        }
    }
}

/// Read a JSONL corpus file, one document per line. Blank lines are
/// skipped, as are documents with `id` below `from`.
pub fn read_corpus(path: &Path, from: u64) -> Result<Vec<Document>, CorpusError> {
    // Not named `display`: tracing macros expand that identifier to
    // `tracing::field::display` and the log line below stops compiling.
    let path_str = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| CorpusError::Io {
        path: path_str.clone(),
        source,
    })?;
    let mut documents = Vec::new();
    for (idx, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let document: Document =
            serde_json::from_str(line).map_err(|source| CorpusError::Record {
                path: path_str.clone(),
                line: idx + 1,
                source,
            })?;
        if document.id >= from {
            documents.push(document);
        }
    }
    info!(path = %path_str, documents = documents.len(), "corpus loaded");
    Ok(documents)
}

/// Per-document dictionary assignment: a CSV of `<doc id>,<dictionary
/// name>` lines.
#[derive(Debug, Clone, Default)]
pub struct LanguageIndex {
    assignments: HashMap<u64, String>,
    /// Distinct dictionary names in first-seen order.
    names: Vec<String>,
}

impl LanguageIndex {
    pub fn load(path: &Path) -> Result<Self, CorpusError> {
        let path_str = path.display().to_string();
        let raw = fs::read_to_string(path).map_err(|source| CorpusError::Io {
            path: path_str.clone(),
            source,
        })?;
        let mut index = LanguageIndex::default();
        for (idx, line) in raw.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let parsed = line.split_once(',').and_then(|(id, name)| {
                let id: u64 = id.trim().parse().ok()?;
                let name = name.trim();
                if name.is_empty() {
                    None
                } else {
                    Some((id, name.to_string()))
                }
            });
            let (id, name) = parsed.ok_or(CorpusError::IndexLine {
                path: path_str.clone(),
                line: idx + 1,
            })?;
            if !index.names.contains(&name) {
                index.names.push(name.clone());
            }
            index.assignments.insert(id, name);
        }
        Ok(index)
    }

    pub fn dictionary_for(&self, id: u64) -> Option<&str> {
        self.assignments.get(&id).map(String::as_str)
    }

    pub fn dictionary_names(&self) -> &[String] {
        &self.names
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn corpus_file(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    #[test]
    fn reads_documents_in_order() {
        let file = corpus_file(&[
            r#"{"id":1,"medium":"Daily","date":"2014-05-02","title":"A","subtitle":"","body":"text one"}"#,
            "",
            r#"{"id":2,"title":"B","body":"text two"}"#,
        ]);
        let docs = read_corpus(file.path(), 0).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].date, NaiveDate::from_ymd_opt(2014, 5, 2));
        assert_eq!(docs[1].medium, "");
        assert_eq!(docs[1].date, None);
    }

    #[test]
    fn from_threshold_skips_earlier_ids() {
        let file = corpus_file(&[
            r#"{"id":10,"body":"a"}"#,
            r#"{"id":20,"body":"b"}"#,
            r#"{"id":30,"body":"c"}"#,
        ]);
        let docs = read_corpus(file.path(), 20).unwrap();
        assert_eq!(docs.iter().map(|d| d.id).collect::<Vec<_>>(), vec![20, 30]);
    }

    #[test]
    fn malformed_record_names_the_line() {
        let file = corpus_file(&[r#"{"id":1,"body":"ok"}"#, "not json"]);
        match read_corpus(file.path(), 0).unwrap_err() {
            CorpusError::Record { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn field_accessors() {
        let doc = Document {
            id: 1,
            medium: String::new(),
            date: None,
            title: "t".into(),
            subtitle: "s".into(),
            body: "b".into(),
        };
        let rendered: Vec<(char, &str)> = Field::ALL
            .iter()
            .map(|f| (f.prefix(), f.text(&doc)))
            .collect();
        assert_eq!(rendered, vec![('t', "t"), ('s', "s"), ('a', "b")]);
    }

    #[test]
    fn language_index_round_trip() {
        let file = corpus_file(&["1,conflictHE", "2,conflictAR", "3,conflictHE"]);
        let index = LanguageIndex::load(file.path()).unwrap();
        assert_eq!(index.dictionary_for(2), Some("conflictAR"));
        assert_eq!(index.dictionary_for(9), None);
        assert_eq!(index.dictionary_names(), ["conflictHE", "conflictAR"]);
    }

    #[test]
    fn bad_index_line_rejected() {
        let file = corpus_file(&["1,okEN", "oops"]);
        match LanguageIndex::load(file.path()).unwrap_err() {
            CorpusError::IndexLine { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }
}
