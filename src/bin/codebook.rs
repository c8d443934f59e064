//! Corpus coding CLI.
//!
//! Reads a JSONL corpus and one or more dictionaries, codes every document
//! (title, subtitle, body), and writes the requested result files next to
//! the working directory:
//!
//! ```bash
//! # Code corpus.jsonl with DICT_conflictEN.txt, extended matrix + KWIC
//! codebook corpus.jsonl conflictEN --style extended --kwic 5
//!
//! # Per-document dictionaries from lang_index_corpus.csv
//! codebook corpus.jsonl INDEX --annotate
//! ```

use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use rayon::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use codebook::output::{annotate, kwic, matrix, replace, results};
use codebook::{
    compile, dictionary_language, read_corpus, tokenize, CodedDocument, CodedField,
    DictionaryTable, Document, Field, LanguageIndex, MatchOptions,
};

#[derive(Parser)]
#[command(name = "codebook")]
#[command(version)]
#[command(about = "Dictionary-based concept coding for text corpora")]
struct Cli {
    /// JSONL corpus file, one document per line
    corpus: PathBuf,

    /// Dictionary name (loads DICT_<name>.txt; the last two characters
    /// select the language), or INDEX for per-document dictionaries
    dictionary: String,

    /// Write a term-document matrix in this style
    #[arg(long, value_enum)]
    style: Option<MatrixStyle>,

    /// Write annotated texts (concept names inline)
    #[arg(long)]
    annotate: bool,

    /// Write replaced texts (concept-id sequences)
    #[arg(long)]
    replace: bool,

    /// Write a keyword-in-context file with this many context positions
    #[arg(long, value_name = "BANDWIDTH", num_args = 0..=1, default_missing_value = "5")]
    kwic: Option<usize>,

    /// Disable repeat-hit suppression
    #[arg(long)]
    adjacent: bool,

    /// Skip documents with an id below this
    #[arg(long, default_value_t = 0)]
    from: u64,

    /// Dictionary index CSV for INDEX mode (default lang_index_<corpus>.csv)
    #[arg(long)]
    lang_index: Option<PathBuf>,

    /// Directory holding the DICT_<name>.txt files
    #[arg(long, default_value = ".")]
    dict_dir: PathBuf,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum MatrixStyle {
    Simple,
    Extended,
}

/// Everything one document contributes to the output files.
struct DocOutput {
    results: String,
    annotated: Option<String>,
    replaced: Option<String>,
    kwic: Vec<String>,
    matrix: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    run(Cli::parse())
}

fn run(cli: Cli) -> Result<()> {
    let stem = cli
        .corpus
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("corpus")
        .to_string();
    let documents = read_corpus(&cli.corpus, cli.from)?;

    let (tables, index) = load_dictionaries(&cli, &stem)?;
    let reference_name = match &index {
        Some(ix) => ix.dictionary_names()[0].clone(),
        None => cli.dictionary.clone(),
    };
    let reference = &tables[reference_name.as_str()];
    let options = MatchOptions {
        allow_adjacent: cli.adjacent,
    };

    let outputs: Vec<Option<DocOutput>> = documents
        .par_iter()
        .map(|doc| {
            let name = match &index {
                Some(ix) => match ix.dictionary_for(doc.id) {
                    Some(name) => name,
                    None => {
                        warn!(id = doc.id, "document missing from dictionary index, skipped");
                        return None;
                    }
                },
                None => reference_name.as_str(),
            };
            let table = &tables[name];
            let coded = code_document(doc, table, options);
            Some(DocOutput {
                results: results::render(&coded),
                annotated: cli.annotate.then(|| annotated_record(&coded, table)),
                replaced: cli.replace.then(|| replace::render(&coded)),
                kwic: cli
                    .kwic
                    .map(|bandwidth| kwic::rows(&coded, reference, bandwidth))
                    .unwrap_or_default(),
                matrix: cli.style.map(|style| match style {
                    MatrixStyle::Simple => matrix::simple_row(&coded, reference),
                    MatrixStyle::Extended => matrix::extended_row(&coded, reference),
                }),
            })
        })
        .collect();
    let outputs: Vec<DocOutput> = outputs.into_iter().flatten().collect();
    info!(documents = outputs.len(), "corpus coded");

    let suffix = format!("{stem}_{}", cli.dictionary);
    write_output(
        format!("results_{suffix}.txt"),
        outputs.iter().map(|o| o.results.as_str()).collect::<String>(),
    )?;

    if cli.annotate {
        let body: String = outputs.iter().filter_map(|o| o.annotated.as_deref()).collect();
        write_output(format!("annotated_{suffix}.txt"), body)?;
    }
    if cli.replace {
        let mut body = String::new();
        for line in outputs.iter().filter_map(|o| o.replaced.as_deref()) {
            body.push_str(line);
            body.push('\n');
        }
        write_output(format!("replaced_{suffix}.txt"), body)?;
    }
    if cli.kwic.is_some() {
        // The KWIC file is sorted as a whole, grouping concepts across
        // documents.
        let mut rows: Vec<&str> = outputs
            .iter()
            .flat_map(|o| o.kwic.iter().map(String::as_str))
            .collect();
        rows.sort_unstable();
        let mut body = rows.join("\n");
        if !body.is_empty() {
            body.push('\n');
        }
        write_output(format!("kwic_{suffix}.txt"), body)?;
    }
    if let Some(style) = cli.style {
        let header = match style {
            MatrixStyle::Simple => matrix::simple_header(reference),
            MatrixStyle::Extended => matrix::extended_header(reference),
        };
        let mut body = header;
        body.push('\n');
        for row in outputs.iter().filter_map(|o| o.matrix.as_deref()) {
            body.push_str(row);
            body.push('\n');
        }
        write_output(format!("td_{suffix}.txt"), body)?;
    }
    Ok(())
}

fn load_dictionaries(
    cli: &Cli,
    stem: &str,
) -> Result<(HashMap<String, DictionaryTable>, Option<LanguageIndex>)> {
    let mut tables = HashMap::new();
    if cli.dictionary == "INDEX" {
        let index_path = cli
            .lang_index
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("lang_index_{stem}.csv")));
        let index = LanguageIndex::load(&index_path)?;
        if index.dictionary_names().is_empty() {
            bail!("dictionary index {} is empty", index_path.display());
        }
        for name in index.dictionary_names() {
            tables.insert(name.clone(), load_dictionary(cli, name)?);
        }
        Ok((tables, Some(index)))
    } else {
        tables.insert(cli.dictionary.clone(), load_dictionary(cli, &cli.dictionary)?);
        Ok((tables, None))
    }
}

fn load_dictionary(cli: &Cli, name: &str) -> Result<DictionaryTable> {
    let language = dictionary_language(name).with_context(|| {
        format!("dictionary name '{name}' does not end in a known language code")
    })?;
    let path = cli.dict_dir.join(format!("DICT_{name}.txt"));
    let source = fs::read_to_string(&path)
        .with_context(|| format!("cannot read dictionary {}", path.display()))?;
    let table = compile(&source, language)
        .with_context(|| format!("compiling {}", path.display()))?;
    Ok(table)
}

fn code_document(
    document: &Document,
    table: &DictionaryTable,
    options: MatchOptions,
) -> CodedDocument {
    let code_field = |field: Field| {
        let tokens = tokenize(field.text(document), table.language);
        let hits = codebook::match_tokens(&tokens, table, document.date, options);
        CodedField { tokens, hits }
    };
    CodedDocument {
        id: document.id,
        medium: document.medium.clone(),
        date: document.date,
        title: code_field(Field::Title),
        subtitle: code_field(Field::Subtitle),
        body: code_field(Field::Body),
    }
}

/// One document's record in the annotated file: id, title and subtitle on
/// the first line, body on the second, blank line between documents.
fn annotated_record(coded: &CodedDocument, table: &DictionaryTable) -> String {
    format!(
        "{}\t{}\t{}\n{}\n\n",
        coded.id,
        annotate::render(&coded.title, table),
        annotate::render(&coded.subtitle, table),
        annotate::render(&coded.body, table),
    )
}

fn write_output(path: String, body: String) -> Result<()> {
    fs::write(&path, body).with_context(|| format!("cannot write {path}"))?;
    info!(path, "output written");
    Ok(())
}
