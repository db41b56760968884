//! Writing a finished lexicon to disk.

use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::Serialize;
use thiserror::Error;

use lexicon_types::{Category, NormalizedEntry};

/// Output shape for `lexicon extract`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum ExportFormat {
    /// JSON array of full records.
    #[default]
    Records,
    /// JSON object mapping each headword to its phonetic string.
    Flat,
    /// `headword,category,script,phonetic` rows.
    Csv,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to create {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("write failed: {0}")]
    Io(#[from] io::Error),
    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv encoding failed: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Serialize)]
struct CsvRow<'a> {
    headword: &'a str,
    category: &'a str,
    script: &'a str,
    phonetic: &'a str,
}

/// Sort by headword then category and drop repeated `(headword, category, phonetic)` triples.
///
/// The first occurrence of a triple is the one kept.
pub fn unique_entries<'a, I>(entries: I) -> Vec<&'a NormalizedEntry>
where
    I: IntoIterator<Item = &'a NormalizedEntry>,
{
    let mut sorted: Vec<&NormalizedEntry> = entries.into_iter().collect();
    sorted.sort_by(|a, b| {
        a.headword
            .cmp(&b.headword)
            .then(a.category.cmp(&b.category))
    });
    let mut seen: HashSet<(&str, Category, &str)> = HashSet::new();
    sorted.retain(|&e| seen.insert((e.headword.as_str(), e.category, e.phonetic.as_str())));
    sorted
}

/// Write `entries` in `format`; returns the number of records written.
pub fn write_export<'a, I, W>(
    entries: I,
    format: ExportFormat,
    mut writer: W,
) -> Result<usize, ExportError>
where
    I: IntoIterator<Item = &'a NormalizedEntry>,
    W: Write,
{
    let rows = unique_entries(entries);
    let written = match format {
        ExportFormat::Records => {
            serde_json::to_writer_pretty(&mut writer, &rows)?;
            writer.write_all(b"\n")?;
            rows.len()
        }
        ExportFormat::Flat => {
            let map = flatten(&rows);
            serde_json::to_writer_pretty(&mut writer, &map)?;
            writer.write_all(b"\n")?;
            map.len()
        }
        ExportFormat::Csv => {
            let mut csv = csv::Writer::from_writer(&mut writer);
            for entry in &rows {
                csv.serialize(CsvRow {
                    headword: &entry.headword,
                    category: entry.category.as_str(),
                    script: &entry.script_form,
                    phonetic: &entry.phonetic,
                })?;
            }
            csv.flush()?;
            rows.len()
        }
    };
    writer.flush()?;
    Ok(written)
}

/// Create (or truncate) `path` and export into it.
pub fn export_to_path<'a, I>(
    entries: I,
    format: ExportFormat,
    path: &Path,
) -> Result<usize, ExportError>
where
    I: IntoIterator<Item = &'a NormalizedEntry>,
{
    let file = File::create(path).map_err(|source| ExportError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    write_export(entries, format, BufWriter::new(file))
}

// One phonetic per headword: the longest, earliest on ties.
fn flatten<'a>(rows: &[&'a NormalizedEntry]) -> BTreeMap<&'a str, &'a str> {
    let mut map: BTreeMap<&str, &str> = BTreeMap::new();
    for entry in rows {
        map.entry(entry.headword.as_str())
            .and_modify(|phonetic| {
                if entry.phonetic.len() > phonetic.len() {
                    *phonetic = entry.phonetic.as_str();
                }
            })
            .or_insert(entry.phonetic.as_str());
    }
    map
}
