//! The ordered extraction strategies.
//!
//! Each strategy checks its own trigger against a pre-scanned line and
//! returns `None` when it does not apply. Triggers are mutually exclusive:
//! any delimited span selects [`Strategy::Delimited`]; otherwise a category
//! marker selects [`Strategy::MarkerOnly`]; otherwise the line may be a
//! two-column row.

use std::fmt;

use lexicon_types::{Category, CandidateEntry};

use crate::{LineParser, Suspicion};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Strategy {
    /// `headword  v.  script /romanization/`
    Delimited,
    /// `headword  v.  token` without a delimited span.
    MarkerOnly,
    /// `headword  script` split by a run of spaces.
    TwoColumn,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Delimited => "delimited",
            Strategy::MarkerOnly => "marker-only",
            Strategy::TwoColumn => "two-column",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `/.../` match: byte range of the whole match plus the text between delimiters.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Span<'a> {
    pub start: usize,
    pub end: usize,
    pub inner: &'a str,
}

/// A category marker found at a word start.
#[derive(Clone, Copy, Debug)]
pub(crate) struct MarkerHit {
    pub start: usize,
    pub end: usize,
    pub category: Category,
}

pub(crate) struct LineScan<'a> {
    pub number: usize,
    pub text: &'a str,
    pub spans: Vec<Span<'a>>,
    pub markers: Vec<MarkerHit>,
}

#[derive(Default)]
pub(crate) struct StrategyOutput {
    pub entries: Vec<CandidateEntry>,
    pub suspicions: Vec<Suspicion>,
}

type StrategyFn = fn(&LineParser, &LineScan<'_>) -> Option<StrategyOutput>;

/// Precedence order; the first strategy yielding entries wins the line.
pub(crate) const CASCADE: [(Strategy, StrategyFn); 3] = [
    (Strategy::Delimited, delimited),
    (Strategy::MarkerOnly, marker_only),
    (Strategy::TwoColumn, two_column),
];

fn delimited(parser: &LineParser, scan: &LineScan<'_>) -> Option<StrategyOutput> {
    if scan.spans.is_empty() {
        return None;
    }
    let bounds = parser.config.headword_len;
    let mut out = StrategyOutput::default();

    for (idx, span) in scan.spans.iter().enumerate() {
        let romanization = span.inner.trim();
        if romanization.is_empty() {
            out.suspicions.push(Suspicion::EmptySpan);
            continue;
        }

        let marker = scan.markers.iter().rev().find(|m| m.start < span.start);
        let (raw_headword, script_start, category) = match marker {
            Some(m) => {
                let before = &scan.text[..m.start];
                let mut words = before.split_whitespace();
                // The first entry on a line names its headword up front; later
                // entries (or entries after a `;`) name it just before their marker.
                let word = if idx == 0 && !before.contains(';') {
                    words.next()
                } else {
                    words.next_back()
                };
                (word, m.end, m.category)
            }
            None => {
                let (word, end) = first_word(scan.text);
                (word, end, Category::Unknown)
            }
        };

        let Some(raw_headword) = raw_headword else {
            out.suspicions.push(Suspicion::MissingHeadword {
                romanization: romanization.to_string(),
            });
            continue;
        };
        let headword = match parser.accept_headword(raw_headword, bounds) {
            Ok(word) => word,
            Err(suspicion) => {
                out.suspicions.push(suspicion);
                continue;
            }
        };

        let script = &scan.text[script_start.min(span.start)..span.start];
        out.entries.push(CandidateEntry {
            headword,
            category,
            script_form: parser.strip_markers(script),
            romanization: romanization.to_string(),
            source_line: scan.number,
        });
    }

    Some(out)
}

fn marker_only(parser: &LineParser, scan: &LineScan<'_>) -> Option<StrategyOutput> {
    if !scan.spans.is_empty() || scan.markers.is_empty() {
        return None;
    }
    let bounds = parser.config.fallback_headword_len;
    let mut out = StrategyOutput::default();

    for marker in &scan.markers {
        let Some(raw_headword) = scan.text[..marker.start].split_whitespace().next_back() else {
            continue;
        };
        let headword = match parser.accept_headword(raw_headword, bounds) {
            Ok(word) => word,
            Err(suspicion) => {
                out.suspicions.push(suspicion);
                continue;
            }
        };
        if let Some(material) = first_material(&scan.text[marker.end..], parser.config.delimiter)
        {
            out.entries.push(CandidateEntry {
                headword,
                category: marker.category,
                script_form: material.to_string(),
                romanization: material.to_string(),
                source_line: scan.number,
            });
        }
        break;
    }

    Some(out)
}

fn two_column(parser: &LineParser, scan: &LineScan<'_>) -> Option<StrategyOutput> {
    if !scan.spans.is_empty() || !scan.markers.is_empty() {
        return None;
    }
    let mut columns = parser.column_gap.splitn(scan.text, 2);
    let (Some(left), Some(right)) = (columns.next(), columns.next()) else {
        return None;
    };
    let (left, right) = (left.trim(), right.trim());
    if left.is_empty() || right.is_empty() {
        return None;
    }

    let mut out = StrategyOutput::default();
    // Genuine rows carry the foreign-script rendering in the second column.
    if right.is_ascii() {
        return Some(out);
    }
    match parser.accept_headword(left, parser.config.fallback_headword_len) {
        Ok(headword) => {
            if let Some(material) = right.split_whitespace().next() {
                out.entries.push(CandidateEntry {
                    headword,
                    category: Category::Unknown,
                    script_form: material.to_string(),
                    romanization: material.to_string(),
                    source_line: scan.number,
                });
            }
        }
        Err(suspicion) => out.suspicions.push(suspicion),
    }
    Some(out)
}

fn first_word(text: &str) -> (Option<&str>, usize) {
    let trimmed = text.trim_start();
    let offset = text.len() - trimmed.len();
    let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
    if end == 0 {
        (None, offset)
    } else {
        (Some(&trimmed[..end]), offset + end)
    }
}

fn first_material(text: &str, delimiter: char) -> Option<&str> {
    text.split(|c: char| c.is_whitespace() || c == delimiter)
        .find(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_word_reports_end_offset() {
        assert_eq!(first_word("abide  v."), (Some("abide"), 5));
        assert_eq!(first_word("  x"), (Some("x"), 3));
        assert_eq!(first_word(""), (None, 0));
    }

    #[test]
    fn first_material_skips_delimiters() {
        assert_eq!(first_material("  /ṇaṁ/ rest", '/'), Some("ṇaṁ"));
        assert_eq!(first_material("   ", '/'), None);
    }

    #[test]
    fn cascade_order_is_fixed() {
        let order: Vec<Strategy> = CASCADE.iter().map(|(s, _)| *s).collect();
        assert_eq!(
            order,
            vec![Strategy::Delimited, Strategy::MarkerOnly, Strategy::TwoColumn]
        );
    }
}
