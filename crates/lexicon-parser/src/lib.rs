//! Extract candidate lexical entries from OCR'd dictionary lines.
//!
//! Print dictionaries have no reliable delimiter grammar once they pass
//! through OCR: entries run together, part-of-speech abbreviations come and
//! go, and romanizations sit between slashes that may repeat on one line.
//! [`LineParser`] applies a fixed cascade of heuristics to each line and
//! keeps the output of the first one that matches:
//!
//! 1. [`Strategy::Delimited`]: one entry per `/romanization/` span.
//! 2. [`Strategy::MarkerOnly`]: `headword v. token` without slashes.
//! 3. [`Strategy::TwoColumn`]: `headword  non-latin-script`.
//!
//! Cheap pre-filters (too short, header/page markers, section letters) run
//! first and short-circuit the cascade. Malformed lines never error; they
//! produce no entries.
//!
//! # Example
//! ```rust
//! use lexicon_parser::{LineParser, ParserConfig};
//! use lexicon_types::{Category, RawLine};
//!
//! let parser = LineParser::new(ParserConfig::default()).unwrap();
//! let entries = parser.parse(&RawLine::new(1, "abide  v.  బంజర /abaid/"));
//! assert_eq!(entries.len(), 1);
//! assert_eq!(entries[0].headword, "abide");
//! assert_eq!(entries[0].category, Category::Verb);
//! assert_eq!(entries[0].romanization, "abaid");
//!
//! assert!(parser.parse(&RawLine::new(2, "Page 12")).is_empty());
//! ```

mod config;
mod strategy;

use std::fmt;

use regex::Regex;

use lexicon_types::{CandidateEntry, RawLine};

pub use config::{CategoryMarker, ConfigError, LengthBounds, ParserConfig};
pub use strategy::Strategy;

use strategy::{CASCADE, LineScan, MarkerHit, Span};

/// Why a line was dropped before any extraction was attempted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Rejection {
    TooShort,
    Marker(String),
    SectionLetter,
}

/// Plausibility problems noticed while extracting; the affected entry is skipped.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Suspicion {
    /// The positional headword rule picked a category abbreviation.
    HeadwordIsMarker { word: String },
    /// The chosen word is not a plain word within the length bounds.
    InvalidHeadword { word: String },
    /// A romanization span with no word before its marker.
    MissingHeadword { romanization: String },
    /// Delimiters enclosing only whitespace.
    EmptySpan,
}

impl fmt::Display for Suspicion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suspicion::HeadwordIsMarker { word } => {
                write!(f, "headword {word:?} is a category marker")
            }
            Suspicion::InvalidHeadword { word } => write!(f, "implausible headword {word:?}"),
            Suspicion::MissingHeadword { romanization } => {
                write!(f, "no headword for romanization {romanization:?}")
            }
            Suspicion::EmptySpan => f.write_str("empty romanization span"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LineOutcome {
    Rejected(Rejection),
    NoMatch,
    Matched(Strategy),
}

/// Entries and diagnostics for one line.
#[derive(Clone, Debug)]
pub struct ParsedLine {
    pub outcome: LineOutcome,
    pub entries: Vec<CandidateEntry>,
    pub suspicions: Vec<Suspicion>,
}

impl ParsedLine {
    fn rejected(reason: Rejection) -> Self {
        Self {
            outcome: LineOutcome::Rejected(reason),
            entries: Vec::new(),
            suspicions: Vec::new(),
        }
    }
}

/// Stateless line parser configured for one dictionary's print conventions.
#[derive(Clone, Debug)]
pub struct LineParser {
    config: ParserConfig,
    span_re: Regex,
    column_gap: Regex,
}

impl LineParser {
    pub fn new(config: ParserConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let delim = regex::escape(&config.delimiter.to_string());
        let span_re = Regex::new(&format!("{delim}([^{delim}]+){delim}"))
            .map_err(|_| ConfigError::InvalidDelimiter(config.delimiter))?;
        let column_gap = Regex::new(" {2,}").expect("static column regex");
        Ok(Self {
            config,
            span_re,
            column_gap,
        })
    }

    /// Candidate entries for one line, in line order.
    pub fn parse(&self, line: &RawLine<'_>) -> Vec<CandidateEntry> {
        self.parse_with_diagnostics(line).entries
    }

    /// Like [`parse`](Self::parse), also reporting which strategy fired and
    /// any entries skipped as implausible.
    pub fn parse_with_diagnostics(&self, line: &RawLine<'_>) -> ParsedLine {
        let text = line.text.trim();
        if let Some(reason) = self.rejection(text) {
            return ParsedLine::rejected(reason);
        }

        let scan = self.scan(line.number, text);
        let mut suspicions = Vec::new();
        for (strategy, run) in CASCADE {
            let Some(output) = run(self, &scan) else {
                continue;
            };
            suspicions.extend(output.suspicions);
            let entries: Vec<CandidateEntry> = output
                .entries
                .into_iter()
                .filter(CandidateEntry::is_valid)
                .collect();
            if !entries.is_empty() {
                return ParsedLine {
                    outcome: LineOutcome::Matched(strategy),
                    entries,
                    suspicions,
                };
            }
        }

        ParsedLine {
            outcome: LineOutcome::NoMatch,
            entries: Vec::new(),
            suspicions,
        }
    }

    /// Pre-filter check; `None` means the line goes on to extraction.
    pub fn rejection(&self, text: &str) -> Option<Rejection> {
        let non_space = text.chars().filter(|c| !c.is_whitespace()).count();
        if non_space < self.config.min_non_space {
            return Some(Rejection::TooShort);
        }
        if let Some(marker) = self
            .config
            .rejection_markers
            .iter()
            .find(|m| text.contains(m.as_str()))
        {
            return Some(Rejection::Marker(marker.clone()));
        }
        if self.config.reject_section_letters
            && text.split_whitespace().all(|tok| {
                let mut chars = tok.chars();
                matches!((chars.next(), chars.next()), (Some(c), None) if c.is_alphabetic())
            })
        {
            return Some(Rejection::SectionLetter);
        }
        None
    }

    fn scan<'a>(&self, number: usize, text: &'a str) -> LineScan<'a> {
        let spans: Vec<Span<'a>> = self
            .span_re
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let inner = caps.get(1)?;
                Some(Span {
                    start: whole.start(),
                    inner: inner.as_str(),
                    end: whole.end(),
                })
            })
            .collect();
        let markers = self.find_markers(text, &spans);
        LineScan {
            number,
            text,
            spans,
            markers,
        }
    }

    /// Marker occurrences at word starts and outside romanization spans,
    /// sorted by offset. At one offset the longest literal wins.
    fn find_markers(&self, text: &str, spans: &[Span<'_>]) -> Vec<MarkerHit> {
        let mut hits = Vec::new();
        for marker in &self.config.markers {
            for (start, literal) in text.match_indices(marker.literal.as_str()) {
                let at_word_start = text[..start]
                    .chars()
                    .next_back()
                    .is_none_or(|c| !c.is_alphabetic());
                let in_span = spans.iter().any(|s| start >= s.start && start < s.end);
                if at_word_start && !in_span {
                    hits.push(MarkerHit {
                        start,
                        end: start + literal.len(),
                        category: marker.category,
                    });
                }
            }
        }
        hits.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

        let mut kept: Vec<MarkerHit> = Vec::with_capacity(hits.len());
        for hit in hits {
            if kept.last().is_some_and(|prev| hit.start < prev.end) {
                continue;
            }
            kept.push(hit);
        }
        kept
    }

    /// Clean and validate a headword token, lowercasing it.
    pub(crate) fn accept_headword(
        &self,
        raw: &str,
        bounds: LengthBounds,
    ) -> Result<String, Suspicion> {
        let cleaned = raw.trim_matches(|c: char| {
            matches!(c, ',' | ';' | ':' | '(' | ')' | '[' | ']' | '"')
        });
        if self.config.is_marker_literal(cleaned) {
            return Err(Suspicion::HeadwordIsMarker {
                word: cleaned.to_string(),
            });
        }
        let word = cleaned.to_ascii_lowercase();
        if !is_headword_shape(&word) || !bounds.contains(word.len()) {
            return Err(Suspicion::InvalidHeadword {
                word: raw.to_string(),
            });
        }
        Ok(word)
    }

    /// Remove every marker literal from `text` and trim it.
    pub(crate) fn strip_markers(&self, text: &str) -> String {
        let mut out = text.to_string();
        for marker in &self.config.markers {
            if out.contains(marker.literal.as_str()) {
                out = out.replace(marker.literal.as_str(), "");
            }
        }
        out.trim().to_string()
    }
}

fn is_headword_shape(word: &str) -> bool {
    let mut chars = word.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphabetic() || c == '-' || c == '\'')
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexicon_types::Category;

    fn parser() -> LineParser {
        LineParser::new(ParserConfig::default()).unwrap()
    }

    fn parse(text: &str) -> ParsedLine {
        parser().parse_with_diagnostics(&RawLine::new(7, text))
    }

    #[test]
    fn single_span_with_marker() {
        let parsed = parse("abide  v.  బంజర /abaid/");
        assert_eq!(parsed.outcome, LineOutcome::Matched(Strategy::Delimited));
        assert_eq!(parsed.entries.len(), 1);
        let entry = &parsed.entries[0];
        assert_eq!(entry.headword, "abide");
        assert_eq!(entry.category, Category::Verb);
        assert_eq!(entry.script_form, "బంజర");
        assert_eq!(entry.romanization, "abaid");
        assert_eq!(entry.source_line, 7);
    }

    #[test]
    fn adverb_marker_is_not_read_as_verb() {
        let parsed = parse("above  adv.  ఉప్పర్ /uppar/");
        assert_eq!(parsed.entries[0].category, Category::Adverb);
        assert_eq!(parsed.entries[0].script_form, "ఉప్పర్");
    }

    #[test]
    fn multiple_spans_take_later_headwords_from_their_marker() {
        let parsed = parse("absent adj. గైర్ /gair/ abstain v. దూర్ /dūr/");
        let words: Vec<(&str, Category, &str)> = parsed
            .entries
            .iter()
            .map(|e| (e.headword.as_str(), e.category, e.romanization.as_str()))
            .collect();
        assert_eq!(
            words,
            vec![
                ("absent", Category::Adjective, "gair"),
                ("abstain", Category::Verb, "dūr"),
            ]
        );
        assert_eq!(parsed.entries[1].script_form, "దూర్");
    }

    #[test]
    fn shared_headword_glosses_are_flagged_not_guessed() {
        let parsed = parse("abandon v. ఛోడ్ /choḍ/; n. త్యాగ్ /tyāg/");
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].headword, "abandon");
        assert_eq!(
            parsed.suspicions,
            vec![Suspicion::InvalidHeadword {
                word: "/choḍ/;".into()
            }]
        );
    }

    #[test]
    fn headword_equal_to_marker_is_flagged() {
        let parsed = parse("gloss v. ఛోడ్ /a/ xx n. v. బంజర /bb/");
        assert_eq!(parsed.entries.len(), 1);
        assert!(
            parsed
                .suspicions
                .iter()
                .all(|s| matches!(s, Suspicion::HeadwordIsMarker { .. }))
        );
        assert_eq!(parsed.suspicions.len(), 1);
    }

    #[test]
    fn span_without_marker_uses_first_word() {
        let parsed = parse("apple సేబ్ /sēb/");
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].headword, "apple");
        assert_eq!(parsed.entries[0].category, Category::Unknown);
        assert_eq!(parsed.entries[0].script_form, "సేబ్");
    }

    #[test]
    fn empty_span_is_skipped() {
        let parsed = parse("apple / / n.");
        assert!(parsed.entries.is_empty());
        assert_eq!(parsed.suspicions, vec![Suspicion::EmptySpan]);
        assert_eq!(parsed.outcome, LineOutcome::NoMatch);
    }

    #[test]
    fn delimiter_wins_over_marker_only() {
        // A span that yields nothing still blocks the weaker strategies.
        let parsed = parse("v. బంజర /abaid/");
        assert!(parsed.entries.is_empty());
        assert_eq!(parsed.outcome, LineOutcome::NoMatch);
    }

    #[test]
    fn marker_without_delimiter() {
        let parsed = parse("Accept  v.  ఝేల్ more");
        assert_eq!(parsed.outcome, LineOutcome::Matched(Strategy::MarkerOnly));
        assert_eq!(parsed.entries.len(), 1);
        let entry = &parsed.entries[0];
        assert_eq!(entry.headword, "accept");
        assert_eq!(entry.category, Category::Verb);
        assert_eq!(entry.romanization, "ఝేల్");
        assert_eq!(entry.script_form, "ఝేల్");
    }

    #[test]
    fn marker_only_stops_at_first_valid_headword() {
        let parsed = parse("ache n. దుఖ్ pain v. ఖటక్");
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].headword, "ache");
        assert_eq!(parsed.entries[0].category, Category::Noun);
    }

    #[test]
    fn marker_only_rejects_single_letter_headword() {
        let parsed = parse("x n. దుఖ్");
        assert!(parsed.entries.is_empty());
    }

    #[test]
    fn two_column_rows() {
        let parsed = parse("apple  ṣēb సేబ్");
        assert_eq!(parsed.outcome, LineOutcome::Matched(Strategy::TwoColumn));
        assert_eq!(parsed.entries[0].headword, "apple");
        assert_eq!(parsed.entries[0].category, Category::Unknown);
        assert_eq!(parsed.entries[0].romanization, "ṣēb");

        assert!(parse("apple  banana").entries.is_empty());
        assert!(parse("apple pie  సేబ్").entries.is_empty());
    }

    #[test]
    fn column_gap_is_spaces_only() {
        let parsed = parse("apple\t\tసేబ్");
        assert!(parsed.entries.is_empty());
        assert_eq!(parsed.outcome, LineOutcome::NoMatch);
    }

    #[test]
    fn delimited_headword_length_bound() {
        let longest = "a".repeat(35);
        let parsed = parse(&format!("{longest}  v.  బంజర /abaid/"));
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].headword, longest);

        let too_long = "a".repeat(36);
        let parsed = parse(&format!("{too_long}  v.  బంజర /abaid/"));
        assert!(parsed.entries.is_empty());
        assert_eq!(parsed.outcome, LineOutcome::NoMatch);
        assert_eq!(
            parsed.suspicions,
            vec![Suspicion::InvalidHeadword { word: too_long }]
        );
    }

    #[test]
    fn marker_only_uses_fallback_length_bound() {
        let parsed = parse(&format!("{}  n.  దుఖ్", "a".repeat(34)));
        assert_eq!(parsed.entries.len(), 1);

        let too_long = "a".repeat(35);
        let parsed = parse(&format!("{too_long}  n.  దుఖ్"));
        assert!(parsed.entries.is_empty());
        assert_eq!(
            parsed.suspicions,
            vec![Suspicion::InvalidHeadword { word: too_long }]
        );
    }

    #[test]
    fn hyphen_and_apostrophe_headwords() {
        let parsed = parse("well-being  n.  భలాయి /bhalai/");
        assert_eq!(parsed.entries[0].headword, "well-being");
        assert_eq!(parsed.entries[0].category, Category::Noun);

        let parsed = parse("o'clock  adv.  బజే /baje/");
        assert_eq!(parsed.entries[0].headword, "o'clock");
        assert_eq!(parsed.entries[0].category, Category::Adverb);
    }

    #[test]
    fn custom_rejection_markers_replace_defaults() {
        let config = ParserConfig {
            rejection_markers: vec!["Index".into()],
            ..ParserConfig::default()
        };
        let parser = LineParser::new(config).unwrap();
        assert_eq!(
            parser.rejection("Index of words"),
            Some(Rejection::Marker("Index".into()))
        );
        assert_eq!(parser.rejection("Page 12"), None);
        let parsed = parser.parse_with_diagnostics(&RawLine::new(1, "Page 12"));
        assert_eq!(parsed.outcome, LineOutcome::NoMatch);
    }

    #[test]
    fn lines_without_any_signal_are_empty() {
        let parsed = parse("abundance");
        assert!(parsed.entries.is_empty());
        assert_eq!(parsed.outcome, LineOutcome::NoMatch);
        assert!(parsed.suspicions.is_empty());
    }

    #[test]
    fn prefilters_short_circuit() {
        assert_eq!(parse("ab").outcome, LineOutcome::Rejected(Rejection::TooShort));
        assert_eq!(
            parse("Page 12").outcome,
            LineOutcome::Rejected(Rejection::Marker("Page".into()))
        );
        assert_eq!(
            parse("=== abide v. x /abaid/").outcome,
            LineOutcome::Rejected(Rejection::Marker("===".into()))
        );
        assert_eq!(
            parse("B  C  D").outcome,
            LineOutcome::Rejected(Rejection::SectionLetter)
        );
    }

    #[test]
    fn custom_delimiter_and_markers() {
        let config = ParserConfig {
            markers: vec![CategoryMarker::new("vb.", Category::Verb)],
            delimiter: '|',
            ..ParserConfig::default()
        };
        let parser = LineParser::new(config).unwrap();
        let entries = parser.parse(&RawLine::new(3, "run vb. దౌడ్ |dauḍ| /x/"));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, Category::Verb);
        assert_eq!(entries[0].romanization, "dauḍ");
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ParserConfig {
            delimiter: ' ',
            ..ParserConfig::default()
        };
        assert!(LineParser::new(config).is_err());
    }
}
