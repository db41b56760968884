use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use lexicon_parser::{LineOutcome, LineParser, ParserConfig, Strategy};
use lexicon_phonetic::Normalizer;
use lexicon_types::{CandidateEntry, NormalizedEntry, RawLine};

use crate::{Document, Lexicon, MergeKey, MergeOutcome};

/// Knobs for the normalize-and-merge half of the pipeline.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Phonetic strings shorter than this (after normalization) are dropped.
    pub min_phonetic_len: usize,
    pub merge_key: MergeKey,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_phonetic_len: 2,
            merge_key: MergeKey::Headword,
        }
    }
}

/// Line counts and merge results for one ingestion run.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct IngestStats {
    pub lines_seen: usize,
    pub lines_rejected: usize,
    pub lines_unmatched: usize,
    pub delimited_lines: usize,
    pub marker_only_lines: usize,
    pub two_column_lines: usize,
    pub candidates: usize,
    pub suspicious: usize,
    pub dropped_short: usize,
    pub inserted: usize,
    pub replaced: usize,
    pub kept: usize,
}

impl IngestStats {
    /// Combine counts from another run (e.g. a second source document).
    pub fn absorb(&mut self, other: &IngestStats) {
        self.lines_seen += other.lines_seen;
        self.lines_rejected += other.lines_rejected;
        self.lines_unmatched += other.lines_unmatched;
        self.delimited_lines += other.delimited_lines;
        self.marker_only_lines += other.marker_only_lines;
        self.two_column_lines += other.two_column_lines;
        self.candidates += other.candidates;
        self.suspicious += other.suspicious;
        self.dropped_short += other.dropped_short;
        self.inserted += other.inserted;
        self.replaced += other.replaced;
        self.kept += other.kept;
    }

    fn record_merge(&mut self, outcome: MergeOutcome) {
        match outcome {
            MergeOutcome::Inserted => self.inserted += 1,
            MergeOutcome::Replaced => self.replaced += 1,
            MergeOutcome::Kept => self.kept += 1,
        }
    }
}

/// Parser, normalizer and merge settings applied to a document in order.
pub struct Pipeline {
    parser: LineParser,
    normalizer: Normalizer,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(parser: LineParser, normalizer: Normalizer, config: PipelineConfig) -> Self {
        Self {
            parser,
            normalizer,
            config,
        }
    }

    /// English–Banjara defaults for every stage.
    pub fn with_defaults() -> Self {
        let parser =
            LineParser::new(ParserConfig::default()).expect("default parser config is valid");
        Self::new(parser, Normalizer::default(), PipelineConfig::default())
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// A lexicon keyed the way this pipeline merges.
    pub fn new_lexicon(&self) -> Lexicon {
        Lexicon::new(self.config.merge_key)
    }

    /// Normalize a candidate's romanization; `None` if the phonetic is too short.
    pub fn normalize_entry(&self, candidate: CandidateEntry) -> Option<NormalizedEntry> {
        let phonetic = self.normalizer.normalize(&candidate.romanization);
        if phonetic.len() < self.config.min_phonetic_len.max(1) {
            return None;
        }
        Some(NormalizedEntry {
            headword: candidate.headword,
            category: candidate.category,
            script_form: candidate.script_form,
            phonetic,
            source_line: candidate.source_line,
        })
    }

    /// Parse, normalize and merge every line of `text`, top to bottom.
    pub fn ingest_text(&self, text: &str, lexicon: &mut Lexicon) -> IngestStats {
        let mut stats = IngestStats::default();
        for (idx, line) in text.lines().enumerate() {
            let raw = RawLine::new(idx + 1, line);
            stats.lines_seen += 1;

            let parsed = self.parser.parse_with_diagnostics(&raw);
            for suspicion in &parsed.suspicions {
                debug!(line = raw.number, "skipped entry: {suspicion}");
            }
            stats.suspicious += parsed.suspicions.len();
            match parsed.outcome {
                LineOutcome::Rejected(_) => stats.lines_rejected += 1,
                LineOutcome::NoMatch => stats.lines_unmatched += 1,
                LineOutcome::Matched(Strategy::Delimited) => stats.delimited_lines += 1,
                LineOutcome::Matched(Strategy::MarkerOnly) => stats.marker_only_lines += 1,
                LineOutcome::Matched(Strategy::TwoColumn) => stats.two_column_lines += 1,
            }

            for candidate in parsed.entries {
                stats.candidates += 1;
                match self.normalize_entry(candidate) {
                    Some(entry) => stats.record_merge(lexicon.merge(entry)),
                    None => stats.dropped_short += 1,
                }
            }
        }
        stats
    }

    /// Ingest a loaded document and log the extraction yield.
    pub fn ingest_document(&self, doc: &Document, lexicon: &mut Lexicon) -> IngestStats {
        let text = doc.contents();
        let stats = self.ingest_text(&text, lexicon);
        info!(
            "{}: {} lines, {} candidates, {} new entries ({} replaced, {} duplicates kept)",
            doc.path().display(),
            stats.lines_seen,
            stats.candidates,
            stats.inserted,
            stats.replaced,
            stats.kept
        );
        info!(
            "{}: {} rejected, {} unmatched, {} suspicious, {} dropped as too short",
            doc.path().display(),
            stats.lines_rejected,
            stats.lines_unmatched,
            stats.suspicious,
            stats.dropped_short
        );
        if stats.candidates == 0 && stats.lines_seen > 0 {
            warn!(
                "{}: no dictionary entries recognized; check the parser markers and delimiter",
                doc.path().display()
            );
        }
        stats
    }
}
