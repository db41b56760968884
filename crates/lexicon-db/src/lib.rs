//! Build a deduplicated lexicon from OCR'd bilingual dictionary text.
//!
//! [`Document`] loads the extracted text (memory-mapped or owned, see
//! [`LoadMode`]). [`Pipeline`] feeds each line, in document order, through
//! the line parser and phonetic normalizer and merges the results into a
//! [`Lexicon`], which keeps one entry per headword (or per headword and
//! category, see [`MergeKey`]).
//!
//! # Merge policy
//! When two entries share a key, the one with the strictly longer phonetic
//! string is retained; on equal length the earlier one stays. Lines must
//! therefore be merged in document order.
//!
//! # Example
//! ```no_run
//! use lexicon_db::{Document, Lexicon, LoadMode, Pipeline};
//!
//! # fn main() -> anyhow::Result<()> {
//! let doc = Document::load_with_mode("/path/to/extracted_text.txt", LoadMode::Mmap)?;
//! let pipeline = Pipeline::with_defaults();
//! let mut lexicon = Lexicon::default();
//! let stats = pipeline.ingest_document(&doc, &mut lexicon);
//! println!("{} lines -> {} entries", stats.lines_seen, lexicon.len());
//!
//! for entry in lexicon.lookup("abide") {
//!     println!("{} ({}): {}", entry.headword, entry.category, entry.phonetic);
//! }
//! # Ok(()) }
//! ```

mod document;
mod ingest;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use lexicon_types::{Category, NormalizedEntry};

pub use document::{Document, LoadError, LoadMode};
pub use ingest::{IngestStats, Pipeline, PipelineConfig};

/// What makes two entries duplicates of each other.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeKey {
    #[default]
    Headword,
    HeadwordAndCategory,
}

/// Result of offering an entry to the lexicon.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MergeOutcome {
    /// First entry for its key.
    Inserted,
    /// Replaced a retained entry with a shorter phonetic.
    Replaced,
    /// An entry at least as long was already retained.
    Kept,
}

struct Slot {
    entry: NormalizedEntry,
    seen: u32,
}

#[derive(Clone, Debug)]
pub struct SearchResult<'a> {
    pub total: usize,
    pub items: Vec<&'a NormalizedEntry>,
    pub has_more: bool,
}

/// Single-writer accumulator of normalized entries.
pub struct Lexicon {
    key: MergeKey,
    slots: Vec<Slot>,
    index: HashMap<(String, Option<Category>), usize>,
    by_headword: HashMap<String, Vec<usize>>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new(MergeKey::default())
    }
}

impl Lexicon {
    pub fn new(key: MergeKey) -> Self {
        Self {
            key,
            slots: Vec::new(),
            index: HashMap::new(),
            by_headword: HashMap::new(),
        }
    }

    pub fn merge_key(&self) -> MergeKey {
        self.key
    }

    /// Merge one entry, keeping the longer phonetic for an existing key.
    pub fn merge(&mut self, entry: NormalizedEntry) -> MergeOutcome {
        let headword = normalize_headword(&entry.headword);
        let key = (headword.clone(), self.category_key(entry.category));
        match self.index.get(&key) {
            Some(&slot_idx) => {
                let slot = &mut self.slots[slot_idx];
                slot.seen = slot.seen.saturating_add(1);
                if entry.phonetic.len() > slot.entry.phonetic.len() {
                    slot.entry = entry;
                    MergeOutcome::Replaced
                } else {
                    MergeOutcome::Kept
                }
            }
            None => {
                let slot_idx = self.slots.len();
                self.slots.push(Slot { entry, seen: 1 });
                self.index.insert(key, slot_idx);
                self.by_headword.entry(headword).or_default().push(slot_idx);
                MergeOutcome::Inserted
            }
        }
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Retained entry for a key. `category` is ignored under [`MergeKey::Headword`].
    pub fn get(&self, headword: &str, category: Category) -> Option<&NormalizedEntry> {
        self.slot(headword, category).map(|s| &s.entry)
    }

    /// How many candidates were merged into the entry for this key.
    pub fn seen_count(&self, headword: &str, category: Category) -> Option<u32> {
        self.slot(headword, category).map(|s| s.seen)
    }

    /// All retained entries for a headword, in first-seen order.
    pub fn lookup(&self, headword: &str) -> Vec<&NormalizedEntry> {
        self.by_headword
            .get(&normalize_headword(headword))
            .map(|slots| slots.iter().map(|&i| &self.slots[i].entry).collect())
            .unwrap_or_default()
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &NormalizedEntry> + '_ {
        self.slots.iter().map(|s| &s.entry)
    }

    /// Entries ordered by headword, then category.
    pub fn sorted(&self) -> Vec<&NormalizedEntry> {
        let mut entries: Vec<&NormalizedEntry> = self.iter().collect();
        entries.sort_by(|a, b| {
            a.headword
                .cmp(&b.headword)
                .then(a.category.cmp(&b.category))
        });
        entries
    }

    /// Headwords containing `needle`, sorted, one page at a time (pages start at 1).
    pub fn search(&self, needle: &str, page: usize, page_size: usize) -> SearchResult<'_> {
        let needle = normalize_headword(needle);
        let matches: Vec<&NormalizedEntry> = self
            .sorted()
            .into_iter()
            .filter(|e| e.headword.contains(needle.as_str()))
            .collect();
        let total = matches.len();
        let offset = page.saturating_sub(1).saturating_mul(page_size);
        let items: Vec<&NormalizedEntry> =
            matches.into_iter().skip(offset).take(page_size).collect();
        let has_more = offset + items.len() < total;
        SearchResult {
            total,
            items,
            has_more,
        }
    }

    /// Entry counts per category, most common first.
    pub fn category_counts(&self) -> Vec<(Category, usize)> {
        let mut counts: HashMap<Category, usize> = HashMap::new();
        for entry in self.iter() {
            *counts.entry(entry.category).or_default() += 1;
        }
        let mut counts: Vec<(Category, usize)> = counts.into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        counts
    }

    fn category_key(&self, category: Category) -> Option<Category> {
        match self.key {
            MergeKey::Headword => None,
            MergeKey::HeadwordAndCategory => Some(category),
        }
    }

    fn slot(&self, headword: &str, category: Category) -> Option<&Slot> {
        let key = (normalize_headword(headword), self.category_key(category));
        self.index.get(&key).map(|&i| &self.slots[i])
    }
}

fn normalize_headword(text: &str) -> String {
    let mut s = text.trim().to_string();
    s.make_ascii_lowercase();
    s
}
