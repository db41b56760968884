//! Shared types for turning OCR'd bilingual dictionary text into lexical records.
//!
//! The pipeline has three record shapes, each owned by a different stage:
//! [`RawLine`] (document ingestion), [`CandidateEntry`] (the line parser) and
//! [`NormalizedEntry`] (after phonetic normalization, ready for the lexicon).
//! [`Category`] is the closed part-of-speech set shared by all of them.
//!
//! ```rust
//! use lexicon_types::Category;
//!
//! let cat = Category::from_name("adjective").unwrap();
//! assert_eq!(cat, Category::Adjective);
//! assert_eq!(cat.to_string(), "adjective");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Part-of-speech classification derived from abbreviation markers (`v.`, `n.`, ...).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Verb,
    Noun,
    Adjective,
    Adverb,
    Pronoun,
    Conjunction,
    Numeral,
    ProperNoun,
    Unknown,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Verb,
        Category::Noun,
        Category::Adjective,
        Category::Adverb,
        Category::Pronoun,
        Category::Conjunction,
        Category::Numeral,
        Category::ProperNoun,
        Category::Unknown,
    ];

    /// Parse a canonical category name. Accepts `proper noun` as well as `proper-noun`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "verb" => Some(Category::Verb),
            "noun" => Some(Category::Noun),
            "adjective" => Some(Category::Adjective),
            "adverb" => Some(Category::Adverb),
            "pronoun" => Some(Category::Pronoun),
            "conjunction" => Some(Category::Conjunction),
            "numeral" => Some(Category::Numeral),
            "proper-noun" | "proper noun" | "proper_noun" => Some(Category::ProperNoun),
            "unknown" => Some(Category::Unknown),
            _ => None,
        }
    }

    /// Canonical name, as stored and exported.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Verb => "verb",
            Category::Noun => "noun",
            Category::Adjective => "adjective",
            Category::Adverb => "adverb",
            Category::Pronoun => "pronoun",
            Category::Conjunction => "conjunction",
            Category::Numeral => "numeral",
            Category::ProperNoun => "proper-noun",
            Category::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the source document and its 1-based position.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RawLine<'a> {
    pub number: usize,
    pub text: &'a str,
}

impl<'a> RawLine<'a> {
    pub fn new(number: usize, text: &'a str) -> Self {
        Self { number, text }
    }
}

/// Unverified per-line extraction result.
///
/// `headword` and `romanization` are non-empty for every entry the parser
/// emits; `script_form` may be empty.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CandidateEntry {
    pub headword: String,
    pub category: Category,
    pub script_form: String,
    pub romanization: String,
    pub source_line: usize,
}

impl CandidateEntry {
    pub fn is_valid(&self) -> bool {
        !self.headword.trim().is_empty() && !self.romanization.trim().is_empty()
    }
}

/// A candidate whose romanization has been folded to the ASCII phonetic alphabet.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEntry {
    pub headword: String,
    pub category: Category,
    #[serde(rename = "script")]
    pub script_form: String,
    pub phonetic: String,
    pub source_line: usize,
}
