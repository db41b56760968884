use serde::{Deserialize, Serialize};
use thiserror::Error;

use lexicon_types::Category;

/// Abbreviation literal printed after a headword (`v.`) and the category it denotes.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CategoryMarker {
    pub literal: String,
    pub category: Category,
}

impl CategoryMarker {
    pub fn new(literal: impl Into<String>, category: Category) -> Self {
        Self {
            literal: literal.into(),
            category,
        }
    }
}

/// Inclusive character-count bounds for a headword.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LengthBounds {
    pub min: usize,
    pub max: usize,
}

impl LengthBounds {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, len: usize) -> bool {
        (self.min..=self.max).contains(&len)
    }
}

/// Everything about a dictionary's print conventions the parser needs.
///
/// Defaults describe the English–Banjara dictionary. Other language pairs
/// supply their own marker lists, typically from a JSON file:
///
/// ```rust
/// use lexicon_parser::ParserConfig;
///
/// let cfg: ParserConfig = serde_json::from_str(r#"{
///     "markers": [{ "literal": "vb.", "category": "verb" }],
///     "delimiter": "|"
/// }"#).unwrap();
/// assert_eq!(cfg.delimiter, '|');
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub markers: Vec<CategoryMarker>,
    pub rejection_markers: Vec<String>,
    pub delimiter: char,
    /// Bounds for headwords taken from delimited lines.
    pub headword_len: LengthBounds,
    /// Bounds for the weaker marker-only and two-column strategies.
    pub fallback_headword_len: LengthBounds,
    pub min_non_space: usize,
    pub reject_section_letters: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            markers: vec![
                CategoryMarker::new("v.", Category::Verb),
                CategoryMarker::new("n.", Category::Noun),
                CategoryMarker::new("adj.", Category::Adjective),
                CategoryMarker::new("adv.", Category::Adverb),
                CategoryMarker::new("pron.", Category::Pronoun),
                CategoryMarker::new("conj.", Category::Conjunction),
                CategoryMarker::new("num.", Category::Numeral),
                CategoryMarker::new("prop.", Category::ProperNoun),
            ],
            rejection_markers: ["English Section", "Page", "Section", "ఆంగ", "===", "---"]
                .into_iter()
                .map(String::from)
                .collect(),
            delimiter: '/',
            headword_len: LengthBounds::new(1, 35),
            fallback_headword_len: LengthBounds::new(2, 34),
            min_non_space: 3,
            reject_section_letters: true,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("category marker #{0} has an empty literal")]
    EmptyMarker(usize),
    #[error("category marker {0:?} contains the romanization delimiter")]
    MarkerContainsDelimiter(String),
    #[error("rejection marker #{0} is empty")]
    EmptyRejectionMarker(usize),
    #[error("delimiter {0:?} must not be alphanumeric or whitespace")]
    InvalidDelimiter(char),
    #[error("{name} bounds are inverted or zero (min {min}, max {max})")]
    InvalidBounds {
        name: &'static str,
        min: usize,
        max: usize,
    },
}

impl ParserConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.delimiter.is_alphanumeric() || self.delimiter.is_whitespace() {
            return Err(ConfigError::InvalidDelimiter(self.delimiter));
        }
        for (idx, marker) in self.markers.iter().enumerate() {
            if marker.literal.trim().is_empty() {
                return Err(ConfigError::EmptyMarker(idx));
            }
            if marker.literal.contains(self.delimiter) {
                return Err(ConfigError::MarkerContainsDelimiter(marker.literal.clone()));
            }
        }
        for (idx, marker) in self.rejection_markers.iter().enumerate() {
            if marker.is_empty() {
                return Err(ConfigError::EmptyRejectionMarker(idx));
            }
        }
        check_bounds("headword", self.headword_len)?;
        check_bounds("fallback headword", self.fallback_headword_len)?;
        Ok(())
    }

    /// Whether `word` is one of the configured marker literals (case-insensitive).
    pub fn is_marker_literal(&self, word: &str) -> bool {
        self.markers
            .iter()
            .any(|m| m.literal.eq_ignore_ascii_case(word))
    }
}

fn check_bounds(name: &'static str, bounds: LengthBounds) -> Result<(), ConfigError> {
    if bounds.min == 0 || bounds.min > bounds.max {
        return Err(ConfigError::InvalidBounds {
            name,
            min: bounds.min,
            max: bounds.max,
        });
    }
    Ok(())
}
