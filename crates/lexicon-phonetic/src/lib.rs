//! Phonetic normalization for romanized dictionary pronunciations.
//!
//! Print dictionaries mark retroflex stops, nasalized vowels and aspiration
//! with precomposed diacritics or IPA letters. This crate folds all of that
//! into a stable, typeable key: lowercase ASCII letters and spaces only.
//!
//! # How it works
//! 1. Compose the token (NFC) and apply the [`SubstitutionTable`], which
//!    rescues symbols that decomposition alone would lose (`ṅ` → `ng`).
//! 2. Decompose (NFD) and drop every combining mark.
//! 3. Keep ASCII letters and whitespace, lowercase, trim.
//!
//! The result is idempotent and never fails; input without Latin letters
//! yields an empty string.
//!
//! # Example
//! ```rust
//! use lexicon_phonetic::{Normalizer, normalize};
//!
//! assert_eq!(normalize("ṇaṁ"), "nam");
//! assert_eq!(normalize("/ṅā/"), "nga");
//! assert_eq!(Normalizer::plain().normalize("ṅā"), "na");
//! ```

use std::borrow::Cow;
use std::sync::LazyLock;

use serde::Deserialize;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Built-in substitutions for Indic romanization and common IPA letters.
///
/// Patterns are single precomposed symbols (or a base letter plus a mark with
/// no precomposed form), so no pattern is a substring of another.
pub const DEFAULT_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("ṅ", "ng"),
    ("ñ", "ny"),
    ("ś", "sh"),
    ("ṣ", "sh"),
    ("ṁ", "m"),
    ("ṃ", "m"),
    ("m\u{0310}", "m"),
    ("ḥ", "h"),
    ("ŋ", "ng"),
    ("ɲ", "ny"),
    ("ʃ", "sh"),
    ("ɖ", "d"),
    ("ʈ", "t"),
    ("ɳ", "n"),
    ("ɭ", "l"),
    ("ɽ", "r"),
    ("ə", "e"),
    ("ɛ", "e"),
    ("ɔ", "o"),
    ("æ", "ae"),
    ("ð", "dh"),
    ("θ", "th"),
    ("ø", "o"),
    ("ł", "l"),
    ("đ", "d"),
    ("ı", "i"),
];

static DEFAULT_NORMALIZER: LazyLock<Normalizer> = LazyLock::new(Normalizer::default);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("substitution pattern #{0} is empty")]
    EmptyPattern(usize),
    #[error("substitution pattern {0:?} is plain ASCII and would rewrite normalized output")]
    AsciiPattern(String),
    #[error("substitution pattern {inner:?} overlaps pattern {outer:?}")]
    Overlap { outer: String, inner: String },
}

/// Ordered `(pattern, replacement)` pairs applied before decomposition.
#[derive(Clone, Debug, Deserialize)]
#[serde(try_from = "Vec<(String, String)>")]
pub struct SubstitutionTable {
    pairs: Vec<(Cow<'static, str>, Cow<'static, str>)>,
}

impl SubstitutionTable {
    /// Build a table, rejecting empty, ASCII-only and overlapping patterns.
    ///
    /// Patterns are stored in NFC form so they match composed input.
    pub fn new<I, P, R>(pairs: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = (P, R)>,
        P: Into<Cow<'static, str>>,
        R: Into<Cow<'static, str>>,
    {
        let mut out: Vec<(Cow<'static, str>, Cow<'static, str>)> = Vec::new();
        for (idx, (pattern, replacement)) in pairs.into_iter().enumerate() {
            let pattern = compose(pattern.into());
            if pattern.is_empty() {
                return Err(TableError::EmptyPattern(idx));
            }
            if pattern.is_ascii() {
                return Err(TableError::AsciiPattern(pattern.into_owned()));
            }
            for (existing, _) in &out {
                if existing.contains(pattern.as_ref()) {
                    return Err(TableError::Overlap {
                        outer: existing.to_string(),
                        inner: pattern.into_owned(),
                    });
                }
                if pattern.contains(existing.as_ref()) {
                    return Err(TableError::Overlap {
                        outer: pattern.into_owned(),
                        inner: existing.to_string(),
                    });
                }
            }
            out.push((pattern, replacement.into()));
        }
        Ok(Self { pairs: out })
    }

    pub fn builtin() -> Self {
        Self::new(DEFAULT_SUBSTITUTIONS.iter().copied())
            .expect("built-in substitution table is overlap-free")
    }

    pub fn empty() -> Self {
        Self { pairs: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Compose `text` and replace every table pattern in order.
    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let mut result = compose(Cow::Borrowed(text));
        for (pattern, replacement) in &self.pairs {
            if result.contains(pattern.as_ref()) {
                result = Cow::Owned(result.replace(pattern.as_ref(), replacement));
            }
        }
        result
    }
}

impl TryFrom<Vec<(String, String)>> for SubstitutionTable {
    type Error = TableError;

    fn try_from(pairs: Vec<(String, String)>) -> Result<Self, Self::Error> {
        Self::new(pairs)
    }
}

/// Folds romanized tokens into the ASCII phonetic alphabet.
#[derive(Clone, Debug)]
pub struct Normalizer {
    table: SubstitutionTable,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(SubstitutionTable::builtin())
    }
}

impl Normalizer {
    pub fn new(table: SubstitutionTable) -> Self {
        Self { table }
    }

    /// Normalizer without a substitution pre-pass (decomposition only).
    pub fn plain() -> Self {
        Self::new(SubstitutionTable::empty())
    }

    pub fn normalize(&self, token: &str) -> String {
        let substituted = self.table.apply(token);
        fold_ascii(&substituted)
    }
}

/// Normalize with the built-in substitution table.
pub fn normalize(token: &str) -> String {
    DEFAULT_NORMALIZER.normalize(token)
}

fn fold_ascii(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.nfd() {
        if is_combining_mark(c) {
            continue;
        }
        if c.is_ascii_alphabetic() {
            out.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() {
            out.push(' ');
        }
    }
    let trimmed = out.trim();
    if trimmed.len() == out.len() {
        out
    } else {
        trimmed.to_string()
    }
}

fn compose(text: Cow<'_, str>) -> Cow<'_, str> {
    if text.is_ascii() {
        return text;
    }
    let composed: String = text.nfc().collect();
    if composed == text {
        text
    } else {
        Cow::Owned(composed)
    }
}
