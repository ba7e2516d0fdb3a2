// ============================================================
// Layer 3 — Review Domain Types
// ============================================================
// A review moves through the pipeline in three shapes:
//
//   RawRow          → one row of the input file, every column kept
//   ReviewRecord    → projected, labelled, non-null (text, rating)
//   AnnotatedReview → a ReviewRecord plus its TextStats
//
// The export shapes (LabeledReview, UnlabeledReview) are what
// ends up in the CSV files.
//
// Reference: Rust Book §5 (Structs and Methods)
//            Rust Book §6 (Enums and Pattern Matching)

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// ─── RawRow ───────────────────────────────────────────────────────────────────
/// One row of the input file, keyed by header name.
///
/// An empty field reads back as `None` so that the rest of the
/// pipeline only has to deal with `Option`, but its column still
/// counts as present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    fields:  HashMap<String, String>,
    columns: HashSet<String>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert for hand-written rows.
    #[cfg(test)]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(column, value);
        self
    }

    /// Insert a field. Empty values are treated as null: the column
    /// is recorded, the value is not.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value  = value.into();
        if !value.is_empty() {
            self.fields.insert(column.clone(), value);
        }
        self.columns.insert(column);
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Whether the row carries `column` at all, null or not.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains(column)
    }
}

// ─── Label ────────────────────────────────────────────────────────────────────
/// Binary sentiment label derived from the star rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    Negative,
    Positive,
}

impl Label {
    /// Ratings above 3 are positive, below 3 negative.
    /// A rating of exactly 3 is neutral and has no label.
    pub fn from_rating(rating: u8) -> Option<Self> {
        match rating {
            r if r > 3 => Some(Label::Positive),
            r if r < 3 => Some(Label::Negative),
            _ => None,
        }
    }

    /// The 0/1 value written to the exports.
    pub fn as_u8(self) -> u8 {
        match self {
            Label::Negative => 0,
            Label::Positive => 1,
        }
    }
}

// ─── ReviewRecord ─────────────────────────────────────────────────────────────
/// A cleaned review: text, integer star rating and its label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub text:   String,
    pub rating: u8,
    pub label:  Label,
}

impl ReviewRecord {
    /// Returns None for a neutral rating, which can't be labelled.
    pub fn new(text: impl Into<String>, rating: u8) -> Option<Self> {
        let label = Label::from_rating(rating)?;
        Some(Self { text: text.into(), rating, label })
    }
}

// ─── TextStats ────────────────────────────────────────────────────────────────
/// Lightweight, diagnostic-only statistics about a review's text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TextStats {
    /// Whitespace-delimited tokens
    pub word_count:        usize,
    /// Distinct tokens (the text is already lower-cased)
    pub unique_word_count: usize,
    /// Unicode scalar values, not bytes
    pub char_count:        usize,
    pub stopword_count:    usize,
    /// ASCII punctuation characters
    pub punctuation_count: usize,
    /// 0.0 for empty text
    pub mean_word_length:  f64,
}

/// A review together with the statistics computed for it.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedReview {
    pub record: ReviewRecord,
    pub stats:  TextStats,
}

// ─── Export shapes ────────────────────────────────────────────────────────────
/// `(text, rating, label)` row of the labeled and split exports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabeledReview {
    pub text:   String,
    pub rating: u8,
    pub label:  u8,
}

impl From<&ReviewRecord> for LabeledReview {
    fn from(r: &ReviewRecord) -> Self {
        Self {
            text:   r.text.clone(),
            rating: r.rating,
            label:  r.label.as_u8(),
        }
    }
}

/// Text-only row handed to external annotators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlabeledReview {
    pub text: String,
}

impl From<&ReviewRecord> for UnlabeledReview {
    fn from(r: &ReviewRecord) -> Self {
        Self { text: r.text.clone() }
    }
}
