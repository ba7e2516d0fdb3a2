// ============================================================
// Layer 4 — Review Preparation Pipeline
// ============================================================
// One operation, `prepare`, running twelve stages in order:
//
//    1. projection         keep only the text and rating fields
//    2. neutral exclusion  drop rating == 3
//    3. labeling           1 if rating > 3, 0 if rating < 3
//    4. null elimination   drop missing text or rating
//    5. deduplication      exact (text, rating) pairs, first wins
//    6. normalization      integer rating, lower-cased text
//    7. markup stripping   remove embedded tags
//    8. statistics         TextStats per record
//    9. outlier filtering  words <= max_words, punctuation < max_punctuation
//   10. class balancing    downsample the majority label (seeded)
//   11. export shaping     labeled triples + unlabeled text
//   12. splitting          train/test, then train/validate (seeded)
//
// A rating that is present but not an integer in 1..=5 makes its
// row malformed; the row is dropped during projection and
// counted, never fatal. The run fails only when the input is
// empty, lacks the text/rating fields, or nothing survives to
// the export.
//
// Each stage records a StageMetrics entry (kept/dropped) in the
// PipelineReport returned alongside the data.
//
// Reference: Rust Book §13 (Iterators and Closures)

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::data::{
    balancer::balance_by,
    preprocessor::Preprocessor,
    splitter::split_holdout,
    stats::TextAnalyzer,
};
use crate::domain::error::PipelineError;
use crate::domain::review::{
    AnnotatedReview, Label, LabeledReview, RawRow, ReviewRecord, UnlabeledReview,
};

// ─── Options ──────────────────────────────────────────────────────────────────
/// Everything the pipeline needs to know besides the rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    pub text_column:      String,
    pub rating_column:    String,
    /// Seed for balancing and both splits
    pub seed:             u64,
    /// Records with more words than this are dropped (inclusive bound)
    pub max_words:        usize,
    /// Records with this many punctuation characters or more are dropped
    pub max_punctuation:  usize,
    pub test_percent:     u8,
    pub validate_percent: u8,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            text_column:      "review_body".to_string(),
            rating_column:    "star_rating".to_string(),
            seed:             42,
            max_words:        500,
            max_punctuation:  500,
            test_percent:     20,
            validate_percent: 20,
        }
    }
}

// ─── Report ───────────────────────────────────────────────────────────────────
/// Row counts for a single stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageMetrics {
    pub stage:   String,
    pub kept:    usize,
    pub dropped: usize,
}

/// Per-stage counts for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub input_rows: usize,
    pub stages:     Vec<StageMetrics>,
}

impl PipelineReport {
    fn record(&mut self, stage: &str, before: usize, after: usize) {
        tracing::info!(
            "Stage '{}': kept {}, dropped {}",
            stage,
            after,
            before.saturating_sub(after)
        );
        self.stages.push(StageMetrics {
            stage:   stage.to_string(),
            kept:    after,
            dropped: before.saturating_sub(after),
        });
    }

    /// Metrics of the named stage, if it ran.
    pub fn stage(&self, name: &str) -> Option<&StageMetrics> {
        self.stages.iter().find(|s| s.stage == name)
    }
}

// ─── Output ───────────────────────────────────────────────────────────────────
/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    /// Outlier-filtered records before balancing
    pub cleaned:   Vec<AnnotatedReview>,
    /// The balanced set the exports are derived from
    pub balanced:  Vec<AnnotatedReview>,
    pub labeled:   Vec<LabeledReview>,
    pub unlabeled: Vec<UnlabeledReview>,
    pub train:     Vec<LabeledReview>,
    pub test:      Vec<LabeledReview>,
    pub validate:  Vec<LabeledReview>,
    pub report:    PipelineReport,
}

// ─── Intermediate rows ────────────────────────────────────────────────────────
/// A projected row: only text and rating, either possibly null.
#[derive(Debug, Clone, PartialEq)]
struct Projected {
    text:   Option<String>,
    rating: Option<u8>,
}

/// A projected row with its label attached.
#[derive(Debug, Clone, PartialEq)]
struct Labeled {
    text:   Option<String>,
    rating: Option<u8>,
    label:  Option<Label>,
}

/// Coerce a rating field. `"4"` and `"4.0"` are both 4; anything
/// non-numeric, fractional, or outside 1..=5 is malformed.
pub fn parse_rating(raw: &str) -> Option<u8> {
    let raw = raw.trim();
    let value = match raw.parse::<i64>() {
        Ok(v) => v,
        Err(_) => {
            let f = raw.parse::<f64>().ok()?;
            if !f.is_finite() || f.fract() != 0.0 {
                return None;
            }
            f as i64
        }
    };

    match value {
        1..=5 => u8::try_from(value).ok(),
        _ => None,
    }
}

// ─── ReviewPipeline ───────────────────────────────────────────────────────────
pub struct ReviewPipeline {
    options:      PipelineOptions,
    preprocessor: Preprocessor,
    analyzer:     TextAnalyzer,
}

impl ReviewPipeline {
    pub fn new(options: PipelineOptions) -> Self {
        Self {
            options,
            preprocessor: Preprocessor::new(),
            analyzer:     TextAnalyzer::new(),
        }
    }

    /// Run every stage over `rows`.
    pub fn prepare(&self, rows: &[RawRow]) -> Result<PreparedDataset, PipelineError> {
        let opts = &self.options;

        if rows.is_empty() {
            return Err(PipelineError::EmptyInput { stage: "loading" });
        }
        for column in [&opts.text_column, &opts.rating_column] {
            if !rows.iter().any(|r| r.has_column(column)) {
                return Err(PipelineError::MissingField { field: column.clone() });
            }
        }

        let mut report = PipelineReport { input_rows: rows.len(), stages: Vec::new() };

        // ── Step 1: Projection ───────────────────────────────────────────────
        let projected = self.project(rows);
        report.record("projection", rows.len(), projected.len());

        // ── Step 2: Neutral exclusion ────────────────────────────────────────
        let before = projected.len();
        let non_neutral: Vec<Projected> = projected
            .into_iter()
            .filter(|p| p.rating != Some(3))
            .collect();
        report.record("neutral_exclusion", before, non_neutral.len());

        // ── Step 3: Labeling ─────────────────────────────────────────────────
        let labeled: Vec<Labeled> = non_neutral
            .into_iter()
            .map(|p| Labeled {
                label:  p.rating.and_then(Label::from_rating),
                text:   p.text,
                rating: p.rating,
            })
            .collect();
        report.record("labeling", labeled.len(), labeled.len());

        // ── Step 4: Null elimination ─────────────────────────────────────────
        let before = labeled.len();
        let records: Vec<ReviewRecord> = labeled
            .into_iter()
            .filter_map(|l| match (l.text, l.rating, l.label) {
                (Some(text), Some(rating), Some(_)) => ReviewRecord::new(text, rating),
                _ => None,
            })
            .collect();
        report.record("null_elimination", before, records.len());

        // ── Step 5: Deduplication ────────────────────────────────────────────
        let before = records.len();
        let records = dedup_records(records);
        report.record("deduplication", before, records.len());

        // ── Steps 6 + 7: Normalization and markup stripping ──────────────────
        // The rating is already an integer from projection.
        let records: Vec<ReviewRecord> = records
            .into_iter()
            .map(|mut r| {
                r.text = self.preprocessor.normalize(&r.text);
                r
            })
            .collect();
        report.record("normalization", records.len(), records.len());

        let records: Vec<ReviewRecord> = records
            .into_iter()
            .map(|mut r| {
                r.text = self.preprocessor.strip_markup(&r.text);
                r
            })
            .collect();
        report.record("markup_stripping", records.len(), records.len());

        // ── Step 8: Statistics annotation ────────────────────────────────────
        let annotated: Vec<AnnotatedReview> = records
            .into_iter()
            .map(|record| {
                let stats = self.analyzer.analyze(&record.text);
                AnnotatedReview { record, stats }
            })
            .collect();
        report.record("statistics", annotated.len(), annotated.len());

        // ── Step 9: Outlier filtering ────────────────────────────────────────
        let before = annotated.len();
        let cleaned: Vec<AnnotatedReview> = annotated
            .into_iter()
            .filter(|a| self.within_bounds(a))
            .collect();
        report.record("outlier_filtering", before, cleaned.len());

        if cleaned.is_empty() {
            return Err(PipelineError::EmptyInput { stage: "cleaning" });
        }

        // ── Step 10: Class balancing ─────────────────────────────────────────
        let balanced = balance_by(cleaned.clone(), |a| a.record.label, opts.seed);
        report.record("balancing", cleaned.len(), balanced.len());

        if balanced.is_empty() {
            return Err(PipelineError::EmptyInput { stage: "balancing" });
        }

        // ── Step 11: Export shaping ──────────────────────────────────────────
        let labeled_out: Vec<LabeledReview> =
            balanced.iter().map(|a| LabeledReview::from(&a.record)).collect();
        let unlabeled_out: Vec<UnlabeledReview> =
            balanced.iter().map(|a| UnlabeledReview::from(&a.record)).collect();
        report.record("export_shaping", balanced.len(), labeled_out.len());

        // ── Step 12: Splitting ───────────────────────────────────────────────
        let (train, test)     = split_holdout(labeled_out.clone(), opts.test_percent, opts.seed);
        let (train, validate) = split_holdout(train, opts.validate_percent, opts.seed);
        tracing::info!(
            "Split {} labeled records: {} train, {} test, {} validate",
            labeled_out.len(),
            train.len(),
            test.len(),
            validate.len()
        );
        report.record("splitting", labeled_out.len(), train.len() + test.len() + validate.len());

        Ok(PreparedDataset {
            cleaned,
            balanced,
            labeled: labeled_out,
            unlabeled: unlabeled_out,
            train,
            test,
            validate,
            report,
        })
    }

    /// Keep the text and rating columns. A rating that is present
    /// but can't be coerced drops the whole row.
    fn project(&self, rows: &[RawRow]) -> Vec<Projected> {
        let opts = &self.options;
        let mut malformed = 0usize;

        let projected: Vec<Projected> = rows
            .iter()
            .filter_map(|row| {
                let rating = match row.get(&opts.rating_column) {
                    None => None,
                    Some(raw) => match parse_rating(raw) {
                        Some(r) => Some(r),
                        None => {
                            malformed += 1;
                            tracing::debug!("Dropping row with malformed rating {:?}", raw);
                            return None;
                        }
                    },
                };
                Some(Projected {
                    text: row.get(&opts.text_column).map(str::to_string),
                    rating,
                })
            })
            .collect();

        if malformed > 0 {
            tracing::warn!("Dropped {} rows with malformed ratings", malformed);
        }
        projected
    }

    fn within_bounds(&self, a: &AnnotatedReview) -> bool {
        a.stats.word_count <= self.options.max_words
            && a.stats.punctuation_count < self.options.max_punctuation
    }
}

/// Drop exact (text, rating) duplicates, keeping the first occurrence.
fn dedup_records(records: Vec<ReviewRecord>) -> Vec<ReviewRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert((r.text.clone(), r.rating)))
        .collect()
}
