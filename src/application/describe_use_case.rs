// ============================================================
// Layer 2 — DescribeUseCase
// ============================================================
// Runs the pipeline without exporting and summarises the data:
//
//   - star rating histogram of the cleaned (pre-balance) set
//   - label counts before and after balancing
//   - mean and max of every text statistic
//   - per-stage kept/dropped counts
//
// The summary renders as a plain-text report with bar charts.

use anyhow::Result;
use std::collections::BTreeMap;
use std::fmt;

use crate::application::prepare_use_case::{PrepareConfig, PrepareUseCase};
use crate::data::pipeline::{PipelineReport, PreparedDataset};
use crate::domain::review::{AnnotatedReview, Label, TextStats};
use crate::domain::traits::ObjectStore;

const BAR_WIDTH: usize = 40;

/// Mean and max of one statistic across a record set.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatSummary {
    pub mean: f64,
    pub max:  f64,
}

impl StatSummary {
    fn over<F>(records: &[AnnotatedReview], value: F) -> Self
    where
        F: Fn(&TextStats) -> f64,
    {
        if records.is_empty() {
            return Self::default();
        }
        let values: Vec<f64> = records.iter().map(|r| value(&r.stats)).collect();
        let sum: f64 = values.iter().sum();
        Self {
            mean: sum / values.len() as f64,
            max:  values.iter().cloned().fold(f64::MIN, f64::max),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    pub input_rows:      usize,
    pub cleaned_rows:    usize,
    /// Exact (text, rating) repeats removed during cleaning
    pub duplicates:      usize,
    pub rating_counts:   BTreeMap<u8, usize>,
    pub labels_before:   BTreeMap<Label, usize>,
    pub labels_after:    BTreeMap<Label, usize>,
    pub stats:           Vec<(&'static str, StatSummary)>,
    pub report:          PipelineReport,
}

impl DatasetSummary {
    pub fn from_dataset(dataset: &PreparedDataset) -> Self {
        let mut rating_counts = BTreeMap::new();
        for r in &dataset.cleaned {
            *rating_counts.entry(r.record.rating).or_insert(0) += 1;
        }

        let cleaned = &dataset.cleaned;
        let stats = vec![
            ("word_count", StatSummary::over(cleaned, |s| s.word_count as f64)),
            ("unique_word_count", StatSummary::over(cleaned, |s| s.unique_word_count as f64)),
            ("char_count", StatSummary::over(cleaned, |s| s.char_count as f64)),
            ("stopword_count", StatSummary::over(cleaned, |s| s.stopword_count as f64)),
            ("punctuation_count", StatSummary::over(cleaned, |s| s.punctuation_count as f64)),
            ("mean_word_length", StatSummary::over(cleaned, |s| s.mean_word_length)),
        ];

        Self {
            input_rows:    dataset.report.input_rows,
            cleaned_rows:  cleaned.len(),
            duplicates:    dataset.report.stage("deduplication").map_or(0, |s| s.dropped),
            rating_counts,
            labels_before: label_counts(&dataset.cleaned),
            labels_after:  label_counts(&dataset.balanced),
            stats,
            report:        dataset.report.clone(),
        }
    }
}

fn label_counts(records: &[AnnotatedReview]) -> BTreeMap<Label, usize> {
    let mut counts = BTreeMap::from([(Label::Negative, 0), (Label::Positive, 0)]);
    for r in records {
        *counts.entry(r.record.label).or_insert(0) += 1;
    }
    counts
}

fn bar(count: usize, largest: usize) -> String {
    if largest == 0 {
        return String::new();
    }
    "#".repeat((count * BAR_WIDTH).div_ceil(largest))
}

fn label_name(label: Label) -> &'static str {
    match label {
        Label::Negative => "negative (0)",
        Label::Positive => "positive (1)",
    }
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Rows: {} read, {} after cleaning ({} duplicates)",
            self.input_rows, self.cleaned_rows, self.duplicates
        )?;

        writeln!(f, "\nStar rating distribution (cleaned)")?;
        let largest = self.rating_counts.values().copied().max().unwrap_or(0);
        for (rating, count) in &self.rating_counts {
            writeln!(f, "  {} | {:<w$} {}", rating, bar(*count, largest), count, w = BAR_WIDTH)?;
        }

        for (title, counts) in [("before", &self.labels_before), ("after", &self.labels_after)] {
            writeln!(f, "\nLabels {title} balancing")?;
            let largest = counts.values().copied().max().unwrap_or(0);
            for (label, count) in counts {
                writeln!(
                    f,
                    "  {:<12} | {:<w$} {}",
                    label_name(*label),
                    bar(*count, largest),
                    count,
                    w = BAR_WIDTH
                )?;
            }
        }

        writeln!(f, "\nText statistics (cleaned)")?;
        for (name, s) in &self.stats {
            writeln!(f, "  {:<18} mean {:>9.2}   max {:>9.2}", name, s.mean, s.max)?;
        }

        writeln!(f, "\nStages")?;
        for s in &self.report.stages {
            writeln!(f, "  {:<18} kept {:>8}   dropped {:>8}", s.stage, s.kept, s.dropped)?;
        }
        Ok(())
    }
}

pub struct DescribeUseCase {
    inner: PrepareUseCase,
}

impl DescribeUseCase {
    pub fn new(config: PrepareConfig) -> Self {
        Self { inner: PrepareUseCase::new(config) }
    }

    pub fn summarize(&self, store: &dyn ObjectStore) -> Result<DatasetSummary> {
        let dataset = self.inner.run_pipeline(store)?;
        Ok(DatasetSummary::from_dataset(&dataset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::pipeline::{PipelineOptions, ReviewPipeline};
    use crate::domain::review::RawRow;

    fn summary() -> DatasetSummary {
        let rows: Vec<RawRow> = [
            ("Loved it", "5"),
            ("Pretty good", "4"),
            ("Really great stuff", "5"),
            ("Broken, sadly.", "1"),
            ("Meh", "3"),
            ("Loved it", "5"),
        ]
        .iter()
        .map(|(t, r)| RawRow::new().with("review_body", *t).with("star_rating", *r))
        .collect();

        let dataset = ReviewPipeline::new(PipelineOptions::default()).prepare(&rows).unwrap();
        DatasetSummary::from_dataset(&dataset)
    }

    #[test]
    fn test_counts_before_and_after_balancing() {
        let s = summary();
        assert_eq!(s.input_rows, 6);
        assert_eq!(s.cleaned_rows, 4);
        assert_eq!(s.duplicates, 1);
        assert_eq!(s.rating_counts, BTreeMap::from([(1, 1), (4, 1), (5, 2)]));
        assert_eq!(s.labels_before[&Label::Positive], 3);
        assert_eq!(s.labels_before[&Label::Negative], 1);
        assert_eq!(s.labels_after[&Label::Positive], 1);
        assert_eq!(s.labels_after[&Label::Negative], 1);
    }

    #[test]
    fn test_word_count_summary() {
        let s = summary();
        let (_, words) = s.stats.iter().find(|(n, _)| *n == "word_count").unwrap();
        // 2 + 2 + 3 + 2 words over 4 reviews
        assert!((words.mean - 2.25).abs() < 1e-9);
        assert_eq!(words.max, 3.0);
    }

    #[test]
    fn test_report_renders_every_section() {
        let text = summary().to_string();
        assert!(text.contains("after cleaning (1 duplicates)"));
        assert!(text.contains("Star rating distribution"));
        assert!(text.contains("Labels before balancing"));
        assert!(text.contains("positive (1)"));
        assert!(text.contains("punctuation_count"));
        assert!(text.contains("deduplication"));
    }

    #[test]
    fn test_bar_scales_to_largest() {
        assert_eq!(bar(10, 10).len(), BAR_WIDTH);
        assert_eq!(bar(0, 10), "");
        assert_eq!(bar(5, 0), "");
    }
}
