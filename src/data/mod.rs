// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the raw review file and the CSV exports.
//
//   review file bytes (.tsv / .tsv.gz)
//       │
//       ▼
//   TsvLoader       → header check, RawRows
//       │
//       ▼
//   ReviewPipeline  → project, label, dedup, normalise, filter
//       │              (Preprocessor + TextAnalyzer)
//       ▼
//   balancer        → seeded downsampling of the majority label
//       │
//       ▼
//   splitter        → train / test / validate
//       │
//       ▼
//   ExportBundle    → five CSV files, uploaded all or nothing
//
// Reference: Rust Book §13 (Iterators and Closures)

/// Parses TSV review files into raw rows
pub mod loader;

/// Lower-casing and markup stripping
pub mod preprocessor;

/// Per-review text statistics and stop words
pub mod stats;

/// Seeded class balancing
pub mod balancer;

/// Seeded hold-out splits
pub mod splitter;

/// The twelve-stage preparation pipeline
pub mod pipeline;

/// CSV rendering and publishing of the exports
pub mod exporter;
