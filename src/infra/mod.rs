// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Concrete implementations of the Layer 3 collaborator traits
// plus cross-cutting file output:
//
//   local_store.rs — ObjectStore over a local directory tree
//                    (one directory per bucket)
//
//   catalog.rs     — Catalog persisted as catalog.json
//
//   metrics.rs     — Stage metrics logging
//                    Appends per-stage kept/dropped counts to
//                    stage_metrics.csv for later analysis.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)

/// Filesystem-backed object storage
pub mod local_store;

/// JSON-file metadata catalog
pub mod catalog;

/// Stage metrics CSV logger
pub mod metrics;
