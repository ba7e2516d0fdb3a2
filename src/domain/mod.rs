// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, enums, and traits that define what the
// system works with:
//
//   review.rs — raw rows, review records, labels, text statistics
//   error.rs  — the pipeline's typed error taxonomy
//   traits.rs — the external collaborators (object storage, catalog)
//
// Rules for this layer:
//   - NO file I/O or network calls
//   - NO CSV parsing or rendering
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §6 (Enums), §10 (Traits)

// Review rows and everything derived from them
pub mod review;

// PipelineError and friends
pub mod error;

// Core abstractions (traits) that the infra layer implements
pub mod traits;
