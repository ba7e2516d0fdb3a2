// ============================================================
// Layer 3 — Pipeline Errors
// ============================================================
// The pipeline recovers locally from malformed rows (they are
// dropped and counted), so only whole-input problems surface
// here. Storage and catalog failures are reported through
// anyhow with context at the application layer.
//
// Reference: Rust Book §9 (Recoverable Errors with Result)
//            thiserror crate documentation

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// No records left to export. `stage` names where they ran out.
    #[error("no review records remain after {stage}")]
    EmptyInput { stage: &'static str },

    /// The input does not carry a column the pipeline needs.
    #[error("input is missing the expected field '{field}'")]
    MissingField { field: String },
}
