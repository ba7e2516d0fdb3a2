// ============================================================
// Layer 6 — Stage Metrics Logger
// ============================================================
// Records how many rows each pipeline stage kept and dropped,
// one CSV row per stage per run.
//
// Output file: <dir>/stage_metrics.csv
//
// Example CSV output:
//   run_id,stage,kept,dropped
//   1760600000,projection,1000,3
//   1760600000,neutral_exclusion,912,88
//   ...
//
// The header is written once; later runs append to the file.
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (I/O and File Handling)

use anyhow::Result;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};

use crate::data::pipeline::PipelineReport;

/// Appends pipeline reports to a CSV file.
pub struct MetricsLogger {
    /// Full path to the CSV file
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a new MetricsLogger.
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("stage_metrics.csv");

        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "run_id,stage,kept,dropped")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one row per stage of `report`, tagged with `run_id`.
    pub fn log(&self, run_id: &str, report: &PipelineReport) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        for s in &report.stages {
            writeln!(f, "{},{},{},{}", run_id, s.stage, s.kept, s.dropped)?;
        }

        tracing::debug!(
            "Logged {} stage metrics for run {} to '{}'",
            report.stages.len(),
            run_id,
            self.csv_path.display()
        );

        Ok(())
    }

    /// Return the path to the metrics CSV file
    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}
