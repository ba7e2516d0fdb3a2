// ============================================================
// Layer 4 — Review Loader
// ============================================================
// Turns the raw bytes of a review file into RawRows.
//
// Input format:
//   - tab-separated values with a header row
//   - optionally gzip-compressed (detected by the magic bytes)
//
// Every column is kept at this point; projection down to the
// text and rating columns happens in the pipeline.
//
// Failure handling:
//   - a header without a required column → MissingField
//   - no header, or no data rows          → EmptyInput
//   - a line the csv reader rejects       → skipped with a warning
//
// Reference: csv crate documentation (ReaderBuilder)
//            flate2 crate documentation (GzDecoder)
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use flate2::read::GzDecoder;
use std::io::Read;

use crate::domain::error::PipelineError;
use crate::domain::review::RawRow;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Loads tab-separated review files.
pub struct TsvLoader {
    /// Columns that must be present in the header
    required: Vec<String>,
}

impl TsvLoader {
    pub fn new<I, S>(required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required: required.into_iter().map(Into::into).collect(),
        }
    }

    /// Decode `bytes` (named `source` in log messages) into rows.
    pub fn load(&self, source: &str, bytes: &[u8]) -> Result<Vec<RawRow>> {
        let plain = decompress(bytes)
            .with_context(|| format!("Cannot decompress '{source}'"))?;

        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .from_reader(plain.as_slice());

        let headers = reader
            .headers()
            .with_context(|| format!("Cannot read header row of '{source}'"))?
            .clone();

        if headers.is_empty() || headers.iter().all(str::is_empty) {
            return Err(PipelineError::EmptyInput { stage: "loading" }.into());
        }

        for column in &self.required {
            if !headers.iter().any(|h| h == column) {
                return Err(PipelineError::MissingField { field: column.clone() }.into());
            }
        }

        let mut rows    = Vec::new();
        let mut skipped = 0usize;

        for (line, record) in reader.records().enumerate() {
            match record {
                Ok(record) => {
                    // Short rows still carry every header column, as nulls
                    let mut row = RawRow::new();
                    for (i, column) in headers.iter().enumerate() {
                        row.insert(column, record.get(i).unwrap_or(""));
                    }
                    rows.push(row);
                }
                // Drop the line but keep reading
                Err(e) => {
                    skipped += 1;
                    tracing::warn!("Skipping line {} of '{}': {}", line + 2, source, e);
                }
            }
        }

        if rows.is_empty() {
            return Err(PipelineError::EmptyInput { stage: "loading" }.into());
        }

        tracing::info!(
            "Loaded {} rows from '{}' ({} skipped)",
            rows.len(),
            source,
            skipped
        );
        Ok(rows)
    }
}

/// Gunzip when the bytes carry the gzip magic, otherwise copy them.
fn decompress(bytes: &[u8]) -> Result<Vec<u8>> {
    if !bytes.starts_with(&GZIP_MAGIC) {
        return Ok(bytes.to_vec());
    }

    let mut decoder = GzDecoder::new(bytes);
    let mut out     = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}
