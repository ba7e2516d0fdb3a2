// ============================================================
// Layer 4 — CSV Exporter
// ============================================================
// Renders the five exports of a PreparedDataset and publishes
// them to an ObjectStore.
//
//   labeled    text,rating,label   every field quoted, no header
//   unlabeled  text                header row, minimal quoting
//   train      text,rating,label   no header, minimal quoting
//   test       text,rating,label   no header, minimal quoting
//   validate   text,rating,label   no header, minimal quoting
//
// Rendering happens entirely in memory before anything is
// uploaded, and whatever already sits at the five target keys is
// read back first. If an upload fails, every key written in this
// call is put back the way it was: earlier contents restored,
// new keys deleted. A run therefore replaces all five files or
// leaves the prefix untouched.
//
// Reference: csv crate documentation (WriterBuilder, QuoteStyle)

use anyhow::{Context, Result};
use csv::{QuoteStyle, WriterBuilder};
use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;

use crate::data::pipeline::PreparedDataset;
use crate::domain::traits::ObjectStore;

/// An export could not be rendered to CSV.
#[derive(Debug, Error)]
#[error("failed to render export '{name}': {source}")]
pub struct ExportError {
    pub name: &'static str,
    #[source]
    source:   csv::Error,
}

/// One rendered CSV file and where it goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub name:  &'static str,
    pub key:   String,
    pub bytes: Vec<u8>,
}

/// All five exports of a run, rendered and ready to upload.
#[derive(Debug, Clone)]
pub struct ExportBundle {
    files: Vec<ExportFile>,
}

/// Object key of the export `name` under `prefix`:
/// `<prefix>/<name>/<name>.csv`.
pub fn export_key(prefix: &str, name: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        format!("{name}/{name}.csv")
    } else {
        format!("{prefix}/{name}/{name}.csv")
    }
}

/// Directory (`<prefix>/<name>`) holding the export `name`.
pub fn export_dir(prefix: &str, name: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

impl ExportBundle {
    /// Render every export of `dataset` with keys under `prefix`.
    pub fn render(dataset: &PreparedDataset, prefix: &str) -> Result<Self, ExportError> {
        let files = vec![
            render_file("labeled", prefix, &dataset.labeled, QuoteStyle::Always, false)?,
            render_file("unlabeled", prefix, &dataset.unlabeled, QuoteStyle::Necessary, true)?,
            render_file("train", prefix, &dataset.train, QuoteStyle::Necessary, false)?,
            render_file("test", prefix, &dataset.test, QuoteStyle::Necessary, false)?,
            render_file("validate", prefix, &dataset.validate, QuoteStyle::Necessary, false)?,
        ];
        Ok(Self { files })
    }

    #[cfg(test)]
    pub fn file(&self, name: &str) -> Option<&ExportFile> {
        self.files.iter().find(|f| f.name == name)
    }

    /// Upload every file to `bucket`. On failure, undo the uploads
    /// made so far and return the original error.
    pub fn publish(&self, store: &dyn ObjectStore, bucket: &str) -> Result<Vec<String>> {
        let snapshots = self.snapshot(store, bucket)?;
        let mut written: Vec<(&str, Option<&[u8]>)> = Vec::with_capacity(self.files.len());

        for (file, previous) in self.files.iter().zip(&snapshots) {
            let upload = store
                .upload(bucket, &file.key, &file.bytes)
                .with_context(|| format!("Cannot upload '{}' to '{}/{}'", file.name, bucket, file.key));

            if let Err(e) = upload {
                tracing::warn!("Export failed, rolling back {} uploaded files", written.len());
                rollback(store, bucket, &written);
                return Err(e);
            }

            tracing::info!(
                "Uploaded {} ({} bytes) to '{}/{}'",
                file.name,
                file.bytes.len(),
                bucket,
                file.key
            );
            written.push((file.key.as_str(), previous.as_deref()));
        }

        Ok(written.into_iter().map(|(key, _)| key.to_string()).collect())
    }

    /// Current contents of each target key, `None` where the key is new.
    fn snapshot(&self, store: &dyn ObjectStore, bucket: &str) -> Result<Vec<Option<Vec<u8>>>> {
        let existing: HashSet<String> = store
            .list(bucket)
            .with_context(|| format!("Cannot list '{}' before export", bucket))?
            .into_iter()
            .collect();

        self.files
            .iter()
            .map(|file| {
                if !existing.contains(&file.key) {
                    return Ok(None);
                }
                tracing::debug!("Keeping a copy of '{}/{}' for rollback", bucket, file.key);
                store
                    .download(bucket, &file.key)
                    .map(Some)
                    .with_context(|| format!("Cannot read existing '{}/{}'", bucket, file.key))
            })
            .collect()
    }
}

/// Put every written key back: restore what was there, delete what wasn't.
fn rollback(store: &dyn ObjectStore, bucket: &str, written: &[(&str, Option<&[u8]>)]) {
    for (key, previous) in written {
        let undo = match previous {
            Some(bytes) => store.upload(bucket, key, bytes),
            None        => store.delete(bucket, key),
        };
        if let Err(e) = undo {
            tracing::warn!("Could not roll back '{}/{}': {}", bucket, key, e);
        }
    }
}

fn render_file<T: Serialize>(
    name:    &'static str,
    prefix:  &str,
    rows:    &[T],
    quoting: QuoteStyle,
    header:  bool,
) -> Result<ExportFile, ExportError> {
    let to_err = |source: csv::Error| ExportError { name, source };

    let mut writer = WriterBuilder::new()
        .has_headers(header)
        .quote_style(quoting)
        .from_writer(Vec::new());

    for row in rows {
        writer.serialize(row).map_err(to_err)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| to_err(csv::Error::from(e.into_error())))?;

    Ok(ExportFile { name, key: export_key(prefix, name), bytes })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::pipeline::{PipelineOptions, ReviewPipeline};
    use crate::domain::review::RawRow;
    use anyhow::anyhow;
    use std::cell::{Cell, RefCell};
    use std::collections::BTreeMap;

    fn dataset() -> PreparedDataset {
        let rows = vec![
            RawRow::new().with("review_body", "Great phone!! <br/>Loved it").with("star_rating", "5"),
            RawRow::new().with("review_body", "Terrible, broke in a day").with("star_rating", "1"),
        ];
        ReviewPipeline::new(PipelineOptions::default()).prepare(&rows).unwrap()
    }

    fn text(bundle: &ExportBundle, name: &str) -> String {
        String::from_utf8(bundle.file(name).unwrap().bytes.clone()).unwrap()
    }

    /// In-memory store that fails uploads whose key contains `fail_on`.
    #[derive(Default)]
    struct FlakyStore {
        objects: RefCell<BTreeMap<String, Vec<u8>>>,
        fail_on: Cell<Option<&'static str>>,
    }

    impl ObjectStore for FlakyStore {
        fn create_bucket(&self, _bucket: &str) -> Result<bool> {
            Ok(true)
        }
        fn download(&self, _bucket: &str, key: &str) -> Result<Vec<u8>> {
            self.objects.borrow().get(key).cloned().ok_or_else(|| anyhow!("missing {key}"))
        }
        fn upload(&self, _bucket: &str, key: &str, bytes: &[u8]) -> Result<()> {
            if self.fail_on.get().is_some_and(|f| key.contains(f)) {
                return Err(anyhow!("storage unavailable"));
            }
            self.objects.borrow_mut().insert(key.to_string(), bytes.to_vec());
            Ok(())
        }
        fn list(&self, _bucket: &str) -> Result<Vec<String>> {
            Ok(self.objects.borrow().keys().cloned().collect())
        }
        fn delete(&self, _bucket: &str, key: &str) -> Result<()> {
            self.objects.borrow_mut().remove(key);
            Ok(())
        }
    }

    #[test]
    fn test_export_keys() {
        assert_eq!(export_key("out", "train"), "out/train/train.csv");
        assert_eq!(export_key("/out/", "test"), "out/test/test.csv");
        assert_eq!(export_key("", "labeled"), "labeled/labeled.csv");
        assert_eq!(export_dir("out", "labeled"), "out/labeled");
    }

    #[test]
    fn test_labeled_is_fully_quoted_without_header() {
        let bundle  = ExportBundle::render(&dataset(), "out").unwrap();
        let labeled = text(&bundle, "labeled");
        assert!(labeled.contains("\"great phone!! loved it\",\"5\",\"1\"\n"));
        assert!(labeled.contains("\"terrible, broke in a day\",\"1\",\"0\"\n"));
        assert_eq!(labeled.lines().count(), 2);
    }

    #[test]
    fn test_unlabeled_has_header() {
        let bundle    = ExportBundle::render(&dataset(), "out").unwrap();
        let unlabeled = text(&bundle, "unlabeled");
        let lines: Vec<&str> = unlabeled.lines().collect();
        assert_eq!(lines[0], "text");
        assert_eq!(lines.len(), 3);
        assert!(lines.contains(&"\"terrible, broke in a day\""));
        assert!(lines.contains(&"great phone!! loved it"));
    }

    #[test]
    fn test_splits_use_minimal_quoting() {
        let bundle = ExportBundle::render(&dataset(), "out").unwrap();
        let all: String = ["train", "test", "validate"].iter().map(|n| text(&bundle, n)).collect();
        assert_eq!(all.lines().count(), 2);
        assert!(all.contains("great phone!! loved it,5,1\n"));
        assert!(all.contains("\"terrible, broke in a day\",1,0\n"));
    }

    #[test]
    fn test_publish_writes_all_five() {
        let store  = FlakyStore::default();
        let bundle = ExportBundle::render(&dataset(), "out").unwrap();
        let keys   = bundle.publish(&store, "bucket").unwrap();
        assert_eq!(keys.len(), 5);
        assert_eq!(store.list("bucket").unwrap().len(), 5);
    }

    #[test]
    fn test_failed_publish_leaves_nothing_behind() {
        let store  = FlakyStore::default();
        store.fail_on.set(Some("test/"));
        let bundle = ExportBundle::render(&dataset(), "out").unwrap();
        assert!(bundle.publish(&store, "bucket").is_err());
        assert!(store.list("bucket").unwrap().is_empty());
    }

    #[test]
    fn test_failed_republish_restores_previous_run() {
        let store = FlakyStore::default();
        let first = ExportBundle::render(&dataset(), "out").unwrap();
        first.publish(&store, "bucket").unwrap();

        let rows = vec![
            RawRow::new().with("review_body", "Second run, five stars").with("star_rating", "5"),
            RawRow::new().with("review_body", "Second run, one star").with("star_rating", "1"),
        ];
        let second_dataset = ReviewPipeline::new(PipelineOptions::default()).prepare(&rows).unwrap();
        let second = ExportBundle::render(&second_dataset, "out").unwrap();

        store.fail_on.set(Some("test/"));
        assert!(second.publish(&store, "bucket").is_err());

        assert_eq!(store.list("bucket").unwrap().len(), 5);
        for file in &first.files {
            assert_eq!(store.download("bucket", &file.key).unwrap(), file.bytes, "{}", file.name);
        }
    }

    #[test]
    fn test_rollback_keeps_unrelated_keys() {
        let store = FlakyStore::default();
        store.upload("bucket", "out/notes.txt", b"keep me").unwrap();
        store.fail_on.set(Some("validate/"));

        let bundle = ExportBundle::render(&dataset(), "out").unwrap();
        assert!(bundle.publish(&store, "bucket").is_err());
        assert_eq!(store.list("bucket").unwrap(), vec!["out/notes.txt"]);
    }
}
