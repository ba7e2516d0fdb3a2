// ============================================================
// Layer 2 — PrepareUseCase
// ============================================================
// Orchestrates a full preparation run in order:
//
//   Step 1: Ensure the output bucket exists   (Layer 6 - infra)
//   Step 2: Download the raw review file      (Layer 6 - infra)
//   Step 3: Parse TSV into raw rows           (Layer 4 - data)
//   Step 4: Run the twelve pipeline stages    (Layer 4 - data)
//   Step 5: Render all five CSV exports       (Layer 4 - data)
//   Step 6: Upload them, all or nothing       (Layer 6 - infra)
//   Step 7: Append stage metrics (optional)   (Layer 6 - infra)
//   Step 8: Register in the catalog (optional)
//
// Reference: Rust Book §13 (Iterators and Closures)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::application::register_use_case::{RegisterConfig, RegisterUseCase};
use crate::data::{
    exporter::ExportBundle,
    loader::TsvLoader,
    pipeline::{PipelineOptions, PipelineReport, PreparedDataset, ReviewPipeline},
};
use crate::domain::review::RawRow;
use crate::domain::traits::{Catalog, ObjectStore};
use crate::infra::metrics::MetricsLogger;

// ─── Prepare Configuration ───────────────────────────────────────────────────
// Serialisable so a run can be described in a JSON file
// (`prepare --config run.json`) instead of flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepareConfig {
    pub storage_root:  String,
    pub input_bucket:  String,
    pub input_key:     String,
    pub output_bucket: String,
    pub output_prefix: String,
    pub metrics_dir:   Option<String>,
    pub catalog_dir:   String,
    /// Register the labeled export in the catalog after upload
    pub register:      bool,
    pub database:      String,
    pub table:         String,
    #[serde(flatten)]
    pub pipeline:      PipelineOptions,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            storage_root:  "storage".to_string(),
            input_bucket:  "reviews-raw".to_string(),
            input_key:     "amazon_reviews_us_Digital_Software_v1_00.tsv.gz".to_string(),
            output_bucket: "reviews-prepared".to_string(),
            output_prefix: "prepared".to_string(),
            metrics_dir:   None,
            catalog_dir:   "catalog".to_string(),
            register:      false,
            database:      "reviews".to_string(),
            table:         "labeled_reviews".to_string(),
            pipeline:      PipelineOptions::default(),
        }
    }
}

impl PrepareConfig {
    /// Load a config from JSON. Missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config from '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Invalid config in '{}'", path.display()))
    }

    pub fn register_config(&self) -> RegisterConfig {
        RegisterConfig {
            catalog_dir: self.catalog_dir.clone(),
            database:    self.database.clone(),
            table:       self.table.clone(),
            bucket:      self.output_bucket.clone(),
            prefix:      self.output_prefix.clone(),
        }
    }
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct PrepareOutcome {
    pub report:        PipelineReport,
    pub uploaded_keys: Vec<String>,
    pub labeled:       usize,
    pub train:         usize,
    pub test:          usize,
    pub validate:      usize,
    /// `database.table` when the run registered its output
    pub registered:    Option<String>,
}

// ─── PrepareUseCase ───────────────────────────────────────────────────────────
pub struct PrepareUseCase {
    config: PrepareConfig,
}

impl PrepareUseCase {
    pub fn new(config: PrepareConfig) -> Self {
        Self { config }
    }

    /// Download and parse the configured input file.
    pub fn load_rows(&self, store: &dyn ObjectStore) -> Result<Vec<RawRow>> {
        let cfg = &self.config;

        tracing::info!("Downloading '{}/{}'", cfg.input_bucket, cfg.input_key);
        let bytes = store
            .download(&cfg.input_bucket, &cfg.input_key)
            .with_context(|| {
                format!("Cannot download input '{}/{}'", cfg.input_bucket, cfg.input_key)
            })?;

        let loader = TsvLoader::new([&cfg.pipeline.text_column, &cfg.pipeline.rating_column]);
        loader.load(&cfg.input_key, &bytes)
    }

    /// Load the input and run the pipeline, without exporting.
    pub fn run_pipeline(&self, store: &dyn ObjectStore) -> Result<PreparedDataset> {
        let rows = self.load_rows(store)?;
        let pipeline = ReviewPipeline::new(self.config.pipeline.clone());
        Ok(pipeline.prepare(&rows)?)
    }

    /// Execute the full run end to end.
    pub fn execute(
        &self,
        store:   &dyn ObjectStore,
        catalog: Option<&dyn Catalog>,
    ) -> Result<PrepareOutcome> {
        let cfg = &self.config;

        // ── Step 1: Output bucket ─────────────────────────────────────────────
        let created = store
            .create_bucket(&cfg.output_bucket)
            .with_context(|| format!("Cannot create bucket '{}'", cfg.output_bucket))?;
        if !created {
            tracing::info!("Using existing bucket '{}'", cfg.output_bucket);
        }

        // ── Steps 2-4: Download, parse, run the stages ────────────────────────
        let dataset = self.run_pipeline(store)?;

        // ── Step 5: Render every export before touching storage ───────────────
        let bundle = ExportBundle::render(&dataset, &cfg.output_prefix)?;

        // ── Step 6: Upload, rolling back on failure ───────────────────────────
        let uploaded_keys = bundle.publish(store, &cfg.output_bucket)?;

        // ── Step 7: Stage metrics ─────────────────────────────────────────────
        if let Some(dir) = &cfg.metrics_dir {
            let logger = MetricsLogger::new(dir)?;
            logger.log(&run_id(), &dataset.report)?;
            tracing::info!("Stage metrics appended to '{}'", logger.csv_path().display());
        }

        // ── Step 8: Catalog registration ──────────────────────────────────────
        let registered = match (cfg.register, catalog) {
            (true, Some(catalog)) => {
                let table = RegisterUseCase::new(cfg.register_config()).execute(catalog)?;
                Some(format!("{}.{}", table.database, table.name))
            }
            (true, None) => {
                tracing::warn!("Registration requested but no catalog is available");
                None
            }
            (false, _) => None,
        };

        Ok(PrepareOutcome {
            report: dataset.report,
            uploaded_keys,
            labeled: dataset.labeled.len(),
            train: dataset.train.len(),
            test: dataset.test.len(),
            validate: dataset.validate.len(),
            registered,
        })
    }
}

/// Seconds since the Unix epoch, used to group metric rows per run.
fn run_id() -> String {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::PipelineError;
    use crate::infra::{catalog::LocalCatalog, local_store::LocalObjectStore};

    const REVIEWS: &str = "marketplace\treview_id\treview_body\tstar_rating\n\
                           US\tR1\tGreat phone!! <br/>Loved it\t5\n\
                           US\tR2\tTerrible, broke in a day\t1\n\
                           US\tR3\tIt's okay\t3\n\
                           US\tR4\tGreat phone!! <br/>Loved it\t5\n\
                           US\tR5\tWorks as described\t4\n\
                           US\tR6\tWaste of money\t2\n";

    fn setup(dir: &Path) -> (LocalObjectStore, PrepareConfig) {
        let store = LocalObjectStore::new(dir.join("storage"));
        store.create_bucket("raw").unwrap();
        store.upload("raw", "reviews.tsv", REVIEWS.as_bytes()).unwrap();

        let config = PrepareConfig {
            storage_root:  dir.join("storage").display().to_string(),
            input_bucket:  "raw".into(),
            input_key:     "reviews.tsv".into(),
            output_bucket: "prepared".into(),
            output_prefix: "v1".into(),
            catalog_dir:   dir.join("catalog").display().to_string(),
            ..Default::default()
        };
        (store, config)
    }

    #[test]
    fn test_execute_uploads_five_files() {
        let dir = tempfile::tempdir().unwrap();
        let (store, config) = setup(dir.path());

        let outcome = PrepareUseCase::new(config).execute(&store, None).unwrap();
        assert_eq!(outcome.labeled, 4);
        assert_eq!(outcome.train + outcome.test + outcome.validate, 4);
        assert_eq!(
            store.list("prepared").unwrap(),
            vec![
                "v1/labeled/labeled.csv",
                "v1/test/test.csv",
                "v1/train/train.csv",
                "v1/unlabeled/unlabeled.csv",
                "v1/validate/validate.csv",
            ]
        );
        assert!(outcome.registered.is_none());
    }

    #[test]
    fn test_execute_registers_and_logs_metrics() {
        let dir = tempfile::tempdir().unwrap();
        let (store, mut config) = setup(dir.path());
        config.register    = true;
        config.metrics_dir = Some(dir.path().join("metrics").display().to_string());

        let catalog = LocalCatalog::new(&config.catalog_dir);
        let outcome = PrepareUseCase::new(config.clone())
            .execute(&store, Some(&catalog as &dyn Catalog))
            .unwrap();

        assert_eq!(outcome.registered.as_deref(), Some("reviews.labeled_reviews"));
        let table = catalog.table("reviews", "labeled_reviews").unwrap().unwrap();
        assert_eq!(table.location, "prepared/v1/labeled");

        let metrics = fs::read_to_string(dir.path().join("metrics/stage_metrics.csv")).unwrap();
        assert!(metrics.contains(",deduplication,4,1"));
    }

    #[test]
    fn test_missing_rating_column_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (store, config) = setup(dir.path());
        store.upload("raw", "bad.tsv", b"review_body\tstars\nnice\t5\n").unwrap();

        let config = PrepareConfig { input_key: "bad.tsv".into(), ..config };
        let err    = PrepareUseCase::new(config).execute(&store, None).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::MissingField { .. })
        ));
        assert!(store.list("prepared").unwrap().is_empty());
    }

    #[test]
    fn test_missing_input_reports_collaborator_failure() {
        let dir = tempfile::tempdir().unwrap();
        let (store, config) = setup(dir.path());
        let config = PrepareConfig { input_key: "nope.tsv".into(), ..config };

        let err = PrepareUseCase::new(config).execute(&store, None).unwrap_err();
        assert!(err.to_string().contains("raw/nope.tsv"));
    }

    #[test]
    fn test_config_json_uses_defaults() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        fs::write(&path, r#"{ "input_key": "x.tsv", "seed": 7, "max_words": 100 }"#).unwrap();

        let cfg = PrepareConfig::from_file(&path).unwrap();
        assert_eq!(cfg.input_key, "x.tsv");
        assert_eq!(cfg.pipeline.seed, 7);
        assert_eq!(cfg.pipeline.max_words, 100);
        assert_eq!(cfg.pipeline.rating_column, "star_rating");
        assert_eq!(cfg.output_bucket, "reviews-prepared");
    }
}
