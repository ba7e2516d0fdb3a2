// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the four subcommands and all their flags:
//
//   prepare   — run the pipeline and upload the five exports
//   describe  — run the pipeline and print a summary
//   register  — register an existing labeled export in the catalog
//   list      — list the objects in a bucket
//
// clap's derive macros generate --help text, error messages
// for missing args, and string → number conversion.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::{prepare_use_case::PrepareConfig, register_use_case::RegisterConfig};
use crate::data::pipeline::PipelineOptions;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Clean, label, balance and split a review file, then upload the exports
    Prepare(PrepareArgs),

    /// Run the pipeline without exporting and print a dataset summary
    Describe(PrepareArgs),

    /// Register the labeled export of a previous run in the catalog
    Register(RegisterArgs),

    /// List the objects stored in a bucket
    List(ListArgs),
}

/// Where buckets live on disk.
#[derive(Args, Debug, Clone)]
pub struct StorageArgs {
    /// Root directory of the local object store (one directory per bucket)
    #[arg(long, default_value = "storage")]
    pub storage_root: String,
}

#[derive(Args, Debug, Clone)]
pub struct CatalogArgs {
    /// Directory holding catalog.json
    #[arg(long, default_value = "catalog")]
    pub catalog_dir: String,

    /// Catalog database name
    #[arg(long, default_value = "reviews")]
    pub database: String,

    /// Catalog table name for the labeled export
    #[arg(long, default_value = "labeled_reviews")]
    pub table: String,
}

/// All arguments for the `prepare` and `describe` commands.
#[derive(Args, Debug, Clone)]
pub struct PrepareArgs {
    /// Read every setting from this JSON file instead of the flags below
    #[arg(long)]
    pub config: Option<String>,

    #[command(flatten)]
    pub storage: StorageArgs,

    /// Bucket holding the raw review file
    #[arg(long, default_value = "reviews-raw")]
    pub input_bucket: String,

    /// Key of the raw review file (.tsv or .tsv.gz)
    #[arg(long, default_value = "amazon_reviews_us_Digital_Software_v1_00.tsv.gz")]
    pub input_key: String,

    /// Bucket the exports are uploaded to (created if missing)
    #[arg(long, default_value = "reviews-prepared")]
    pub output_bucket: String,

    /// Key prefix for the exports
    #[arg(long, default_value = "prepared")]
    pub output_prefix: String,

    /// Column holding the review text
    #[arg(long, default_value = "review_body")]
    pub text_column: String,

    /// Column holding the 1-5 star rating
    #[arg(long, default_value = "star_rating")]
    pub rating_column: String,

    /// Seed for class balancing and both splits
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Reviews with more words than this are dropped
    #[arg(long, default_value_t = 500)]
    pub max_words: usize,

    /// Reviews with this many punctuation characters or more are dropped
    #[arg(long, default_value_t = 500)]
    pub max_punctuation: usize,

    /// Percent of the labeled set held out for testing
    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub test_percent: u8,

    /// Percent of the remaining training set held out for validation
    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub validate_percent: u8,

    /// Append per-stage row counts to <DIR>/stage_metrics.csv
    #[arg(long)]
    pub metrics_dir: Option<String>,

    /// Register the labeled export in the catalog after uploading
    #[arg(long)]
    pub register: bool,

    #[command(flatten)]
    pub catalog: CatalogArgs,
}

/// Convert CLI PrepareArgs into the application-layer PrepareConfig.
/// The application layer never sees clap types.
impl From<PrepareArgs> for PrepareConfig {
    fn from(a: PrepareArgs) -> Self {
        PrepareConfig {
            storage_root:  a.storage.storage_root,
            input_bucket:  a.input_bucket,
            input_key:     a.input_key,
            output_bucket: a.output_bucket,
            output_prefix: a.output_prefix,
            metrics_dir:   a.metrics_dir,
            catalog_dir:   a.catalog.catalog_dir,
            register:      a.register,
            database:      a.catalog.database,
            table:         a.catalog.table,
            pipeline:      PipelineOptions {
                text_column:      a.text_column,
                rating_column:    a.rating_column,
                seed:             a.seed,
                max_words:        a.max_words,
                max_punctuation:  a.max_punctuation,
                test_percent:     a.test_percent,
                validate_percent: a.validate_percent,
            },
        }
    }
}

/// All arguments for the `register` command
#[derive(Args, Debug, Clone)]
pub struct RegisterArgs {
    /// Bucket the exports were uploaded to
    #[arg(long, default_value = "reviews-prepared")]
    pub bucket: String,

    /// Key prefix the exports were uploaded under
    #[arg(long, default_value = "prepared")]
    pub prefix: String,

    #[command(flatten)]
    pub catalog: CatalogArgs,
}

impl From<RegisterArgs> for RegisterConfig {
    fn from(a: RegisterArgs) -> Self {
        RegisterConfig {
            catalog_dir: a.catalog.catalog_dir,
            database:    a.catalog.database,
            table:       a.catalog.table,
            bucket:      a.bucket,
            prefix:      a.prefix,
        }
    }
}

/// All arguments for the `list` command
#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Bucket to list
    pub bucket: String,

    #[command(flatten)]
    pub storage: StorageArgs,
}
