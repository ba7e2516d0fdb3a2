// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction. Parses arguments with
// clap, builds the local collaborators (object store, catalog)
// and delegates everything else to Layer 2 (application).
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, ListArgs, PrepareArgs, RegisterArgs};

use crate::application::prepare_use_case::PrepareConfig;
use crate::domain::traits::ObjectStore;
use crate::infra::{catalog::LocalCatalog, local_store::LocalObjectStore};

/// The main CLI struct — clap reads the fields and generates
/// argument parsing code automatically via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "review-prep",
    version,
    about = "Clean, label, balance and split product reviews for annotation and training."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Prepare(args)  => run_prepare(args),
            Commands::Describe(args) => run_describe(args),
            Commands::Register(args) => run_register(args),
            Commands::List(args)     => run_list(args),
        }
    }
}

/// A JSON config file, when given, replaces the flags entirely.
fn resolve_config(args: PrepareArgs) -> Result<PrepareConfig> {
    if let Some(path) = &args.config {
        tracing::info!("Reading run configuration from '{}'", path);
        return PrepareConfig::from_file(path);
    }
    Ok(args.into())
}

fn run_prepare(args: PrepareArgs) -> Result<()> {
    use crate::application::prepare_use_case::PrepareUseCase;
    use crate::domain::traits::Catalog;

    let config  = resolve_config(args)?;
    let store   = LocalObjectStore::new(&config.storage_root);
    let catalog = LocalCatalog::new(&config.catalog_dir);

    tracing::info!(
        "Preparing '{}/{}' into '{}/{}'",
        config.input_bucket,
        config.input_key,
        config.output_bucket,
        config.output_prefix
    );

    let outcome = PrepareUseCase::new(config).execute(&store, Some(&catalog as &dyn Catalog))?;

    println!(
        "Prepared {} labeled reviews: {} train, {} test, {} validate.",
        outcome.labeled, outcome.train, outcome.test, outcome.validate
    );
    for key in &outcome.uploaded_keys {
        println!("  wrote {key}");
    }
    if let Some(table) = &outcome.registered {
        println!("Registered table {table}.");
    }
    Ok(())
}

fn run_describe(args: PrepareArgs) -> Result<()> {
    use crate::application::describe_use_case::DescribeUseCase;

    let config  = resolve_config(args)?;
    let store   = LocalObjectStore::new(&config.storage_root);
    let summary = DescribeUseCase::new(config).summarize(&store)?;

    println!("{summary}");
    Ok(())
}

fn run_register(args: RegisterArgs) -> Result<()> {
    use crate::application::register_use_case::{RegisterConfig, RegisterUseCase};

    let config: RegisterConfig = args.into();
    let catalog  = LocalCatalog::new(&config.catalog_dir);
    let table    = RegisterUseCase::new(config).execute(&catalog)?;

    println!(
        "Table {}.{} → {} ({} columns)",
        table.database,
        table.name,
        table.location,
        table.columns.len()
    );
    Ok(())
}

fn run_list(args: ListArgs) -> Result<()> {
    let store = LocalObjectStore::new(&args.storage.storage_root);
    for key in store.list(&args.bucket)? {
        println!("{key}");
    }
    Ok(())
}
