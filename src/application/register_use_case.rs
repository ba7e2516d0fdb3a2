// ============================================================
// Layer 2 — RegisterUseCase
// ============================================================
// Makes the labeled export queryable: creates the database if
// needed, then registers an external CSV table over the
// directory holding labeled.csv.
//
//   location = <bucket>/<prefix>/labeled
//   schema   = text STRING, rating FLOAT, label TINYINT
//
// An existing table is left alone and its stored definition is
// returned, even when it points somewhere else.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::exporter::export_dir;
use crate::domain::traits::{Catalog, TableDefinition};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterConfig {
    pub catalog_dir: String,
    pub database:    String,
    pub table:       String,
    /// Bucket and prefix the exports were uploaded under
    pub bucket:      String,
    pub prefix:      String,
}

pub struct RegisterUseCase {
    config: RegisterConfig,
}

impl RegisterUseCase {
    pub fn new(config: RegisterConfig) -> Self {
        Self { config }
    }

    /// Location of the labeled export as seen by the catalog.
    pub fn labeled_location(&self) -> String {
        format!("{}/{}", self.config.bucket, export_dir(&self.config.prefix, "labeled"))
    }

    pub fn execute(&self, catalog: &dyn Catalog) -> Result<TableDefinition> {
        let cfg = &self.config;

        catalog
            .create_database(&cfg.database)
            .with_context(|| format!("Cannot create database '{}'", cfg.database))?;

        let table = TableDefinition::labeled_reviews(&cfg.database, &cfg.table, self.labeled_location());
        let created = catalog
            .create_table(&table)
            .with_context(|| format!("Cannot register table '{}.{}'", cfg.database, cfg.table))?;

        if created {
            return Ok(table);
        }

        let existing = catalog
            .table(&cfg.database, &cfg.table)
            .with_context(|| format!("Cannot read table '{}.{}'", cfg.database, cfg.table))?
            .with_context(|| format!("Table '{}.{}' vanished from the catalog", cfg.database, cfg.table))?;

        if existing.location != table.location {
            tracing::warn!(
                "Table '{}.{}' already points at '{}', not '{}'",
                cfg.database,
                cfg.table,
                existing.location,
                table.location
            );
        } else {
            tracing::info!("Table '{}.{}' was already registered", cfg.database, cfg.table);
        }
        Ok(existing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::catalog::LocalCatalog;

    fn config(dir: &std::path::Path) -> RegisterConfig {
        RegisterConfig {
            catalog_dir: dir.display().to_string(),
            database:    "reviews".into(),
            table:       "labeled".into(),
            bucket:      "out".into(),
            prefix:      "runs/v2/".into(),
        }
    }

    #[test]
    fn test_registers_labeled_location() {
        let dir     = tempfile::tempdir().unwrap();
        let catalog = LocalCatalog::new(dir.path());
        let table   = RegisterUseCase::new(config(dir.path())).execute(&catalog).unwrap();

        assert_eq!(table.location, "out/runs/v2/labeled");
        assert_eq!(catalog.list_tables("reviews").unwrap(), vec!["labeled"]);
    }

    #[test]
    fn test_registering_twice_is_harmless() {
        let dir     = tempfile::tempdir().unwrap();
        let catalog = LocalCatalog::new(dir.path());
        let use_case = RegisterUseCase::new(config(dir.path()));
        use_case.execute(&catalog).unwrap();
        use_case.execute(&catalog).unwrap();
        assert_eq!(catalog.list_tables("reviews").unwrap().len(), 1);
    }

    #[test]
    fn test_existing_table_keeps_its_location() {
        let dir     = tempfile::tempdir().unwrap();
        let catalog = LocalCatalog::new(dir.path());
        RegisterUseCase::new(config(dir.path())).execute(&catalog).unwrap();

        let moved = RegisterConfig { prefix: "runs/v3".into(), ..config(dir.path()) };
        let table = RegisterUseCase::new(moved).execute(&catalog).unwrap();

        assert_eq!(table.location, "out/runs/v2/labeled");
        let stored = catalog.table("reviews", "labeled").unwrap().unwrap();
        assert_eq!(stored, table);
    }
}
