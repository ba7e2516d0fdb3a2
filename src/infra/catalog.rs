// ============================================================
// Layer 6 — Local Metadata Catalog
// ============================================================
// A Catalog persisted as a single pretty-printed JSON file:
//
//   <dir>/catalog.json
//   {
//     "databases": {
//       "reviews": {
//         "tables": {
//           "labeled_reviews": { "columns": [...], "location": "...", ... }
//         }
//       }
//     }
//   }
//
// Every call reads the file, applies the change, and writes it
// back through a temporary file. Both create calls behave like
// "CREATE ... IF NOT EXISTS".
//
// Reference: serde_json crate documentation
//            Rust Book §8 (Hash Maps)

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::PathBuf};

use crate::domain::traits::{Catalog, TableDefinition};

#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogFile {
    databases: BTreeMap<String, DatabaseEntry>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct DatabaseEntry {
    tables: BTreeMap<String, TableDefinition>,
}

pub struct LocalCatalog {
    path: PathBuf,
}

impl LocalCatalog {
    /// Catalog stored in `<dir>/catalog.json`. The directory is
    /// created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { path: dir.into().join("catalog.json") }
    }

    fn read(&self) -> Result<CatalogFile> {
        if !self.path.exists() {
            return Ok(CatalogFile::default());
        }
        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read catalog '{}'", self.path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Catalog '{}' is not valid JSON", self.path.display()))
    }

    fn write(&self, file: &CatalogFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.partial");
        fs::write(&tmp, serde_json::to_string_pretty(file)?)
            .with_context(|| format!("Cannot write catalog '{}'", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Cannot replace catalog '{}'", self.path.display()))?;
        Ok(())
    }
}

impl Catalog for LocalCatalog {
    fn create_database(&self, name: &str) -> Result<bool> {
        if name.trim().is_empty() {
            bail!("Database name must not be empty");
        }

        let mut file = self.read()?;
        if file.databases.contains_key(name) {
            tracing::debug!("Database '{}' already exists", name);
            return Ok(false);
        }

        file.databases.insert(name.to_string(), DatabaseEntry::default());
        self.write(&file)?;
        tracing::info!("Created database '{}'", name);
        Ok(true)
    }

    fn create_table(&self, table: &TableDefinition) -> Result<bool> {
        let mut file = self.read()?;
        let Some(db) = file.databases.get_mut(&table.database) else {
            bail!("Database '{}' does not exist", table.database);
        };

        if db.tables.contains_key(&table.name) {
            tracing::debug!("Table '{}.{}' already exists", table.database, table.name);
            return Ok(false);
        }

        db.tables.insert(table.name.clone(), table.clone());
        self.write(&file)?;
        tracing::info!(
            "Registered table '{}.{}' at '{}'",
            table.database,
            table.name,
            table.location
        );
        Ok(true)
    }

    fn list_tables(&self, database: &str) -> Result<Vec<String>> {
        let file = self.read()?;
        match file.databases.get(database) {
            Some(db) => Ok(db.tables.keys().cloned().collect()),
            None => bail!("Database '{}' does not exist", database),
        }
    }

    fn table(&self, database: &str, name: &str) -> Result<Option<TableDefinition>> {
        let file = self.read()?;
        Ok(file
            .databases
            .get(database)
            .and_then(|db| db.tables.get(name))
            .cloned())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::traits::ColumnType;

    #[test]
    fn test_database_and_table_lifecycle() {
        let dir     = tempfile::tempdir().unwrap();
        let catalog = LocalCatalog::new(dir.path());

        assert!(catalog.create_database("reviews").unwrap());
        assert!(!catalog.create_database("reviews").unwrap());

        let table = TableDefinition::labeled_reviews("reviews", "labeled", "out/prepared/labeled");
        assert!(catalog.create_table(&table).unwrap());
        assert!(!catalog.create_table(&table).unwrap());

        assert_eq!(catalog.list_tables("reviews").unwrap(), vec!["labeled"]);
    }

    #[test]
    fn test_table_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let catalog = LocalCatalog::new(dir.path());
            catalog.create_database("reviews").unwrap();
            let table = TableDefinition::labeled_reviews("reviews", "labeled", "out/labeled");
            catalog.create_table(&table).unwrap();
        }

        let reopened = LocalCatalog::new(dir.path());
        let table    = reopened.table("reviews", "labeled").unwrap().unwrap();
        let types: Vec<ColumnType> = table.columns.iter().map(|c| c.column_type).collect();
        assert_eq!(types, vec![ColumnType::String, ColumnType::Float, ColumnType::TinyInt]);
        assert_eq!(table.location, "out/labeled");
        assert!(!table.has_header);
    }

    #[test]
    fn test_table_needs_database() {
        let dir     = tempfile::tempdir().unwrap();
        let catalog = LocalCatalog::new(dir.path());
        let table   = TableDefinition::labeled_reviews("missing", "labeled", "x");
        assert!(catalog.create_table(&table).is_err());
        assert!(catalog.list_tables("missing").is_err());
    }
}
