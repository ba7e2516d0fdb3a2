// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The pipeline itself is pure. Everything it reads from or
// writes to lives behind one of these two traits:
//
//   ObjectStore → byte-level storage of input and exports
//   Catalog     → metadata catalog the exports are registered in
//
// The infra layer provides filesystem-backed implementations;
// the application layer only ever sees the traits.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)
//            Rust Book §17 (Using Trait Objects)

use anyhow::Result;
use serde::{Deserialize, Serialize};

// ─── ObjectStore ──────────────────────────────────────────────────────────────
/// A bucket/key object store.
pub trait ObjectStore {
    /// Create a bucket. Returns false if it already existed.
    fn create_bucket(&self, bucket: &str) -> Result<bool>;

    /// Read the full contents of an object.
    fn download(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;

    /// Write (or overwrite) an object.
    fn upload(&self, bucket: &str, key: &str, bytes: &[u8]) -> Result<()>;

    /// All keys in a bucket, sorted.
    fn list(&self, bucket: &str) -> Result<Vec<String>>;

    /// Remove an object. Deleting a missing key is not an error.
    fn delete(&self, bucket: &str, key: &str) -> Result<()>;
}

// ─── Catalog ──────────────────────────────────────────────────────────────────
/// Column types understood by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Float,
    TinyInt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name:        String,
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self { name: name.into(), column_type }
    }
}

/// An external table over CSV files stored at `location`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    pub database:  String,
    pub name:      String,
    pub columns:   Vec<Column>,
    /// `bucket/prefix` of the directory holding the data files
    pub location:  String,
    pub delimiter: char,
    pub quote:     char,
    pub has_header: bool,
}

impl TableDefinition {
    /// The fixed schema of the labeled export:
    /// text STRING, rating FLOAT, label TINYINT.
    pub fn labeled_reviews(
        database: impl Into<String>,
        name:     impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            database:  database.into(),
            name:      name.into(),
            columns:   vec![
                Column::new("text", ColumnType::String),
                Column::new("rating", ColumnType::Float),
                Column::new("label", ColumnType::TinyInt),
            ],
            location:  location.into(),
            delimiter: ',',
            quote:     '"',
            has_header: false,
        }
    }
}

/// A metadata catalog of databases and external tables.
pub trait Catalog {
    /// Create a database. Returns false if it already existed.
    fn create_database(&self, name: &str) -> Result<bool>;

    /// Register a table. Returns false if a table with that name
    /// already existed. Fails if the database does not exist.
    fn create_table(&self, table: &TableDefinition) -> Result<bool>;

    /// Names of all tables in a database, sorted.
    fn list_tables(&self, database: &str) -> Result<Vec<String>>;

    /// Definition of a registered table, if there is one.
    fn table(&self, database: &str, name: &str) -> Result<Option<TableDefinition>>;
}
