//! Schema source abstraction
//!
//! Defines the SchemaSource trait the exporter reads from. A source answers
//! the same questions a MySQL connection would (`SHOW FULL COLUMNS`,
//! `SHOW KEYS`, `SELECT *`) without the exporter ever opening a connection.
//!
//! - MemorySchemaSource: in-memory tables (tests, embedding callers)

use crate::models::{ColumnDescriptor, KeyDescriptor, Row};

/// Error type for schema source operations
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Table not found: {0}")]
    TableNotFound(String),
    #[error("Schema source error: {0}")]
    Backend(String),
}

/// Lazy, single-pass sequence of rows
pub type RowStream<'a> = Box<dyn Iterator<Item = Result<Row, SourceError>> + 'a>;

/// Trait for schema-introspection sources
///
/// Table names passed in are live names (with the configured prefix). Rows
/// are streamed: the exporter consumes them one at a time and never asks for
/// them twice. Sources are shared by reference across threads, like
/// formatters.
pub trait SchemaSource: Send + Sync {
    /// Table prefix configured for the database (e.g. "jos_"), may be empty
    fn prefix(&self) -> &str;

    /// All tables of the database, in the order the source reports them
    fn table_names(&self) -> Result<Vec<String>, SourceError>;

    /// Column descriptors in schema order
    fn table_columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>, SourceError>;

    /// Key descriptors in the order the source reports them
    fn table_keys(&self, table: &str) -> Result<Vec<KeyDescriptor>, SourceError>;

    /// Result of `SELECT * FROM <table>`
    fn table_rows(&self, table: &str) -> Result<RowStream<'_>, SourceError>;
}

pub mod memory;

pub use memory::{MemorySchemaSource, MemoryTable};
