//! In-memory schema source

use super::{RowStream, SchemaSource, SourceError};
use crate::models::{ColumnDescriptor, KeyDescriptor, Row};

/// One table held by [`MemorySchemaSource`]
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    pub name: String,
    pub columns: Vec<ColumnDescriptor>,
    pub keys: Vec<KeyDescriptor>,
    pub rows: Vec<Row>,
}

impl MemoryTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_columns(mut self, columns: Vec<ColumnDescriptor>) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_keys(mut self, keys: Vec<KeyDescriptor>) -> Self {
        self.keys = keys;
        self
    }

    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = rows;
        self
    }
}

/// Schema source backed by tables held in memory
///
/// # Example
///
/// ```rust
/// use xml2sql::models::ColumnDescriptor;
/// use xml2sql::source::{MemorySchemaSource, MemoryTable, SchemaSource};
///
/// let source = MemorySchemaSource::new("jos_").with_table(
///     MemoryTable::new("jos_users").with_columns(vec![ColumnDescriptor::new("id", "int(11)")]),
/// );
/// assert_eq!(source.table_names().unwrap(), vec!["jos_users".to_string()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySchemaSource {
    prefix: String,
    tables: Vec<MemoryTable>,
}

impl MemorySchemaSource {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            tables: Vec::new(),
        }
    }

    /// Add a table; a table with the same name is replaced
    pub fn with_table(mut self, table: MemoryTable) -> Self {
        match self.tables.iter_mut().find(|t| t.name == table.name) {
            Some(existing) => *existing = table,
            None => self.tables.push(table),
        }
        self
    }

    fn table(&self, name: &str) -> Result<&MemoryTable, SourceError> {
        self.tables
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| SourceError::TableNotFound(name.to_string()))
    }
}

impl SchemaSource for MemorySchemaSource {
    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn table_names(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.tables.iter().map(|t| t.name.clone()).collect())
    }

    fn table_columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>, SourceError> {
        Ok(self.table(table)?.columns.clone())
    }

    fn table_keys(&self, table: &str) -> Result<Vec<KeyDescriptor>, SourceError> {
        Ok(self.table(table)?.keys.clone())
    }

    fn table_rows(&self, table: &str) -> Result<RowStream<'_>, SourceError> {
        let rows = &self.table(table)?.rows;
        Ok(Box::new(rows.iter().cloned().map(Ok)))
    }
}
