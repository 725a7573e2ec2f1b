//! Schema exporter
//!
//! Walks the configured tables of a schema source and produces the
//! intermediate dump, either as an in-memory [`Dump`] or streamed straight
//! into a writer.

use std::fmt;
use std::io::Write;

use tracing::{debug, info};

use crate::export::ExportError;
use crate::export::xml::DumpWriter;
use crate::models::{
    Dump, DatabaseEntry, TableData, TableEntry, TableStructure, generic_table_name,
};
use crate::source::SchemaSource;

/// Tables to export: a single name or a list of names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSelection(pub Vec<String>);

impl From<&str> for TableSelection {
    fn from(table: &str) -> Self {
        Self(vec![table.to_string()])
    }
}

impl From<String> for TableSelection {
    fn from(table: String) -> Self {
        Self(vec![table])
    }
}

impl From<Vec<String>> for TableSelection {
    fn from(tables: Vec<String>) -> Self {
        Self(tables)
    }
}

impl From<Vec<&str>> for TableSelection {
    fn from(tables: Vec<&str>) -> Self {
        Self(tables.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for TableSelection {
    fn from(tables: &[&str]) -> Self {
        Self(tables.iter().map(|t| t.to_string()).collect())
    }
}

impl From<&[String]> for TableSelection {
    fn from(tables: &[String]) -> Self {
        Self(tables.to_vec())
    }
}

impl<const N: usize> From<[&str; N]> for TableSelection {
    fn from(tables: [&str; N]) -> Self {
        Self(tables.iter().map(|t| t.to_string()).collect())
    }
}

/// Exporter for the XML dump format
///
/// Structure export is on and data export is off by default. Configuration
/// is by value, so an exporter handed to another thread cannot change under
/// a running export.
///
/// # Example
///
/// ```rust
/// use xml2sql::export::Exporter;
/// use xml2sql::models::ColumnDescriptor;
/// use xml2sql::source::{MemorySchemaSource, MemoryTable};
///
/// let source = MemorySchemaSource::new("jos_").with_table(
///     MemoryTable::new("jos_users").with_columns(vec![ColumnDescriptor::new("id", "int(11)")]),
/// );
///
/// let dump = Exporter::new()
///     .with_source(&source)
///     .tables("jos_users")
///     .unwrap()
///     .with_data(true)
///     .export()
///     .unwrap();
///
/// assert_eq!(dump.tables()[0].name(), "#__users");
/// ```
#[derive(Clone)]
pub struct Exporter<'a> {
    tables: Vec<String>,
    with_structure: bool,
    with_data: bool,
    database_name: String,
    source: Option<&'a dyn SchemaSource>,
}

impl Default for Exporter<'_> {
    fn default() -> Self {
        Self {
            tables: Vec::new(),
            with_structure: true,
            with_data: false,
            database_name: String::new(),
            source: None,
        }
    }
}

impl fmt::Debug for Exporter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exporter")
            .field("tables", &self.tables)
            .field("with_structure", &self.with_structure)
            .field("with_data", &self.with_data)
            .field("database_name", &self.database_name)
            .field("source", &self.source.map(|_| "SchemaSource"))
            .finish()
    }
}

impl<'a> Exporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the tables to export (live names, in output order)
    ///
    /// Fails with [`ExportError::InvalidInput`] when the selection is empty or
    /// a name is blank. Exporting without ever selecting tables fails with
    /// [`ExportError::PreconditionFailed`] instead.
    pub fn tables(mut self, tables: impl Into<TableSelection>) -> Result<Self, ExportError> {
        let TableSelection(tables) = tables.into();
        if tables.is_empty() {
            return Err(ExportError::InvalidInput(
                "Table selection is empty".to_string(),
            ));
        }
        if let Some(position) = tables.iter().position(|t| t.trim().is_empty()) {
            return Err(ExportError::InvalidInput(format!(
                "Table name at position {} is empty",
                position
            )));
        }
        self.tables = tables;
        Ok(self)
    }

    /// Select every table the bound source lists
    pub fn all_tables(self) -> Result<Self, ExportError> {
        let source = self.source.ok_or_else(missing_source)?;
        let tables = source.table_names()?;
        self.tables(tables)
    }

    pub fn with_structure(mut self, setting: bool) -> Self {
        self.with_structure = setting;
        self
    }

    pub fn with_data(mut self, setting: bool) -> Self {
        self.with_data = setting;
        self
    }

    /// Name written on the database element (empty by default)
    pub fn with_database_name(mut self, name: impl Into<String>) -> Self {
        self.database_name = name.into();
        self
    }

    pub fn with_source(mut self, source: &'a dyn SchemaSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn selected_tables(&self) -> &[String] {
        &self.tables
    }

    /// Check that a source is bound and tables are selected
    pub fn check(&self) -> Result<&'a dyn SchemaSource, ExportError> {
        let source = self.source.ok_or_else(missing_source)?;
        if self.tables.is_empty() {
            return Err(ExportError::PreconditionFailed(
                "No tables specified for export".to_string(),
            ));
        }
        Ok(source)
    }

    /// Export into an in-memory dump
    pub fn export(&self) -> Result<Dump, ExportError> {
        let source = self.check()?;
        let prefix = source.prefix();
        let mut entries = Vec::new();

        for table in &self.tables {
            let name = generic_table_name(table, prefix);
            debug!(table = %table, generic = %name, "Exporting table");

            if self.with_structure {
                entries.push(TableEntry::Structure(read_structure(source, table, &name)?));
            }

            if self.with_data {
                let rows = source.table_rows(table)?.collect::<Result<Vec<_>, _>>()?;
                debug!(table = %table, rows = rows.len(), "Exported table data");
                entries.push(TableEntry::Data(TableData::new(name, rows)));
            }
        }

        info!(
            tables = self.tables.len(),
            entries = entries.len(),
            "Export finished"
        );

        Ok(Dump {
            database: DatabaseEntry {
                name: self.database_name.clone(),
                tables: entries,
            },
        })
    }

    /// Export straight into `sink`, pulling rows one at a time
    ///
    /// The output is byte-identical to `encode(&self.export()?)`. On error the
    /// sink may hold an incomplete document and must be discarded.
    pub fn export_to<W: Write>(&self, sink: W) -> Result<W, ExportError> {
        let source = self.check()?;
        let prefix = source.prefix();
        let mut writer = DumpWriter::new(sink);
        writer.start(&self.database_name)?;

        for table in &self.tables {
            let name = generic_table_name(table, prefix);
            debug!(table = %table, generic = %name, "Streaming table");

            if self.with_structure {
                writer.write_structure(&read_structure(source, table, &name)?)?;
            }

            if self.with_data {
                writer.start_data(&name)?;
                let mut count = 0usize;
                for row in source.table_rows(table)? {
                    writer.write_row(&row?)?;
                    count += 1;
                }
                writer.end_data()?;
                debug!(table = %table, rows = count, "Streamed table data");
            }
        }

        info!(tables = self.tables.len(), "Streaming export finished");
        writer.finish()
    }

    /// Export into an XML string
    pub fn export_string(&self) -> Result<String, ExportError> {
        let bytes = self.export_to(Vec::new())?;
        String::from_utf8(bytes).map_err(|e| {
            ExportError::SerializationError(format!("Dump is not valid UTF-8: {}", e))
        })
    }
}

fn missing_source() -> ExportError {
    ExportError::PreconditionFailed("No schema source bound to the exporter".to_string())
}

/// Columns and keys of `table`, with key descriptors renamed to the generic name
fn read_structure(
    source: &dyn SchemaSource,
    table: &str,
    generic: &str,
) -> Result<TableStructure, ExportError> {
    let columns = source.table_columns(table)?;
    let mut keys = source.table_keys(table)?;
    for key in &mut keys {
        key.table = generic.to_string();
    }
    Ok(TableStructure::new(generic, columns).with_keys(keys))
}
