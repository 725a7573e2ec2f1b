//! xml2sql - Database schema and data dumps as dialect-neutral XML
//!
//! Provides:
//! - Export of table structure and rows from a schema source into an XML dump
//! - Decoding of dumps (including plain `mysqldump --xml` output)
//! - SQL generation for several dialects (generic, MySQL, PostgreSQL)
//! - Table prefix substitution, so one dump installs under any prefix

pub mod config;
pub mod convert;
pub mod export;
pub mod format;
pub mod import;
pub mod models;
pub mod source;

// Re-export commonly used types
pub use config::{ConfigError, Xml2SqlConfig};
pub use convert::{ConvertError, ConvertMode, SqlScript, convert, convert_all, xml_to_sql};
pub use export::{ExportError, Exporter, encode};
pub use format::{FormatError, FormatOptions, FormatterRegistry, SqlFormatter};
pub use import::{ImportError, decode};
pub use source::{MemorySchemaSource, MemoryTable, SchemaSource, SourceError};

// Re-export models
pub use models::{
    ColumnDescriptor, DatabaseEntry, Dump, KeyDescriptor, Row, RowField, TableData, TableEntry,
    TableStructure,
};
