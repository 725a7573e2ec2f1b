//! Root of the intermediate document

use super::table::{TableData, TableStructure};
use serde::{Deserialize, Serialize};

/// One entry of the database element, in document order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableEntry {
    Structure(TableStructure),
    Data(TableData),
}

impl TableEntry {
    /// Generic table name of the entry
    pub fn name(&self) -> &str {
        match self {
            TableEntry::Structure(structure) => &structure.name,
            TableEntry::Data(data) => &data.name,
        }
    }
}

/// The single database element of a dump
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatabaseEntry {
    /// Database name, may be empty
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tables: Vec<TableEntry>,
}

/// A complete dump: exactly one database with ordered table entries
///
/// # Example
///
/// ```rust
/// use xml2sql::models::{ColumnDescriptor, Dump, TableEntry, TableStructure};
///
/// let dump = Dump::new(vec![TableEntry::Structure(TableStructure::new(
///     "#__users",
///     vec![ColumnDescriptor::new("id", "int(11)")],
/// ))]);
/// assert_eq!(dump.structures().count(), 1);
/// assert_eq!(dump.data().count(), 0);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dump {
    pub database: DatabaseEntry,
}

impl Dump {
    /// Create a dump of an unnamed database
    pub fn new(tables: Vec<TableEntry>) -> Self {
        Self {
            database: DatabaseEntry {
                name: String::new(),
                tables,
            },
        }
    }

    pub fn tables(&self) -> &[TableEntry] {
        &self.database.tables
    }

    /// Structure entries in document order
    pub fn structures(&self) -> impl Iterator<Item = &TableStructure> {
        self.database.tables.iter().filter_map(|entry| match entry {
            TableEntry::Structure(structure) => Some(structure),
            TableEntry::Data(_) => None,
        })
    }

    /// Data entries in document order
    pub fn data(&self) -> impl Iterator<Item = &TableData> {
        self.database.tables.iter().filter_map(|entry| match entry {
            TableEntry::Data(data) => Some(data),
            TableEntry::Structure(_) => None,
        })
    }
}
