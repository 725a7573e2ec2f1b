//! Models module
//!
//! Defines the intermediate document: a dump holding one database with table
//! structure and table data entries.

pub mod column;
pub mod dump;
pub mod key;
pub mod table;

pub use column::ColumnDescriptor;
pub use dump::{DatabaseEntry, Dump, TableEntry};
pub use key::{KeyDescriptor, KeyGroup, KeyKind};
pub use table::{
    Row, RowField, TABLE_PREFIX_PLACEHOLDER, TableData, TableStructure, generic_table_name,
    live_table_name,
};
