//! Table entries of a dump: structure and data

use super::column::ColumnDescriptor;
use super::key::{KeyDescriptor, KeyGroup};
use serde::{Deserialize, Serialize};

/// Placeholder written instead of the live table prefix
pub const TABLE_PREFIX_PLACEHOLDER: &str = "#__";

/// Replace a leading `prefix` with [`TABLE_PREFIX_PLACEHOLDER`].
///
/// Only a match anchored at position 0 is replaced; the prefix is taken
/// literally. An empty prefix leaves the name unchanged.
///
/// ```rust
/// use xml2sql::models::generic_table_name;
///
/// assert_eq!(generic_table_name("xxxxx_users", "xxxxx_"), "#__users");
/// assert_eq!(generic_table_name("users_xxxxx_", "xxxxx_"), "users_xxxxx_");
/// ```
pub fn generic_table_name(table: &str, prefix: &str) -> String {
    if prefix.is_empty() {
        return table.to_string();
    }
    match table.strip_prefix(prefix) {
        Some(rest) => format!("{}{}", TABLE_PREFIX_PLACEHOLDER, rest),
        None => table.to_string(),
    }
}

/// Inverse of [`generic_table_name`]: substitute the live prefix for the placeholder.
pub fn live_table_name(generic: &str, prefix: &str) -> String {
    match generic.strip_prefix(TABLE_PREFIX_PLACEHOLDER) {
        Some(rest) => format!("{}{}", prefix, rest),
        None => generic.to_string(),
    }
}

/// Structure of one table: ordered columns and keys
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableStructure {
    /// Generic table name
    pub name: String,
    pub columns: Vec<ColumnDescriptor>,
    #[serde(default)]
    pub keys: Vec<KeyDescriptor>,
}

impl TableStructure {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            name: name.into(),
            columns,
            keys: Vec::new(),
        }
    }

    pub fn with_keys(mut self, keys: Vec<KeyDescriptor>) -> Self {
        self.keys = keys;
        self
    }

    /// Keys regrouped by key name (see [`KeyGroup::collect`])
    pub fn key_groups(&self) -> Vec<KeyGroup<'_>> {
        KeyGroup::collect(&self.keys)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|column| column.name == name)
    }
}

/// A single value of a row; `None` is SQL NULL
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RowField {
    pub name: String,
    pub value: Option<String>,
}

/// One record, fields in `SELECT *` column order
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Row {
    pub fields: Vec<RowField>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field (builder style)
    pub fn with(mut self, name: impl Into<String>, value: Option<&str>) -> Self {
        self.push(name, value.map(str::to_string));
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: Option<String>) {
        self.fields.push(RowField {
            name: name.into(),
            value,
        });
    }

    pub fn get(&self, name: &str) -> Option<&RowField> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<N, V> FromIterator<(N, Option<V>)> for Row
where
    N: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, Option<V>)>>(iter: I) -> Self {
        let fields = iter
            .into_iter()
            .map(|(name, value)| RowField {
                name: name.into(),
                value: value.map(Into::into),
            })
            .collect();
        Self { fields }
    }
}

/// Data of one table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableData {
    /// Generic table name
    pub name: String,
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl TableData {
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}
