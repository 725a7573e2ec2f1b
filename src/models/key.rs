//! Key (index) model for table structure entries

use serde::{Deserialize, Serialize};

/// One row of `SHOW KEYS FROM <table>`
///
/// Several descriptors sharing a `key_name` describe one composite index; each
/// carries its 1-based position in `seq_in_index`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyDescriptor {
    /// Table name (generic once exported)
    pub table: String,
    /// `false` for unique indexes and primary keys
    pub non_unique: bool,
    /// Index name ("PRIMARY" for the primary key)
    pub key_name: String,
    /// 1-based ordinal of the column within the index
    pub seq_in_index: u32,
    /// Indexed column
    pub column_name: String,
    /// "A" (ascending), "D" (descending) or empty
    #[serde(default)]
    pub collation: String,
    /// "YES" when the column may contain NULL, empty otherwise
    #[serde(default)]
    pub nullable: String,
    /// Index method ("BTREE", "HASH", "FULLTEXT", "SPATIAL")
    #[serde(default)]
    pub index_type: String,
    /// Index comment
    #[serde(default)]
    pub comment: String,
}

impl KeyDescriptor {
    /// Create a BTREE, ascending key part
    pub fn new(
        table: impl Into<String>,
        key_name: impl Into<String>,
        seq_in_index: u32,
        column_name: impl Into<String>,
        non_unique: bool,
    ) -> Self {
        Self {
            table: table.into(),
            non_unique,
            key_name: key_name.into(),
            seq_in_index,
            column_name: column_name.into(),
            collation: "A".to_string(),
            nullable: String::new(),
            index_type: "BTREE".to_string(),
            comment: String::new(),
        }
    }

    pub fn with_index_type(mut self, index_type: impl Into<String>) -> Self {
        self.index_type = index_type.into();
        self
    }

    pub fn with_collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = collation.into();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Whether the key part is sorted descending
    pub fn is_descending(&self) -> bool {
        self.collation.eq_ignore_ascii_case("D")
    }

    /// Wire representation of `non_unique`
    pub fn non_unique_flag(&self) -> &'static str {
        if self.non_unique { "1" } else { "0" }
    }
}

/// Kind of constraint a key group turns into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Primary,
    Unique,
    Index,
}

/// All descriptors of one index, sorted by `seq_in_index`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyGroup<'a> {
    pub name: &'a str,
    pub parts: Vec<&'a KeyDescriptor>,
}

impl<'a> KeyGroup<'a> {
    /// Group descriptors by key name, keeping groups in order of first appearance
    pub fn collect(keys: &'a [KeyDescriptor]) -> Vec<KeyGroup<'a>> {
        let mut groups: Vec<KeyGroup<'a>> = Vec::new();
        for key in keys {
            match groups.iter_mut().find(|g| g.name == key.key_name) {
                Some(group) => group.parts.push(key),
                None => groups.push(KeyGroup {
                    name: &key.key_name,
                    parts: vec![key],
                }),
            }
        }
        for group in &mut groups {
            group.parts.sort_by_key(|part| part.seq_in_index);
        }
        groups
    }

    /// `PRIMARY` (MySQL) and `PRI` both name the primary key
    pub fn kind(&self) -> KeyKind {
        if self.name.eq_ignore_ascii_case("PRIMARY") || self.name.eq_ignore_ascii_case("PRI") {
            KeyKind::Primary
        } else if self.parts.iter().all(|part| !part.non_unique) {
            KeyKind::Unique
        } else {
            KeyKind::Index
        }
    }

    /// Index method of the group, upper-cased; empty when unspecified
    pub fn index_type(&self) -> String {
        self.parts
            .first()
            .map(|part| part.index_type.trim().to_ascii_uppercase())
            .unwrap_or_default()
    }

    /// Column names in index order
    pub fn columns(&self) -> Vec<&'a str> {
        self.parts.iter().map(|part| part.column_name.as_str()).collect()
    }
}
