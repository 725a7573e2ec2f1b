//! Column model for table structure entries

use serde::{Deserialize, Serialize};

/// Column descriptor as reported by `SHOW FULL COLUMNS`
///
/// A column keeps the raw, dialect-specific type string (e.g. `int(11)`) so a
/// dump can be regenerated losslessly for the dialect it came from. Other
/// dialects map the type when formatting.
///
/// # Example
///
/// ```rust
/// use xml2sql::models::ColumnDescriptor;
///
/// let column = ColumnDescriptor::new("id", "int(11)")
///     .not_null()
///     .with_key("PRI")
///     .with_extra("auto_increment");
/// assert!(column.is_auto_increment());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Column name
    pub name: String,
    /// Raw column type (e.g. "int(11) unsigned", "varchar(255)")
    pub column_type: String,
    /// Whether the column allows NULL values (`Null="YES"` on the wire)
    pub nullable: bool,
    /// Key role marker ("PRI", "UNI", "MUL" or empty)
    #[serde(default)]
    pub key: String,
    /// Default value; `None` means the column has no default at all,
    /// which is distinct from an empty-string default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Extra information (e.g. "auto_increment", "on update CURRENT_TIMESTAMP")
    #[serde(default)]
    pub extra: String,
    /// Column comment
    #[serde(default)]
    pub comment: String,
}

impl ColumnDescriptor {
    /// Create a nullable column without key role, default, extra or comment
    pub fn new(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
            nullable: true,
            key: String::new(),
            default: None,
            extra: String::new(),
            comment: String::new(),
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = extra.into();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Whether the column is part of the primary key
    pub fn is_primary(&self) -> bool {
        self.key.eq_ignore_ascii_case("PRI")
    }

    /// Whether `extra` carries the auto-increment marker
    pub fn is_auto_increment(&self) -> bool {
        self.extra.to_ascii_lowercase().contains("auto_increment")
    }

    /// Wire representation of `nullable`
    pub fn null_flag(&self) -> &'static str {
        if self.nullable { "YES" } else { "NO" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_column_defaults() {
        let column = ColumnDescriptor::new("title", "varchar(255)");
        assert!(column.nullable);
        assert_eq!(column.default, None);
        assert_eq!(column.null_flag(), "YES");
        assert!(!column.is_primary());
    }

    #[test]
    fn test_auto_increment_detection_ignores_case() {
        let column = ColumnDescriptor::new("id", "int(11)").with_extra("AUTO_INCREMENT");
        assert!(column.is_auto_increment());
    }

    #[test]
    fn test_empty_default_is_kept() {
        let column = ColumnDescriptor::new("alias", "varchar(50)").with_default("");
        assert_eq!(column.default.as_deref(), Some(""));
    }
}
