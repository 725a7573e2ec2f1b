//! SQL dialect formatters
//!
//! Turns dump entries back into SQL. Each dialect implements [`SqlFormatter`];
//! a [`FormatterRegistry`] resolves a dialect identifier to a formatter.
//!
//! - generic: SQL-standard types and quoting
//! - mysql: MySQL/MariaDB, the dialect the dump was read from
//! - postgresql: PostgreSQL with MySQL types mapped

pub mod generic;
pub mod mysql;
pub mod postgresql;
pub mod registry;
pub mod types;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::{KeyGroup, TableData, TableStructure, live_table_name};

static CURRENT_TIMESTAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:current_timestamp|now|localtimestamp|localtime)\s*(?:\(\s*(\d*)\s*\))?\s*$")
        .expect("Invalid timestamp default pattern")
});

static BIT_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^b'[01]*'$").expect("Invalid bit literal pattern"));

/// Prefix substituted for the placeholder when none is configured
pub const DEFAULT_PREFIX: &str = "xxxxx_";

/// Error raised by a formatter
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("Unknown format: {0}")]
    UnknownFormat(String),
    #[error("Unsupported construct: {0}")]
    UnsupportedConstruct(String),
}

/// Options every formatter is built with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Live table prefix replacing the `#__` placeholder
    pub prefix: String,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

impl FormatOptions {
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

/// One SQL dialect
///
/// Every operation returns complete, `;`-terminated statements or an error;
/// constructs the dialect cannot express fail with
/// [`FormatError::UnsupportedConstruct`] instead of being dropped.
pub trait SqlFormatter: Send + Sync {
    /// Identifier the formatter is registered under
    fn name(&self) -> &str;

    /// `CREATE TABLE` plus any statements the table definition needs
    fn format_create(&self, table: &TableStructure) -> Result<String, FormatError>;

    /// One `INSERT` per row; empty for a table without rows
    fn format_insert(&self, data: &TableData) -> Result<String, FormatError>;

    /// Statement that empties the table
    fn format_truncate(&self, table: &TableStructure) -> Result<String, FormatError>;

    /// Statements that move identity counters past the rows of `data`
    ///
    /// Runs after the inserts of a table whose structure is known. Dialects
    /// whose counters follow explicit inserts return an empty string.
    fn format_sequence_reset(
        &self,
        _table: &TableStructure,
        _data: &TableData,
    ) -> Result<String, FormatError> {
        Ok(String::new())
    }
}

pub use registry::{FormatterFactory, FormatterRegistry};

pub(crate) fn unsupported(message: impl Into<String>) -> FormatError {
    FormatError::UnsupportedConstruct(message.into())
}

/// Live name of a dump table under the configured prefix
pub(crate) fn table_name(name: &str, options: &FormatOptions) -> String {
    live_table_name(name, &options.prefix)
}

/// Reject key groups with a part that names no column (expression indexes)
pub(crate) fn check_key_columns(table: &str, group: &KeyGroup<'_>) -> Result<(), FormatError> {
    if group.parts.iter().any(|part| part.column_name.trim().is_empty()) {
        return Err(unsupported(format!(
            "Key {} on table {} has a part without a column",
            group.name, table
        )));
    }
    Ok(())
}

/// Quote a string literal by doubling single quotes
///
/// NUL cannot be carried in a standard string literal.
pub(crate) fn quote_standard_literal(value: &str) -> Result<String, FormatError> {
    if value.contains('\0') {
        return Err(unsupported("String value contains a NUL character"));
    }
    Ok(format!("'{}'", value.replace('\'', "''")))
}

/// MySQL zero dates as a portable value, other defaults unchanged
pub(crate) fn portable_date_default(default: &str) -> &str {
    match default {
        "0000-00-00 00:00:00" => "1970-01-01 00:00:00",
        "0000-00-00" => "1970-01-01",
        other => other,
    }
}

/// Normalized `CURRENT_TIMESTAMP[(n)]` for any spelling MySQL reports
///
/// `now()`, `localtimestamp` and friends are synonyms; a fractional
/// seconds precision is kept.
pub(crate) fn current_timestamp(default: &str) -> Option<String> {
    let captures = CURRENT_TIMESTAMP.captures(default)?;
    match captures.get(1).map(|m| m.as_str()).filter(|p| !p.is_empty()) {
        Some(precision) => Some(format!("CURRENT_TIMESTAMP({})", precision)),
        None => Some("CURRENT_TIMESTAMP".to_string()),
    }
}

/// `b'0101'` as MySQL reports defaults of `bit` columns
pub(crate) fn is_bit_literal(default: &str) -> bool {
    BIT_LITERAL.is_match(default.trim())
}

/// Column extras a dialect has to understand
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ColumnExtras {
    pub auto_increment: bool,
    /// The default is an expression, not a literal
    pub default_generated: bool,
    pub on_update: Option<String>,
}

/// Parse the `Extra` column of `SHOW COLUMNS`
pub(crate) fn parse_extra(extra: &str) -> Result<ColumnExtras, FormatError> {
    let mut extras = ColumnExtras::default();
    let mut tokens = extra.split_whitespace().peekable();

    while let Some(token) = tokens.next() {
        if token.eq_ignore_ascii_case("auto_increment") {
            extras.auto_increment = true;
        } else if token.eq_ignore_ascii_case("default_generated") {
            extras.default_generated = true;
        } else if token.eq_ignore_ascii_case("on")
            && tokens
                .next_if(|next| next.eq_ignore_ascii_case("update"))
                .is_some()
        {
            let expression = tokens
                .next()
                .ok_or_else(|| unsupported(format!("Incomplete column extra {:?}", extra)))?;
            extras.on_update = Some(expression.to_string());
        } else {
            return Err(unsupported(format!("Unknown column extra {:?}", extra)));
        }
    }

    Ok(extras)
}

/// Join statements of a table block, closing the block with a blank line
pub(crate) fn finish_block(statements: Vec<String>) -> String {
    if statements.is_empty() {
        return String::new();
    }
    let mut sql = statements.join("\n");
    sql.push_str("\n\n");
    sql
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prefix() {
        assert_eq!(FormatOptions::default().prefix, "xxxxx_");
        assert_eq!(table_name("#__users", &FormatOptions::default()), "xxxxx_users");
        assert_eq!(
            table_name("#__users", &FormatOptions::default().with_prefix("jos_")),
            "jos_users"
        );
    }

    #[test]
    fn test_parse_extra() {
        assert_eq!(parse_extra("").unwrap(), ColumnExtras::default());
        assert!(parse_extra("auto_increment").unwrap().auto_increment);
        assert!(parse_extra("AUTO_INCREMENT").unwrap().auto_increment);

        let extras = parse_extra("DEFAULT_GENERATED on update CURRENT_TIMESTAMP(6)").unwrap();
        assert!(!extras.auto_increment);
        assert!(extras.default_generated);
        assert_eq!(extras.on_update.as_deref(), Some("CURRENT_TIMESTAMP(6)"));
        assert!(!parse_extra("auto_increment").unwrap().default_generated);
    }

    #[test]
    fn test_parse_extra_rejects_unknown() {
        assert!(matches!(
            parse_extra("VIRTUAL GENERATED"),
            Err(FormatError::UnsupportedConstruct(_))
        ));
        assert!(matches!(
            parse_extra("on update"),
            Err(FormatError::UnsupportedConstruct(_))
        ));
    }

    #[test]
    fn test_standard_literal() {
        assert_eq!(quote_standard_literal("it's").unwrap(), "'it''s'");
        assert_eq!(quote_standard_literal("a\\b").unwrap(), "'a\\b'");
        assert!(quote_standard_literal("a\0b").is_err());
    }

    #[test]
    fn test_date_defaults() {
        assert_eq!(portable_date_default("0000-00-00 00:00:00"), "1970-01-01 00:00:00");
        assert_eq!(portable_date_default("2011-01-01"), "2011-01-01");
    }

    #[test]
    fn test_current_timestamp_spellings() {
        for (default, expected) in [
            ("CURRENT_TIMESTAMP", "CURRENT_TIMESTAMP"),
            ("current_timestamp()", "CURRENT_TIMESTAMP"),
            ("now()", "CURRENT_TIMESTAMP"),
            ("LOCALTIMESTAMP", "CURRENT_TIMESTAMP"),
            ("CURRENT_TIMESTAMP(6)", "CURRENT_TIMESTAMP(6)"),
            ("current_timestamp( 3 )", "CURRENT_TIMESTAMP(3)"),
        ] {
            assert_eq!(current_timestamp(default).as_deref(), Some(expected), "{default}");
        }
        assert_eq!(current_timestamp("0"), None);
        assert_eq!(current_timestamp("CURRENT_TIMESTAMP(x)"), None);
        assert_eq!(current_timestamp("2011-01-01 00:00:00"), None);
    }

    #[test]
    fn test_bit_literal() {
        assert!(is_bit_literal("b'0'"));
        assert!(is_bit_literal("B'1010'"));
        assert!(!is_bit_literal("b'2'"));
        assert!(!is_bit_literal("0"));
    }
}
