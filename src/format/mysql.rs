//! MySQL formatter
//!
//! The dump is read from MySQL, so column types pass through unchanged and
//! every key type MySQL reports can be recreated.

use tracing::debug;

use crate::format::{
    ColumnExtras, FormatError, FormatOptions, SqlFormatter, check_key_columns, current_timestamp,
    finish_block, is_bit_literal, parse_extra, table_name, unsupported,
};
use crate::models::{ColumnDescriptor, KeyGroup, KeyKind, TableData, TableStructure};

/// Formatter for MySQL and MariaDB
#[derive(Debug, Clone)]
pub struct MySqlFormatter {
    options: FormatOptions,
}

impl MySqlFormatter {
    pub fn new(options: &FormatOptions) -> Self {
        Self {
            options: options.clone(),
        }
    }

    fn column_clause(&self, column: &ColumnDescriptor) -> Result<String, FormatError> {
        let extras = parse_extra(&column.extra)?;
        let mut clause = format!("{} {}", quote_identifier(&column.name), column.column_type);

        if !column.nullable {
            clause.push_str(" NOT NULL");
        }
        if let Some(default) = &column.default {
            clause.push_str(" DEFAULT ");
            clause.push_str(&default_literal(column, default, &extras));
        }
        if extras.auto_increment {
            clause.push_str(" AUTO_INCREMENT");
        }
        if let Some(expression) = &extras.on_update {
            clause.push_str(" ON UPDATE ");
            clause.push_str(expression);
        }
        if !column.comment.is_empty() {
            clause.push_str(" COMMENT ");
            clause.push_str(&quote_literal(&column.comment));
        }
        Ok(clause)
    }

    fn key_clause(&self, table: &str, group: &KeyGroup<'_>) -> Result<String, FormatError> {
        check_key_columns(table, group)?;

        let columns = group
            .parts
            .iter()
            .map(|part| {
                if part.is_descending() {
                    format!("{} DESC", quote_identifier(&part.column_name))
                } else {
                    quote_identifier(&part.column_name)
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        let index_type = group.index_type();
        let (keyword, using) = match (group.kind(), index_type.as_str()) {
            (KeyKind::Primary, "" | "BTREE") => ("PRIMARY KEY", ""),
            (KeyKind::Primary, "HASH") => ("PRIMARY KEY", " USING HASH"),
            (KeyKind::Unique, "" | "BTREE") => ("UNIQUE KEY", ""),
            (KeyKind::Unique, "HASH") => ("UNIQUE KEY", " USING HASH"),
            (KeyKind::Index, "" | "BTREE") => ("KEY", ""),
            (KeyKind::Index, "HASH") => ("KEY", " USING HASH"),
            (KeyKind::Index, "FULLTEXT") => ("FULLTEXT KEY", ""),
            (KeyKind::Index | KeyKind::Unique, "SPATIAL" | "RTREE") => ("SPATIAL KEY", ""),
            (_, other) => {
                return Err(unsupported(format!(
                    "Index type {} of key {} on table {}",
                    other, group.name, table
                )));
            }
        };

        let mut clause = match group.kind() {
            KeyKind::Primary => format!("{} ({})", keyword, columns),
            _ => format!("{} {} ({})", keyword, quote_identifier(group.name), columns),
        };
        clause.push_str(using);

        let comment = group.parts.first().map(|part| part.comment.as_str()).unwrap_or("");
        if !comment.is_empty() {
            clause.push_str(" COMMENT ");
            clause.push_str(&quote_literal(comment));
        }
        Ok(clause)
    }
}

impl SqlFormatter for MySqlFormatter {
    fn name(&self) -> &str {
        "mysql"
    }

    fn format_create(&self, table: &TableStructure) -> Result<String, FormatError> {
        let name = table_name(&table.name, &self.options);
        debug!(table = %name, "Formatting MySQL create statement");

        let mut clauses = Vec::new();
        for column in &table.columns {
            clauses.push(self.column_clause(column)?);
        }
        for group in table.key_groups() {
            clauses.push(self.key_clause(&name, &group)?);
        }

        let mut sql = format!("CREATE TABLE {} (\n", quote_identifier(&name));
        sql.push_str(
            &clauses
                .iter()
                .map(|clause| format!("  {}", clause))
                .collect::<Vec<_>>()
                .join(",\n"),
        );
        sql.push_str("\n) DEFAULT CHARSET=utf8mb4;");
        Ok(finish_block(vec![sql]))
    }

    fn format_insert(&self, data: &TableData) -> Result<String, FormatError> {
        let name = quote_identifier(&table_name(&data.name, &self.options));
        let statements = data
            .rows
            .iter()
            .map(|row| {
                let columns = row
                    .fields
                    .iter()
                    .map(|field| quote_identifier(&field.name))
                    .collect::<Vec<_>>();
                let values = row
                    .fields
                    .iter()
                    .map(|field| match &field.value {
                        Some(value) => quote_literal(value),
                        None => "NULL".to_string(),
                    })
                    .collect::<Vec<_>>();
                format!(
                    "INSERT INTO {} ({}) VALUES ({});",
                    name,
                    columns.join(", "),
                    values.join(", ")
                )
            })
            .collect();
        Ok(finish_block(statements))
    }

    fn format_truncate(&self, table: &TableStructure) -> Result<String, FormatError> {
        let name = table_name(&table.name, &self.options);
        Ok(format!("TRUNCATE TABLE {};\n", quote_identifier(&name)))
    }
}

/// Backtick quoting, embedded backticks doubled
pub fn quote_identifier(identifier: &str) -> String {
    format!("`{}`", identifier.replace('`', "``"))
}

/// String literal with MySQL backslash escapes
pub fn quote_literal(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        match c {
            '\0' => quoted.push_str("\\0"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            '"' => quoted.push_str("\\\""),
            '\x1a' => quoted.push_str("\\Z"),
            c => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}

/// Default clause value for a column
///
/// `CURRENT_TIMESTAMP` on temporal columns and bit literals stay bare,
/// `DEFAULT_GENERATED` expressions are parenthesized, everything else is a
/// string literal.
fn default_literal(column: &ColumnDescriptor, default: &str, extras: &ColumnExtras) -> String {
    let column_type = column.column_type.to_ascii_lowercase();
    let temporal = column_type.starts_with("timestamp") || column_type.starts_with("datetime");

    if temporal {
        if let Some(timestamp) = current_timestamp(default) {
            return timestamp;
        }
    }
    if extras.default_generated {
        format!("({})", default)
    } else if column_type.starts_with("bit") && is_bit_literal(default) {
        default.to_string()
    } else {
        quote_literal(default)
    }
}
