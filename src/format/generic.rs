//! Generic SQL formatter
//!
//! Emits SQL-standard types and syntax. Identifiers are left bare unless
//! they need quoting, so simple schemas read like hand-written DDL.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::format::types::MySqlType;
use crate::format::{
    ColumnExtras, FormatError, FormatOptions, SqlFormatter, check_key_columns, finish_block,
    current_timestamp, parse_extra, portable_date_default, quote_standard_literal, table_name,
    unsupported,
};
use crate::models::{ColumnDescriptor, KeyGroup, KeyKind, TableData, TableStructure};

static PLAIN_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Invalid identifier pattern"));

// SQL:2016 reserved words likely to show up as column names
const RESERVED_WORDS: &[&str] = &[
    "ALL", "ALTER", "AND", "ANY", "AS", "ASC", "BETWEEN", "BY", "CASE", "CHECK", "COLUMN",
    "CONSTRAINT", "CREATE", "CROSS", "CURRENT", "DATE", "DEFAULT", "DELETE", "DESC", "DISTINCT",
    "DROP", "ELSE", "END", "EXISTS", "FALSE", "FETCH", "FOR", "FOREIGN", "FROM", "FULL", "GRANT",
    "GROUP", "HAVING", "IN", "INNER", "INSERT", "INTERVAL", "INTO", "IS", "JOIN", "KEY", "LEFT",
    "LIKE", "LIMIT", "NATURAL", "NOT", "NULL", "OF", "OFFSET", "ON", "OR", "ORDER", "OUTER",
    "PRIMARY", "REFERENCES", "RIGHT", "ROW", "ROWS", "SELECT", "SET", "TABLE", "THEN", "TIME",
    "TIMESTAMP", "TO", "TRUE", "UNION", "UNIQUE", "UPDATE", "USER", "USING", "VALUE", "VALUES",
    "WHEN", "WHERE", "WITH", "YEAR",
];

/// Formatter for standard SQL
#[derive(Debug, Clone)]
pub struct GenericFormatter {
    options: FormatOptions,
}

impl GenericFormatter {
    pub fn new(options: &FormatOptions) -> Self {
        Self {
            options: options.clone(),
        }
    }

    fn column_clause(&self, column: &ColumnDescriptor) -> Result<String, FormatError> {
        let extras = parse_extra(&column.extra)?;
        if extras.on_update.is_some() {
            return Err(unsupported(format!(
                "ON UPDATE clause of column {}",
                column.name
            )));
        }

        let ty = MySqlType::parse(&column.column_type)?;
        let name = quote_identifier(&column.name);
        let mut clause = format!("{} {}", name, map_type(column, &ty, &extras)?);

        if !column.nullable {
            clause.push_str(" NOT NULL");
        }
        if extras.auto_increment {
            clause.push_str(" GENERATED BY DEFAULT AS IDENTITY");
        } else if let Some(default) = &column.default {
            clause.push_str(" DEFAULT ");
            clause.push_str(&default_literal(column, &ty, default, &extras)?);
        }
        if ty.base == "enum" {
            let values = ty
                .values()?
                .iter()
                .map(|value| quote_standard_literal(value))
                .collect::<Result<Vec<_>, _>>()?;
            clause.push_str(&format!(" CHECK ({} IN ({}))", name, values.join(", ")));
        }
        Ok(clause)
    }

    fn key_columns(&self, table: &str, group: &KeyGroup<'_>) -> Result<String, FormatError> {
        let descending = group.parts.iter().any(|part| part.is_descending());
        if descending && group.kind() != KeyKind::Index {
            return Err(unsupported(format!(
                "Descending column in constraint {} on table {}",
                group.name, table
            )));
        }

        Ok(group
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
            .join(", "))
    }
}

impl SqlFormatter for GenericFormatter {
    fn name(&self) -> &str {
        "generic"
    }

    fn format_create(&self, table: &TableStructure) -> Result<String, FormatError> {
        let name = table_name(&table.name, &self.options);
        debug!(table = %name, "Formatting generic create statement");

        let mut clauses = Vec::new();
        let mut trailing = Vec::new();

        for column in &table.columns {
            clauses.push(self.column_clause(column)?);
        }

        for group in table.key_groups() {
            check_key_columns(&name, &group)?;
            if !matches!(group.index_type().as_str(), "" | "BTREE") {
                return Err(unsupported(format!(
                    "{} index {} on table {}",
                    group.index_type(),
                    group.name,
                    name
                )));
            }

            let comment = group
                .parts
                .first()
                .map(|part| part.comment.as_str())
                .unwrap_or("");
            let columns = self.key_columns(&name, &group)?;
            let index = quote_identifier(&format!("{}_{}", name, group.name));

            match group.kind() {
                KeyKind::Primary => clauses.push(format!("PRIMARY KEY ({})", columns)),
                KeyKind::Unique => {
                    clauses.push(format!("CONSTRAINT {} UNIQUE ({})", index, columns))
                }
                KeyKind::Index => {
                    trailing.push(format!(
                        "CREATE INDEX {} ON {} ({});",
                        index,
                        quote_identifier(&name),
                        columns
                    ));
                    if !comment.is_empty() {
                        trailing.push(format!(
                            "COMMENT ON INDEX {} IS {};",
                            index,
                            quote_standard_literal(comment)?
                        ));
                    }
                    continue;
                }
            }

            if !comment.is_empty() {
                return Err(unsupported(format!(
                    "Comment on constraint {} of table {}",
                    group.name, name
                )));
            }
        }

        for column in &table.columns {
            if !column.comment.is_empty() {
                trailing.push(format!(
                    "COMMENT ON COLUMN {}.{} IS {};",
                    quote_identifier(&name),
                    quote_identifier(&column.name),
                    quote_standard_literal(&column.comment)?
                ));
            }
        }

        let mut create = format!("CREATE TABLE {} (\n", quote_identifier(&name));
        create.push_str(
            &clauses
                .iter()
                .map(|clause| format!("  {}", clause))
                .collect::<Vec<_>>()
                .join(",\n"),
        );
        create.push_str("\n);");

        let mut statements = vec![create];
        statements.extend(trailing);
        Ok(finish_block(statements))
    }

    fn format_insert(&self, data: &TableData) -> Result<String, FormatError> {
        let name = quote_identifier(&table_name(&data.name, &self.options));
        let mut statements = Vec::with_capacity(data.rows.len());

        for row in &data.rows {
            if row.fields.is_empty() {
                statements.push(format!("INSERT INTO {} DEFAULT VALUES;", name));
                continue;
            }
            let columns = row
                .fields
                .iter()
                .map(|field| quote_identifier(&field.name))
                .collect::<Vec<_>>();
            let values = row
                .fields
                .iter()
                .map(|field| match &field.value {
                    Some(value) => quote_standard_literal(value),
                    None => Ok("NULL".to_string()),
                })
                .collect::<Result<Vec<_>, _>>()?;
            statements.push(format!(
                "INSERT INTO {} ({}) VALUES ({});",
                name,
                columns.join(", "),
                values.join(", ")
            ));
        }

        Ok(finish_block(statements))
    }

    /// `TRUNCATE` is optional in the standard, so the table is cleared with `DELETE`
    fn format_truncate(&self, table: &TableStructure) -> Result<String, FormatError> {
        let name = table_name(&table.name, &self.options);
        Ok(format!("DELETE FROM {};\n", quote_identifier(&name)))
    }

    /// Restart identity columns after the highest id inserted
    fn format_sequence_reset(
        &self,
        table: &TableStructure,
        data: &TableData,
    ) -> Result<String, FormatError> {
        let name = table_name(&table.name, &self.options);

        let mut statements = Vec::new();
        for column in &table.columns {
            if !parse_extra(&column.extra)?.auto_increment {
                continue;
            }
            let highest = data
                .rows
                .iter()
                .filter_map(|row| row.get(&column.name))
                .filter_map(|field| field.value.as_deref())
                .filter_map(|value| value.trim().parse::<i64>().ok())
                .max();
            if let Some(highest) = highest {
                statements.push(format!(
                    "ALTER TABLE {} ALTER COLUMN {} RESTART WITH {};",
                    quote_identifier(&name),
                    quote_identifier(&column.name),
                    highest.saturating_add(1)
                ));
            }
        }
        Ok(finish_block(statements))
    }
}

/// Quote an identifier only when it is not a plain word or is reserved
pub fn quote_identifier(identifier: &str) -> String {
    let reserved = RESERVED_WORDS
        .iter()
        .any(|word| word.eq_ignore_ascii_case(identifier));
    if PLAIN_IDENTIFIER.is_match(identifier) && !reserved {
        identifier.to_string()
    } else {
        format!("\"{}\"", identifier.replace('"', "\"\""))
    }
}

fn map_type(
    column: &ColumnDescriptor,
    ty: &MySqlType,
    extras: &ColumnExtras,
) -> Result<String, FormatError> {
    if extras.auto_increment && !ty.is_integer() {
        return Err(unsupported(format!(
            "Auto-increment on {} column {}",
            column.column_type, column.name
        )));
    }

    let mapped = match ty.base.as_str() {
        "bool" | "boolean" => "BOOLEAN".to_string(),
        "tinyint" => "SMALLINT".to_string(),
        "smallint" if ty.unsigned => "INTEGER".to_string(),
        "smallint" => "SMALLINT".to_string(),
        "mediumint" => "INTEGER".to_string(),
        "int" | "integer" if ty.unsigned => "BIGINT".to_string(),
        "int" | "integer" => "INTEGER".to_string(),
        "bigint" if ty.unsigned => "DECIMAL(20)".to_string(),
        "bigint" => "BIGINT".to_string(),
        "decimal" | "numeric" | "dec" | "fixed" => match ty.numbers().as_slice() {
            [precision, scale] => format!("DECIMAL({},{})", precision, scale),
            [precision] => format!("DECIMAL({})", precision),
            _ => "DECIMAL".to_string(),
        },
        "float" => "REAL".to_string(),
        "double" | "double precision" | "real" => "DOUBLE PRECISION".to_string(),
        "char" => format!("CHAR({})", ty.length().unwrap_or(1)),
        "varchar" => match ty.length() {
            Some(length) => format!("VARCHAR({})", length),
            None => "CLOB".to_string(),
        },
        "tinytext" | "text" | "mediumtext" | "longtext" | "json" => "CLOB".to_string(),
        "binary" => format!("BINARY({})", ty.length().unwrap_or(1)),
        "varbinary" => match ty.length() {
            Some(length) => format!("VARBINARY({})", length),
            None => "BLOB".to_string(),
        },
        "tinyblob" | "blob" | "mediumblob" | "longblob" => "BLOB".to_string(),
        "date" => "DATE".to_string(),
        "time" => "TIME".to_string(),
        "datetime" | "timestamp" => match ty.length() {
            Some(precision) => format!("TIMESTAMP({})", precision),
            None => "TIMESTAMP".to_string(),
        },
        "year" => "SMALLINT".to_string(),
        "enum" | "set" => {
            let values = ty.values()?;
            let length = if ty.base == "set" {
                warn!(
                    column = %column.name,
                    column_type = %column.column_type,
                    "SET column stored as text without a constraint"
                );
                values.iter().map(|v| v.chars().count() + 1).sum::<usize>()
            } else {
                values.iter().map(|v| v.chars().count()).max().unwrap_or(0)
            };
            format!("VARCHAR({})", length.max(1))
        }
        _ => {
            return Err(unsupported(format!(
                "Column type {} of column {}",
                column.column_type, column.name
            )));
        }
    };
    Ok(mapped)
}

fn default_literal(
    column: &ColumnDescriptor,
    ty: &MySqlType,
    default: &str,
    extras: &ColumnExtras,
) -> Result<String, FormatError> {
    if ty.is_temporal() {
        if let Some(timestamp) = current_timestamp(default) {
            return Ok(timestamp);
        }
    }
    if extras.default_generated {
        Err(unsupported(format!(
            "Expression default {} of column {}",
            default, column.name
        )))
    } else if ty.is_temporal() {
        quote_standard_literal(portable_date_default(default))
    } else {
        quote_standard_literal(default)
    }
}
