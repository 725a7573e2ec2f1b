//! PostgreSQL formatter
//!
//! MySQL column types are mapped to their PostgreSQL counterparts.
//! Auto-increment integers become `serial`/`bigserial`, `enum(...)` becomes
//! `text` with a `CHECK` constraint. Secondary keys are separate
//! `CREATE INDEX` statements named `<table>_<key>`, since PostgreSQL index
//! names share one namespace per schema.

use tracing::{debug, warn};

use crate::format::types::MySqlType;
use crate::format::{
    ColumnExtras, FormatError, FormatOptions, SqlFormatter, check_key_columns, finish_block,
    current_timestamp, parse_extra, portable_date_default, quote_standard_literal, table_name,
    unsupported,
};
use crate::models::{ColumnDescriptor, KeyGroup, KeyKind, TableData, TableStructure};

/// Formatter for PostgreSQL
#[derive(Debug, Clone)]
pub struct PostgreSqlFormatter {
    options: FormatOptions,
}

impl PostgreSqlFormatter {
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
        if let Some(default) = &column.default {
            if !extras.auto_increment {
                clause.push_str(" DEFAULT ");
                clause.push_str(&default_literal(column, &ty, default, &extras)?);
            }
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

    fn index_statement(&self, table: &str, group: &KeyGroup<'_>) -> Result<String, FormatError> {
        let index_type = group.index_type();
        let using = match index_type.as_str() {
            "" | "BTREE" => "",
            "HASH" if group.kind() == KeyKind::Unique => {
                return Err(unsupported(format!(
                    "Unique hash index {} on table {}",
                    group.name, table
                )));
            }
            "HASH" if group.parts.len() > 1 => {
                return Err(unsupported(format!(
                    "Multi-column hash index {} on table {}",
                    group.name, table
                )));
            }
            "HASH" => " USING hash",
            other => {
                return Err(unsupported(format!(
                    "{} index {} on table {}",
                    other, group.name, table
                )));
            }
        };

        let unique = if group.kind() == KeyKind::Unique {
            "UNIQUE "
        } else {
            ""
        };

        let columns = group
            .parts
            .iter()
            .map(|part| {
                if part.is_descending() && !using.is_empty() {
                    Err(unsupported(format!(
                        "Descending hash index {} on table {}",
                        group.name, table
                    )))
                } else if part.is_descending() {
                    Ok(format!("{} DESC", quote_identifier(&part.column_name)))
                } else {
                    Ok(quote_identifier(&part.column_name))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(format!(
            "CREATE {}INDEX {} ON {}{} ({});",
            unique,
            quote_identifier(&index_name(table, group.name)),
            quote_identifier(table),
            using,
            columns.join(", ")
        ))
    }
}

impl SqlFormatter for PostgreSqlFormatter {
    fn name(&self) -> &str {
        "postgresql"
    }

    fn format_create(&self, table: &TableStructure) -> Result<String, FormatError> {
        let name = table_name(&table.name, &self.options);
        debug!(table = %name, "Formatting PostgreSQL create statement");

        let mut clauses = Vec::new();
        let mut trailing = Vec::new();

        for column in &table.columns {
            clauses.push(self.column_clause(column)?);
        }

        for group in table.key_groups() {
            check_key_columns(&name, &group)?;
            let comment = group
                .parts
                .first()
                .map(|part| part.comment.as_str())
                .unwrap_or("");

            if group.kind() == KeyKind::Primary {
                if !matches!(group.index_type().as_str(), "" | "BTREE") {
                    return Err(unsupported(format!(
                        "{} primary key on table {}",
                        group.index_type(),
                        name
                    )));
                }
                if group.parts.iter().any(|part| part.is_descending()) {
                    return Err(unsupported(format!(
                        "Descending primary key column on table {}",
                        name
                    )));
                }
                let columns = group
                    .columns()
                    .iter()
                    .map(|column| quote_identifier(column))
                    .collect::<Vec<_>>();
                clauses.push(format!("PRIMARY KEY ({})", columns.join(", ")));
                if !comment.is_empty() {
                    trailing.push(format!(
                        "COMMENT ON CONSTRAINT {} ON {} IS {};",
                        quote_identifier(&format!("{}_pkey", name)),
                        quote_identifier(&name),
                        quote_standard_literal(comment)?
                    ));
                }
            } else {
                trailing.push(self.index_statement(&name, &group)?);
                if !comment.is_empty() {
                    trailing.push(format!(
                        "COMMENT ON INDEX {} IS {};",
                        quote_identifier(&index_name(&name, group.name)),
                        quote_standard_literal(comment)?
                    ));
                }
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

    fn format_truncate(&self, table: &TableStructure) -> Result<String, FormatError> {
        let name = table_name(&table.name, &self.options);
        Ok(format!(
            "TRUNCATE TABLE {} RESTART IDENTITY;\n",
            quote_identifier(&name)
        ))
    }

    /// Explicit ids do not advance a `serial` sequence, so it is set past
    /// the highest id in the table
    fn format_sequence_reset(
        &self,
        table: &TableStructure,
        data: &TableData,
    ) -> Result<String, FormatError> {
        if data.rows.is_empty() {
            return Ok(String::new());
        }
        let name = table_name(&table.name, &self.options);

        let mut statements = Vec::new();
        for column in &table.columns {
            if !parse_extra(&column.extra)?.auto_increment {
                continue;
            }
            statements.push(format!(
                "SELECT setval(pg_get_serial_sequence({}, {}), COALESCE((SELECT MAX({}) FROM {}), 0) + 1, false);",
                quote_standard_literal(&quote_identifier(&name))?,
                quote_standard_literal(&column.name)?,
                quote_identifier(&column.name),
                quote_identifier(&name)
            ));
        }
        Ok(finish_block(statements))
    }
}

/// Double-quote quoting, embedded double quotes doubled
pub fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

fn index_name(table: &str, key: &str) -> String {
    format!("{}_{}", table, key)
}

fn map_type(
    column: &ColumnDescriptor,
    ty: &MySqlType,
    extras: &ColumnExtras,
) -> Result<String, FormatError> {
    if extras.auto_increment {
        return match (ty.base.as_str(), ty.unsigned) {
            ("tinyint" | "smallint" | "mediumint", _) | ("int" | "integer", false) => {
                Ok("serial".to_string())
            }
            ("int" | "integer", true) | ("bigint", _) => Ok("bigserial".to_string()),
            _ => Err(unsupported(format!(
                "Auto-increment on {} column {}",
                column.column_type, column.name
            ))),
        };
    }

    let mapped = match ty.base.as_str() {
        "bool" | "boolean" => "boolean".to_string(),
        "tinyint" => "smallint".to_string(),
        "smallint" if ty.unsigned => "integer".to_string(),
        "smallint" => "smallint".to_string(),
        "mediumint" => "integer".to_string(),
        "int" | "integer" if ty.unsigned => "bigint".to_string(),
        "int" | "integer" => "integer".to_string(),
        "bigint" if ty.unsigned => "numeric(20)".to_string(),
        "bigint" => "bigint".to_string(),
        "decimal" | "numeric" | "dec" | "fixed" => match ty.numbers().as_slice() {
            [precision, scale] => format!("numeric({},{})", precision, scale),
            [precision] => format!("numeric({})", precision),
            _ => "numeric".to_string(),
        },
        "float" => "real".to_string(),
        "double" | "double precision" | "real" => "double precision".to_string(),
        "char" => format!("char({})", ty.length().unwrap_or(1)),
        "varchar" => match ty.length() {
            Some(length) => format!("varchar({})", length),
            None => "text".to_string(),
        },
        "tinytext" | "text" | "mediumtext" | "longtext" => "text".to_string(),
        "binary" | "varbinary" | "tinyblob" | "blob" | "mediumblob" | "longblob" => {
            "bytea".to_string()
        }
        "date" => "date".to_string(),
        "time" => "time".to_string(),
        "datetime" | "timestamp" => match ty.length() {
            Some(precision) => format!("timestamp({})", precision),
            None => "timestamp".to_string(),
        },
        "year" => "smallint".to_string(),
        "json" => "jsonb".to_string(),
        "enum" => "text".to_string(),
        "set" => {
            warn!(
                column = %column.name,
                column_type = %column.column_type,
                "SET column stored as text without a constraint"
            );
            "text".to_string()
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
