//! Dump to SQL conversion
//!
//! Drives one formatter over a whole dump and produces an installable script.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::format::{FormatError, FormatOptions, FormatterRegistry, SqlFormatter};
use crate::import::{ImportError, decode};
use crate::models::Dump;

/// Error during conversion
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("Import error: {0}")]
    Import(#[from] ImportError),
    #[error("Format error: {0}")]
    Format(#[from] FormatError),
}

/// What a script is meant to do with the tables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvertMode {
    /// Create every table, then insert the data
    #[default]
    Install,
    /// Empty every table, then insert the data
    SampleData,
}

/// A generated script and the statement groups it holds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlScript {
    pub sql: String,
    pub creates: usize,
    pub truncates: usize,
    pub inserts: usize,
}

/// Convert a dump with `formatter`
///
/// Structure entries come first (as `CREATE` or clearing statements,
/// depending on `mode`), then every data entry, each group in document order.
/// A data entry whose structure is in the dump is followed by the dialect's
/// identity counter reset.
pub fn convert(
    dump: &Dump,
    formatter: &dyn SqlFormatter,
    mode: ConvertMode,
) -> Result<SqlScript, FormatError> {
    let mut script = SqlScript::default();

    for structure in dump.structures() {
        match mode {
            ConvertMode::Install => {
                script.sql.push_str(&formatter.format_create(structure)?);
                script.creates += 1;
            }
            ConvertMode::SampleData => {
                script.sql.push_str(&formatter.format_truncate(structure)?);
                script.truncates += 1;
            }
        }
    }
    if script.truncates > 0 {
        script.sql.push('\n');
    }

    for data in dump.data() {
        debug!(table = %data.name, rows = data.rows.len(), "Formatting table data");
        script.sql.push_str(&formatter.format_insert(data)?);
        script.inserts += 1;

        if let Some(structure) = dump.structures().find(|s| s.name == data.name) {
            script
                .sql
                .push_str(&formatter.format_sequence_reset(structure, data)?);
        }
    }

    info!(
        format = formatter.name(),
        creates = script.creates,
        truncates = script.truncates,
        inserts = script.inserts,
        "Conversion finished"
    );
    Ok(script)
}

/// Decode `xml` and convert it for the dialect registered as `format`
///
/// The formatter is resolved first, so an unknown format is reported even
/// when the document is malformed.
///
/// # Example
///
/// ```rust
/// use xml2sql::convert::{ConvertMode, xml_to_sql};
/// use xml2sql::format::{FormatOptions, FormatterRegistry};
///
/// let xml = r##"<mysqldump><database name="">
///   <table_structure name="#__t">
///     <field Field="id" Type="int(11)" Null="NO" Key="" Extra="" Comment=""/>
///   </table_structure>
/// </database></mysqldump>"##;
///
/// let script = xml_to_sql(
///     xml,
///     "mysql",
///     &FormatOptions::default().with_prefix("jos_"),
///     ConvertMode::Install,
///     &FormatterRegistry::with_builtins(),
/// )
/// .unwrap();
/// assert!(script.sql.starts_with("CREATE TABLE `jos_t`"));
/// assert_eq!(script.creates, 1);
/// ```
pub fn xml_to_sql(
    xml: &str,
    format: &str,
    options: &FormatOptions,
    mode: ConvertMode,
    registry: &FormatterRegistry,
) -> Result<SqlScript, ConvertError> {
    let formatter = registry.create(format, options)?;
    let dump = decode(xml)?;
    Ok(convert(&dump, formatter.as_ref(), mode)?)
}

/// Convert a dump once for every registered format, in registry order
pub fn convert_all(
    dump: &Dump,
    registry: &FormatterRegistry,
    options: &FormatOptions,
    mode: ConvertMode,
) -> Result<Vec<(String, SqlScript)>, FormatError> {
    registry
        .names()
        .into_iter()
        .map(|name| -> Result<_, FormatError> {
            let formatter = registry.create(name, options)?;
            Ok((name.to_string(), convert(dump, formatter.as_ref(), mode)?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColumnDescriptor, Row, TableData, TableEntry, TableStructure};

    fn dump() -> Dump {
        Dump::new(vec![
            TableEntry::Structure(TableStructure::new(
                "#__a",
                vec![ColumnDescriptor::new("id", "int(11)")],
            )),
            TableEntry::Data(TableData::new(
                "#__a",
                vec![Row::new().with("id", Some("1"))],
            )),
            TableEntry::Structure(TableStructure::new(
                "#__b",
                vec![ColumnDescriptor::new("id", "int(11)")],
            )),
            TableEntry::Data(TableData::new("#__b", Vec::new())),
        ])
    }

    fn mysql() -> Box<dyn SqlFormatter> {
        FormatterRegistry::with_builtins()
            .create("mysql", &FormatOptions::default().with_prefix("jos_"))
            .unwrap()
    }

    #[test]
    fn test_install_creates_then_inserts() {
        let script = convert(&dump(), mysql().as_ref(), ConvertMode::Install).unwrap();
        assert_eq!((script.creates, script.truncates, script.inserts), (2, 0, 2));

        let create_a = script.sql.find("CREATE TABLE `jos_a`").unwrap();
        let create_b = script.sql.find("CREATE TABLE `jos_b`").unwrap();
        let insert_a = script.sql.find("INSERT INTO `jos_a`").unwrap();
        assert!(create_a < create_b && create_b < insert_a);
    }

    #[test]
    fn test_sample_data_truncates_instead_of_creating() {
        let script = convert(&dump(), mysql().as_ref(), ConvertMode::SampleData).unwrap();
        assert_eq!((script.creates, script.truncates, script.inserts), (0, 2, 2));
        assert!(!script.sql.contains("CREATE TABLE"));
        assert!(script.sql.starts_with("TRUNCATE TABLE `jos_a`;\nTRUNCATE TABLE `jos_b`;\n\n"));
    }

    #[test]
    fn test_identity_reset_follows_inserts() {
        let dump = Dump::new(vec![
            TableEntry::Structure(TableStructure::new(
                "#__a",
                vec![
                    ColumnDescriptor::new("id", "int(11)")
                        .not_null()
                        .with_key("PRI")
                        .with_extra("auto_increment"),
                ],
            )),
            TableEntry::Data(TableData::new(
                "#__a",
                vec![Row::new().with("id", Some("3"))],
            )),
            TableEntry::Data(TableData::new(
                "#__orphan",
                vec![Row::new().with("id", Some("9"))],
            )),
        ]);
        let options = FormatOptions::default().with_prefix("jos_");
        let registry = FormatterRegistry::with_builtins();

        for mode in [ConvertMode::Install, ConvertMode::SampleData] {
            let postgres = registry.create("postgresql", &options).unwrap();
            let script = convert(&dump, postgres.as_ref(), mode).unwrap();
            let insert = script.sql.find("INSERT INTO \"jos_a\"").unwrap();
            let reset = script.sql.find("SELECT setval(").unwrap();
            assert!(insert < reset);
            assert_eq!(script.sql.matches("setval(").count(), 1);
            assert_eq!(script.inserts, 2);
        }

        let generic = registry.create("generic", &options).unwrap();
        let script = convert(&dump, generic.as_ref(), ConvertMode::Install).unwrap();
        assert!(script.sql.ends_with(
            "INSERT INTO jos_a (id) VALUES ('3');\n\n\
             ALTER TABLE jos_a ALTER COLUMN id RESTART WITH 4;\n\n\
             INSERT INTO jos_orphan (id) VALUES ('9');\n\n"
        ));
    }

    #[test]
    fn test_unknown_format_is_reported_before_decoding() {
        let result = xml_to_sql(
            "not xml at all",
            "doesnotexist",
            &FormatOptions::default(),
            ConvertMode::Install,
            &FormatterRegistry::with_builtins(),
        );
        assert!(matches!(
            result,
            Err(ConvertError::Format(FormatError::UnknownFormat(_)))
        ));
    }

    #[test]
    fn test_malformed_document() {
        let result = xml_to_sql(
            "<mysqldump/>",
            "mysql",
            &FormatOptions::default(),
            ConvertMode::Install,
            &FormatterRegistry::with_builtins(),
        );
        assert!(matches!(
            result,
            Err(ConvertError::Import(ImportError::MalformedDocument(_)))
        ));
    }

    #[test]
    fn test_convert_all_covers_every_format() {
        let scripts = convert_all(
            &dump(),
            &FormatterRegistry::with_builtins(),
            &FormatOptions::default(),
            ConvertMode::Install,
        )
        .unwrap();
        let names: Vec<&str> = scripts.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["generic", "mysql", "postgresql"]);
        assert!(scripts.iter().all(|(_, script)| script.creates == 2));
    }

    #[test]
    fn test_convert_all_fails_as_a_whole() {
        let dump = Dump::new(vec![TableEntry::Structure(TableStructure::new(
            "#__t",
            vec![ColumnDescriptor::new("shape", "geometry")],
        ))]);
        let result = convert_all(
            &dump,
            &FormatterRegistry::with_builtins(),
            &FormatOptions::default(),
            ConvertMode::Install,
        );
        assert!(matches!(result, Err(FormatError::UnsupportedConstruct(_))));
    }
}
