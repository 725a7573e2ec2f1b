//! XML dump reader
//!
//! Decodes documents written by [`crate::export::xml`] and plain
//! `mysqldump --xml` output. Entity references are resolved exactly once by
//! quick-xml; anything that does not fit the document shape is rejected.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use crate::import::ImportError;
use crate::models::{
    ColumnDescriptor, DatabaseEntry, Dump, KeyDescriptor, Row, RowField, TableData, TableEntry,
    TableStructure,
};

/// Decode a dump document
///
/// # Example
///
/// ```rust
/// use xml2sql::import::decode;
///
/// let xml = r##"<?xml version="1.0"?>
/// <mysqldump xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
///  <database name="">
///   <table_data name="#__users">
///    <row><field name="id">1</field></row>
///   </table_data>
///  </database>
/// </mysqldump>"##;
///
/// let dump = decode(xml).unwrap();
/// assert_eq!(dump.data().next().unwrap().rows.len(), 1);
/// ```
pub fn decode(xml: &str) -> Result<Dump, ImportError> {
    let mut reader = Reader::from_str(xml);
    let mut builder = DumpBuilder::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => builder.open(e, false)?,
            Ok(Event::Empty(ref e)) => builder.open(e, true)?,
            Ok(Event::End(_)) => builder.close()?,
            Ok(Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| malformed(format!("Invalid text content: {}", err)))?;
                builder.text(&text)?;
            }
            Ok(Event::CData(ref e)) => builder.text(&String::from_utf8_lossy(e))?,
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(malformed(format!(
                    "XML parsing error at position {}: {}",
                    reader.error_position(),
                    e
                )));
            }
        }
    }

    builder.finish()
}

fn malformed(message: impl Into<String>) -> ImportError {
    ImportError::MalformedDocument(message.into())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Root,
    Database,
    Structure,
    Data,
    Row,
    Value,
    Leaf(&'static str),
    Skipped,
}

impl Scope {
    fn element(self) -> &'static str {
        match self {
            Scope::Root => "mysqldump",
            Scope::Database => "database",
            Scope::Structure => "table_structure",
            Scope::Data => "table_data",
            Scope::Row => "row",
            Scope::Value => "field",
            Scope::Leaf(name) => name,
            Scope::Skipped => "options",
        }
    }
}

/// Attributes of one element, values unescaped
struct Attributes(Vec<(String, String)>);

impl Attributes {
    fn read(element: &BytesStart<'_>) -> Result<Self, ImportError> {
        let mut attributes = Vec::new();
        for attribute in element.attributes() {
            let attribute =
                attribute.map_err(|e| malformed(format!("Invalid attribute: {}", e)))?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute
                .unescape_value()
                .map_err(|e| malformed(format!("Invalid value for attribute {}: {}", key, e)))?
                .into_owned();
            attributes.push((key, value));
        }
        Ok(Self(attributes))
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn require(&self, element: &str, name: &str) -> Result<&str, ImportError> {
        self.get(name).ok_or_else(|| {
            malformed(format!(
                "Missing attribute {} on <{}> element",
                name, element
            ))
        })
    }

    fn get_or_empty(&self, name: &str) -> String {
        self.get(name).unwrap_or_default().to_string()
    }
}

#[derive(Default)]
struct DumpBuilder {
    stack: Vec<Scope>,
    root_seen: bool,
    database: Option<DatabaseEntry>,
    structure: Option<TableStructure>,
    data: Option<TableData>,
    row: Option<Row>,
    value: Option<RowField>,
}

impl DumpBuilder {
    fn open(&mut self, element: &BytesStart<'_>, empty: bool) -> Result<(), ImportError> {
        let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
        let attributes = Attributes::read(element)?;

        let scope = match (self.stack.last().copied(), name.as_str()) {
            (None, "mysqldump" | "dump") if !self.root_seen => {
                self.root_seen = true;
                Scope::Root
            }
            (None, other) if self.root_seen => {
                return Err(malformed(format!(
                    "Element <{}> after the root element",
                    other
                )));
            }
            (None, other) => {
                return Err(malformed(format!("Unexpected root element <{}>", other)));
            }
            (Some(Scope::Root), "database") => {
                if self.database.is_some() {
                    return Err(malformed("More than one <database> element"));
                }
                self.database = Some(DatabaseEntry {
                    name: attributes.get_or_empty("name"),
                    tables: Vec::new(),
                });
                Scope::Database
            }
            (Some(Scope::Database), "table_structure") => {
                let table = attributes.require("table_structure", "name")?;
                self.structure = Some(TableStructure::new(table, Vec::new()));
                Scope::Structure
            }
            (Some(Scope::Database), "table_data") => {
                let table = attributes.require("table_data", "name")?;
                self.data = Some(TableData::new(table, Vec::new()));
                Scope::Data
            }
            (Some(Scope::Structure), "field") => {
                let column = read_column(&attributes)?;
                if let Some(structure) = self.structure.as_mut() {
                    structure.columns.push(column);
                }
                Scope::Leaf("field")
            }
            (Some(Scope::Structure), "key") => {
                let key = read_key(&attributes)?;
                if let Some(structure) = self.structure.as_mut() {
                    structure.keys.push(key);
                }
                Scope::Leaf("key")
            }
            (Some(Scope::Structure), "options") => {
                debug!("Skipping table options element");
                Scope::Skipped
            }
            (Some(Scope::Data), "row") => {
                self.row = Some(Row::new());
                Scope::Row
            }
            (Some(Scope::Row), "field") => {
                let field = attributes.require("field", "name")?.to_string();
                let nil = matches!(attributes.get("xsi:nil"), Some("true") | Some("1"));
                self.value = Some(RowField {
                    name: field,
                    value: if nil { None } else { Some(String::new()) },
                });
                Scope::Value
            }
            (Some(Scope::Skipped), _) => Scope::Skipped,
            (Some(scope), other) => {
                return Err(malformed(format!(
                    "Unexpected element <{}> inside <{}>",
                    other,
                    scope.element()
                )));
            }
        };

        self.stack.push(scope);
        if empty {
            self.close()?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), ImportError> {
        let scope = self
            .stack
            .pop()
            .ok_or_else(|| malformed("End tag without matching start tag"))?;

        match scope {
            Scope::Structure => {
                if let (Some(structure), Some(database)) =
                    (self.structure.take(), self.database.as_mut())
                {
                    database.tables.push(TableEntry::Structure(structure));
                }
            }
            Scope::Data => {
                if let (Some(data), Some(database)) = (self.data.take(), self.database.as_mut()) {
                    database.tables.push(TableEntry::Data(data));
                }
            }
            Scope::Row => {
                if let (Some(row), Some(data)) = (self.row.take(), self.data.as_mut()) {
                    data.rows.push(row);
                }
            }
            Scope::Value => {
                if let (Some(field), Some(row)) = (self.value.take(), self.row.as_mut()) {
                    row.fields.push(field);
                }
            }
            Scope::Root | Scope::Database | Scope::Leaf(_) | Scope::Skipped => {}
        }
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<(), ImportError> {
        match (self.stack.last(), self.value.as_mut()) {
            (Some(Scope::Value), Some(RowField { value: Some(buffer), .. })) => {
                buffer.push_str(text);
                Ok(())
            }
            (Some(Scope::Skipped), _) => Ok(()),
            _ if text.trim().is_empty() => Ok(()),
            (scope, _) => Err(malformed(format!(
                "Unexpected text content inside <{}>",
                scope.map(|s| s.element()).unwrap_or("document")
            ))),
        }
    }

    fn finish(self) -> Result<Dump, ImportError> {
        if !self.root_seen {
            return Err(malformed("Document has no root element"));
        }
        if let Some(scope) = self.stack.last() {
            return Err(malformed(format!(
                "Unexpected end of document inside <{}>",
                scope.element()
            )));
        }
        let database = self
            .database
            .ok_or_else(|| malformed("Missing <database> element"))?;
        Ok(Dump { database })
    }
}

fn read_column(attributes: &Attributes) -> Result<ColumnDescriptor, ImportError> {
    let null = attributes.require("field", "Null")?;
    let nullable = if null.eq_ignore_ascii_case("YES") {
        true
    } else if null.eq_ignore_ascii_case("NO") {
        false
    } else {
        return Err(malformed(format!("Invalid Null value {:?}", null)));
    };

    Ok(ColumnDescriptor {
        name: attributes.require("field", "Field")?.to_string(),
        column_type: attributes.require("field", "Type")?.to_string(),
        nullable,
        key: attributes.get_or_empty("Key"),
        default: attributes.get("Default").map(str::to_string),
        extra: attributes.get_or_empty("Extra"),
        comment: attributes.get_or_empty("Comment"),
    })
}

fn read_key(attributes: &Attributes) -> Result<KeyDescriptor, ImportError> {
    let non_unique = match attributes.require("key", "Non_unique")?.trim() {
        "0" => false,
        "1" => true,
        other => return Err(malformed(format!("Invalid Non_unique value {:?}", other))),
    };

    let seq = attributes.require("key", "Seq_in_index")?;
    let seq_in_index = seq
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|seq| *seq > 0)
        .ok_or_else(|| malformed(format!("Invalid Seq_in_index value {:?}", seq)))?;

    Ok(KeyDescriptor {
        table: attributes.require("key", "Table")?.to_string(),
        non_unique,
        key_name: attributes.require("key", "Key_name")?.to_string(),
        seq_in_index,
        column_name: attributes.require("key", "Column_name")?.to_string(),
        collation: attributes.get_or_empty("Collation"),
        nullable: attributes.get_or_empty("Null"),
        index_type: attributes.get_or_empty("Index_type"),
        comment: attributes.get_or_empty("Comment"),
    })
}
