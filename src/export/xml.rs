//! XML dump writer
//!
//! Writes the intermediate document in the `mysqldump --xml` layout. Every
//! attribute value and every row value goes through quick-xml's entity
//! escaping, so comments and data may contain `<`, `>`, `&` and quotes.
//! SQL NULL row values are written as `xsi:nil="true"`.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::export::ExportError;
use crate::models::{ColumnDescriptor, Dump, KeyDescriptor, Row, TableEntry, TableStructure};

/// Root element name written by the exporter
pub const ROOT_ELEMENT: &str = "mysqldump";

/// Namespace bound to the `xsi` prefix on the root element
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Streaming writer for dump documents
///
/// Calls must follow the document shape: [`start`](Self::start), then any
/// sequence of [`write_structure`](Self::write_structure) and
/// [`start_data`](Self::start_data) / [`write_row`](Self::write_row) /
/// [`end_data`](Self::end_data), then [`finish`](Self::finish).
pub struct DumpWriter<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> DumpWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: Writer::new_with_indent(inner, b' ', 1),
        }
    }

    /// Write the XML declaration, the root element and the database element
    pub fn start(&mut self, database_name: &str) -> Result<(), ExportError> {
        self.event(Event::Decl(BytesDecl::new("1.0", None, None)))?;

        let mut root = BytesStart::new(ROOT_ELEMENT);
        root.push_attribute(("xmlns:xsi", XSI_NAMESPACE));
        self.event(Event::Start(root))?;

        let mut database = BytesStart::new("database");
        database.push_attribute(("name", database_name));
        self.event(Event::Start(database))
    }

    /// Write one complete `table_structure` element
    pub fn write_structure(&mut self, structure: &TableStructure) -> Result<(), ExportError> {
        let mut element = BytesStart::new("table_structure");
        element.push_attribute(("name", structure.name.as_str()));
        self.event(Event::Start(element))?;

        for column in &structure.columns {
            self.event(Event::Empty(column_element(column)))?;
        }
        for key in &structure.keys {
            self.event(Event::Empty(key_element(key)))?;
        }

        self.event(Event::End(BytesEnd::new("table_structure")))
    }

    pub fn start_data(&mut self, table: &str) -> Result<(), ExportError> {
        let mut element = BytesStart::new("table_data");
        element.push_attribute(("name", table));
        self.event(Event::Start(element))
    }

    pub fn write_row(&mut self, row: &Row) -> Result<(), ExportError> {
        self.event(Event::Start(BytesStart::new("row")))?;

        for field in &row.fields {
            let mut element = BytesStart::new("field");
            element.push_attribute(("name", field.name.as_str()));
            match &field.value {
                None => {
                    element.push_attribute(("xsi:nil", "true"));
                    self.event(Event::Empty(element))?;
                }
                Some(value) => {
                    self.event(Event::Start(element))?;
                    // An explicit text event, even when empty, keeps the end
                    // tag on the same line so no indentation leaks into the value
                    self.event(Event::Text(BytesText::new(value)))?;
                    self.event(Event::End(BytesEnd::new("field")))?;
                }
            }
        }

        self.event(Event::End(BytesEnd::new("row")))
    }

    pub fn end_data(&mut self) -> Result<(), ExportError> {
        self.event(Event::End(BytesEnd::new("table_data")))
    }

    /// Close the database and root elements and hand back the sink
    pub fn finish(mut self) -> Result<W, ExportError> {
        self.event(Event::End(BytesEnd::new("database")))?;
        self.event(Event::End(BytesEnd::new(ROOT_ELEMENT)))?;
        let mut inner = self.writer.into_inner();
        inner
            .write_all(b"\n")
            .and_then(|_| inner.flush())
            .map_err(|e| ExportError::IoError(format!("Failed to flush dump: {}", e)))?;
        Ok(inner)
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), ExportError> {
        self.writer
            .write_event(event)
            .map_err(|e| ExportError::IoError(format!("Failed to write dump: {}", e)))
    }
}

fn column_element(column: &ColumnDescriptor) -> BytesStart<'static> {
    let mut element = BytesStart::new("field");
    element.push_attribute(("Field", column.name.as_str()));
    element.push_attribute(("Type", column.column_type.as_str()));
    element.push_attribute(("Null", column.null_flag()));
    element.push_attribute(("Key", column.key.as_str()));
    if let Some(default) = &column.default {
        element.push_attribute(("Default", default.as_str()));
    }
    element.push_attribute(("Extra", column.extra.as_str()));
    element.push_attribute(("Comment", column.comment.as_str()));
    element
}

fn key_element(key: &KeyDescriptor) -> BytesStart<'static> {
    let seq_in_index = key.seq_in_index.to_string();
    let mut element = BytesStart::new("key");
    element.push_attribute(("Table", key.table.as_str()));
    element.push_attribute(("Non_unique", key.non_unique_flag()));
    element.push_attribute(("Key_name", key.key_name.as_str()));
    element.push_attribute(("Seq_in_index", seq_in_index.as_str()));
    element.push_attribute(("Column_name", key.column_name.as_str()));
    element.push_attribute(("Collation", key.collation.as_str()));
    element.push_attribute(("Null", key.nullable.as_str()));
    element.push_attribute(("Index_type", key.index_type.as_str()));
    element.push_attribute(("Comment", key.comment.as_str()));
    element
}

/// Encode a complete dump to a string
///
/// # Example
///
/// ```rust
/// use xml2sql::export::xml::encode;
/// use xml2sql::models::Dump;
///
/// let xml = encode(&Dump::default()).unwrap();
/// assert!(xml.contains("<database name=\"\">"));
/// ```
pub fn encode(dump: &Dump) -> Result<String, ExportError> {
    let mut writer = DumpWriter::new(Vec::new());
    writer.start(&dump.database.name)?;

    for entry in dump.tables() {
        match entry {
            TableEntry::Structure(structure) => writer.write_structure(structure)?,
            TableEntry::Data(data) => {
                writer.start_data(&data.name)?;
                for row in &data.rows {
                    writer.write_row(row)?;
                }
                writer.end_data()?;
            }
        }
    }

    let bytes = writer.finish()?;
    String::from_utf8(bytes)
        .map_err(|e| ExportError::SerializationError(format!("Dump is not valid UTF-8: {}", e)))
}
