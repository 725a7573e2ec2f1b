//! Dump document tests

use xml2sql::export::xml::encode;
use xml2sql::import::{ImportError, decode};
use xml2sql::models::{
    ColumnDescriptor, DatabaseEntry, Dump, KeyDescriptor, Row, TableData, TableEntry,
    TableStructure,
};

fn sample_dump() -> Dump {
    let structure = TableStructure::new(
        "#__users",
        vec![
            ColumnDescriptor::new("id", "int(11)")
                .not_null()
                .with_key("PRI")
                .with_extra("auto_increment"),
            ColumnDescriptor::new("name", "varchar(255)")
                .not_null()
                .with_default("")
                .with_comment("Shown as <name> & \"nick\" in the 'list'"),
            ColumnDescriptor::new("params", "text"),
            ColumnDescriptor::new("state", "enum('a','b')")
                .not_null()
                .with_default("a"),
        ],
    )
    .with_keys(vec![
        KeyDescriptor::new("#__users", "PRIMARY", 1, "id", false),
        KeyDescriptor::new("#__users", "idx_name", 2, "state", true)
            .with_comment("<composite>"),
        KeyDescriptor::new("#__users", "idx_name", 1, "name", true).with_collation("D"),
    ]);

    let data = TableData::new(
        "#__users",
        vec![
            Row::new()
                .with("id", Some("1"))
                .with("name", Some("Tom & Jerry <cartoon>"))
                .with("params", Some("{\"a\":\"b\"}"))
                .with("state", Some("a")),
            Row::new()
                .with("id", Some("2"))
                .with("name", Some(""))
                .with("params", None)
                .with("state", Some("  padded  ")),
        ],
    );

    Dump {
        database: DatabaseEntry {
            name: "joomla".to_string(),
            tables: vec![
                TableEntry::Structure(structure),
                TableEntry::Data(data),
                TableEntry::Data(TableData::new("#__empty", Vec::new())),
            ],
        },
    }
}

mod roundtrip_tests {
    use super::*;

    #[test]
    fn test_decode_inverts_encode() {
        let dump = sample_dump();
        let xml = encode(&dump).unwrap();
        let decoded = decode(&xml).unwrap();
        assert_eq!(decoded, dump);
    }

    #[test]
    fn test_encode_is_deterministic() {
        let dump = sample_dump();
        assert_eq!(encode(&dump).unwrap(), encode(&dump.clone()).unwrap());
    }

    #[test]
    fn test_reencode_is_stable() {
        let xml = encode(&sample_dump()).unwrap();
        let again = encode(&decode(&xml).unwrap()).unwrap();
        assert_eq!(xml, again);
    }

    #[test]
    fn test_default_presence_survives() {
        let decoded = decode(&encode(&sample_dump()).unwrap()).unwrap();
        let structure = decoded.structures().next().unwrap();
        assert_eq!(structure.column("params").unwrap().default, None);
        assert_eq!(
            structure.column("name").unwrap().default.as_deref(),
            Some("")
        );
    }

    #[test]
    fn test_null_and_empty_values_stay_distinct() {
        let decoded = decode(&encode(&sample_dump()).unwrap()).unwrap();
        let row = &decoded.data().next().unwrap().rows[1];
        assert_eq!(row.get("name").unwrap().value.as_deref(), Some(""));
        assert_eq!(row.get("params").unwrap().value, None);
        assert_eq!(row.get("state").unwrap().value.as_deref(), Some("  padded  "));
    }

    #[test]
    fn test_decoded_dump_serializes_to_json() -> anyhow::Result<()> {
        let decoded = decode(&encode(&sample_dump())?)?;
        let json = serde_json::to_string(&decoded)?;
        let back: Dump = serde_json::from_str(&json)?;
        assert_eq!(back, decoded);
        Ok(())
    }

    #[test]
    fn test_empty_database() {
        let dump = Dump::default();
        assert_eq!(decode(&encode(&dump).unwrap()).unwrap(), dump);
    }
}

mod escaping_tests {
    use super::*;

    #[test]
    fn test_comment_is_escaped_in_document() {
        let xml = encode(&sample_dump()).unwrap();
        assert!(xml.contains("Shown as &lt;name&gt; &amp; &quot;nick&quot;"));
        assert!(!xml.contains("<name>"));
        assert!(xml.contains("Tom &amp; Jerry &lt;cartoon&gt;"));
    }

    #[test]
    fn test_comment_is_unescaped_once() {
        let decoded = decode(&encode(&sample_dump()).unwrap()).unwrap();
        let structure = decoded.structures().next().unwrap();
        assert_eq!(
            structure.column("name").unwrap().comment,
            "Shown as <name> & \"nick\" in the 'list'"
        );
    }

    #[test]
    fn test_escaped_looking_text_is_not_unescaped_twice() {
        let dump = Dump::new(vec![TableEntry::Data(TableData::new(
            "#__t",
            vec![Row::new().with("a", Some("&amp; is how you write &"))],
        ))]);
        let decoded = decode(&encode(&dump).unwrap()).unwrap();
        assert_eq!(decoded, dump);
    }
}

mod malformed_tests {
    use super::*;

    #[test]
    fn test_missing_database() {
        let xml = "<?xml version=\"1.0\"?>\n<mysqldump xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">\n</mysqldump>\n";
        assert!(matches!(decode(xml), Err(ImportError::MalformedDocument(_))));
    }

    #[test]
    fn test_truncated_document() {
        let xml = encode(&sample_dump()).unwrap();
        let truncated = &xml[..xml.len() / 2];
        assert!(matches!(
            decode(truncated),
            Err(ImportError::MalformedDocument(_))
        ));
    }

    #[test]
    fn test_error_message_names_the_problem() {
        let err = decode("<dump></dump>").unwrap_err();
        assert!(err.to_string().contains("database"));
    }
}
