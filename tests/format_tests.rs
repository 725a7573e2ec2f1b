//! Formatter tests
//!
//! Generated SQL is also run through sqlparser in the matching dialect.

use sqlparser::dialect::{GenericDialect, MySqlDialect, PostgreSqlDialect};
use sqlparser::parser::Parser;
use xml2sql::format::{FormatError, FormatOptions, FormatterRegistry, SqlFormatter};
use xml2sql::models::{
    ColumnDescriptor, KeyDescriptor, Row, TableData, TableStructure, generic_table_name,
};

fn formatter(name: &str, prefix: &str) -> Box<dyn SqlFormatter> {
    FormatterRegistry::with_builtins()
        .create(name, &FormatOptions::default().with_prefix(prefix))
        .unwrap()
}

fn people() -> TableStructure {
    TableStructure::new(
        "#__people",
        vec![
            ColumnDescriptor::new("id", "int(11)")
                .not_null()
                .with_key("PRI")
                .with_extra("auto_increment"),
            ColumnDescriptor::new("first_name", "varchar(100)")
                .not_null()
                .with_default(""),
            ColumnDescriptor::new("last_name", "varchar(100)")
                .not_null()
                .with_default(""),
            ColumnDescriptor::new("email", "varchar(255)").with_comment("Contact address"),
            ColumnDescriptor::new("created", "datetime")
                .not_null()
                .with_default("0000-00-00 00:00:00"),
        ],
    )
    .with_keys(vec![
        KeyDescriptor::new("#__people", "PRIMARY", 1, "id", false),
        KeyDescriptor::new("#__people", "idx_name", 2, "first_name", true),
        KeyDescriptor::new("#__people", "idx_name", 1, "last_name", true),
        KeyDescriptor::new("#__people", "idx_email", 1, "email", false),
    ])
}

fn people_data() -> TableData {
    TableData::new(
        "#__people",
        vec![
            Row::new()
                .with("id", Some("1"))
                .with("first_name", Some("Ann"))
                .with("last_name", Some("O'Neil"))
                .with("email", Some("ann@example.org"))
                .with("created", Some("2011-03-01 10:00:00")),
            Row::new()
                .with("id", Some("2"))
                .with("first_name", Some("Bob"))
                .with("last_name", Some("Back\\slash"))
                .with("email", None)
                .with("created", Some("2011-03-02 10:00:00")),
        ],
    )
}

mod generic_tests {
    use super::*;

    #[test]
    fn test_prefix_substitution() {
        let name = generic_table_name("xxxxx_users", "xxxxx_");
        assert_eq!(name, "#__users");

        let table = TableStructure::new(name, vec![ColumnDescriptor::new("id", "int(11)")]);
        let sql = formatter("generic", "jos_").format_create(&table).unwrap();
        assert!(sql.starts_with("CREATE TABLE jos_users ("));
    }

    #[test]
    fn test_composite_key_keeps_sequence_order() {
        let sql = formatter("generic", "jos_").format_create(&people()).unwrap();
        assert!(sql.contains("CREATE INDEX jos_people_idx_name ON jos_people (last_name, first_name);"));
        assert_eq!(sql.matches("idx_name").count(), 1);
    }

    #[test]
    fn test_constraints() {
        let sql = formatter("generic", "jos_").format_create(&people()).unwrap();
        assert!(sql.contains("id INTEGER NOT NULL GENERATED BY DEFAULT AS IDENTITY"));
        assert!(sql.contains("PRIMARY KEY (id)"));
        assert!(sql.contains("CONSTRAINT jos_people_idx_email UNIQUE (email)"));
        assert!(sql.contains("created TIMESTAMP NOT NULL DEFAULT '1970-01-01 00:00:00'"));
        assert!(sql.contains("COMMENT ON COLUMN jos_people.email IS 'Contact address';"));
    }

    #[test]
    fn test_output_parses() {
        let generic = formatter("generic", "jos_");
        let mut table = people();
        for column in &mut table.columns {
            column.comment.clear();
        }
        let create = generic.format_create(&table).unwrap();
        let statements = Parser::parse_sql(&GenericDialect {}, &create).unwrap();
        assert_eq!(statements.len(), 2);

        let insert = generic.format_insert(&people_data()).unwrap();
        let statements = Parser::parse_sql(&GenericDialect {}, &insert).unwrap();
        assert_eq!(statements.len(), 2);
    }

    #[test]
    fn test_null_literal() {
        let insert = formatter("generic", "jos_")
            .format_insert(&people_data())
            .unwrap();
        let second = insert.lines().nth(1).unwrap();
        assert!(second.contains("'Back\\slash', NULL,"));
        assert!(!second.contains("''"));
    }
}

mod mysql_tests {
    use super::*;

    #[test]
    fn test_create() {
        let sql = formatter("mysql", "jos_").format_create(&people()).unwrap();
        assert!(sql.contains("`id` int(11) NOT NULL AUTO_INCREMENT"));
        assert!(sql.contains("`created` datetime NOT NULL DEFAULT '0000-00-00 00:00:00'"));
        assert!(sql.contains("PRIMARY KEY (`id`)"));
        assert!(sql.contains("KEY `idx_name` (`last_name`, `first_name`)"));
        assert!(sql.contains("UNIQUE KEY `idx_email` (`email`)"));
        assert!(sql.contains("`email` varchar(255) COMMENT 'Contact address'"));
    }

    #[test]
    fn test_escapes_backslashes_and_quotes() {
        let insert = formatter("mysql", "jos_")
            .format_insert(&people_data())
            .unwrap();
        assert!(insert.contains("'O\\'Neil'"));
        assert!(insert.contains("'Back\\\\slash'"));
    }

    #[test]
    fn test_output_parses() {
        let mysql = formatter("mysql", "jos_");
        let create = mysql.format_create(&people()).unwrap();
        let insert = mysql.format_insert(&people_data()).unwrap();
        let truncate = mysql.format_truncate(&people()).unwrap();

        let script = format!("{}{}{}", create, insert, truncate);
        let statements = Parser::parse_sql(&MySqlDialect {}, &script).unwrap();
        assert_eq!(statements.len(), 4);
    }

    #[test]
    fn test_generated_and_bit_defaults() {
        let table = TableStructure::new(
            "#__flags",
            vec![
                ColumnDescriptor::new("uid", "varchar(36)")
                    .not_null()
                    .with_default("uuid()")
                    .with_extra("DEFAULT_GENERATED"),
                ColumnDescriptor::new("flag", "bit(1)")
                    .not_null()
                    .with_default("b'0'"),
            ],
        );
        let sql = formatter("mysql", "jos_").format_create(&table).unwrap();
        assert!(sql.contains("`uid` varchar(36) NOT NULL DEFAULT (uuid())"));
        assert!(sql.contains("`flag` bit(1) NOT NULL DEFAULT b'0'"));

        for dialect in ["generic", "postgresql"] {
            assert!(matches!(
                formatter(dialect, "jos_").format_create(&table),
                Err(FormatError::UnsupportedConstruct(_))
            ));
        }
    }
}

mod postgresql_tests {
    use super::*;

    #[test]
    fn test_create() {
        let sql = formatter("postgresql", "jos_").format_create(&people()).unwrap();
        assert!(sql.contains("\"id\" serial NOT NULL"));
        assert!(sql.contains("PRIMARY KEY (\"id\")"));
        assert!(sql.contains(
            "CREATE INDEX \"jos_people_idx_name\" ON \"jos_people\" (\"last_name\", \"first_name\");"
        ));
        assert!(sql.contains(
            "CREATE UNIQUE INDEX \"jos_people_idx_email\" ON \"jos_people\" (\"email\");"
        ));
    }

    #[test]
    fn test_rejects_fulltext() {
        let table = people().with_keys(vec![
            KeyDescriptor::new("#__people", "idx_search", 1, "email", true)
                .with_index_type("FULLTEXT"),
        ]);
        let result = formatter("postgresql", "jos_").format_create(&table);
        assert!(matches!(result, Err(FormatError::UnsupportedConstruct(_))));
    }

    #[test]
    fn test_output_parses() {
        let postgres = formatter("postgresql", "jos_");
        let create = postgres.format_create(&people()).unwrap();
        let insert = postgres.format_insert(&people_data()).unwrap();

        let script = format!("{}{}", create, insert);
        let statements = Parser::parse_sql(&PostgreSqlDialect {}, &script).unwrap();
        // table, two indexes, one column comment, two rows
        assert_eq!(statements.len(), 6);
    }

    #[test]
    fn test_sequence_reset_and_empty_row_parse() {
        let postgres = formatter("postgresql", "jos_");
        let data = TableData::new(
            "#__people",
            vec![Row::new(), Row::new().with("id", Some("5"))],
        );
        let insert = postgres.format_insert(&data).unwrap();
        assert!(insert.starts_with("INSERT INTO \"jos_people\" DEFAULT VALUES;\n"));

        let reset = postgres.format_sequence_reset(&people(), &data).unwrap();
        let script = format!("{}{}", insert, reset);
        let statements = Parser::parse_sql(&PostgreSqlDialect {}, &script).unwrap();
        assert_eq!(statements.len(), 3);
    }

    #[test]
    fn test_timestamp_precision_default_parses() {
        let table = TableStructure::new(
            "#__log",
            vec![
                ColumnDescriptor::new("created", "datetime(6)")
                    .not_null()
                    .with_default("CURRENT_TIMESTAMP(6)"),
            ],
        );
        let create = formatter("postgresql", "jos_").format_create(&table).unwrap();
        assert!(create.contains("DEFAULT CURRENT_TIMESTAMP(6)"));
        Parser::parse_sql(&PostgreSqlDialect {}, &create).unwrap();
    }
}

mod registry_tests {
    use super::*;

    #[test]
    fn test_unknown_format() {
        let result = FormatterRegistry::with_builtins()
            .create("doesnotexist", &FormatOptions::default());
        assert!(matches!(result, Err(FormatError::UnknownFormat(_))));
    }

    #[test]
    fn test_default_prefix_placeholder() {
        let sql = FormatterRegistry::with_builtins()
            .create("generic", &FormatOptions::default())
            .unwrap()
            .format_truncate(&people())
            .unwrap();
        assert_eq!(sql, "DELETE FROM xxxxx_people;\n");
    }
}
