//! MySQL column type strings
//!
//! Parses the `Type` column of `SHOW COLUMNS` (`int(11) unsigned`,
//! `enum('a','b')`, `decimal(10,2)`) so other dialects can map it.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::format::{FormatError, unsupported};

static TYPE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*([a-z][a-z0-9 ]*?)\s*(?:\((.*)\))?((?:\s+(?:unsigned|signed|zerofill))*)\s*$",
    )
    .expect("Invalid type pattern")
});

/// A parsed MySQL column type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MySqlType {
    /// Lower-case base name, e.g. `int` or `double precision`
    pub base: String,
    /// Raw text between the parentheses
    pub arguments: Option<String>,
    pub unsigned: bool,
}

impl MySqlType {
    pub fn parse(raw: &str) -> Result<Self, FormatError> {
        let captures = TYPE_PATTERN
            .captures(raw)
            .ok_or_else(|| unsupported(format!("Cannot parse column type {:?}", raw)))?;

        let base = captures
            .get(1)
            .map(|m| m.as_str().split_whitespace().collect::<Vec<_>>().join(" "))
            .unwrap_or_default()
            .to_ascii_lowercase();
        let arguments = captures.get(2).map(|m| m.as_str().trim().to_string());
        let unsigned = captures
            .get(3)
            .is_some_and(|m| m.as_str().to_ascii_lowercase().contains("unsigned"));

        Ok(Self {
            base,
            arguments,
            unsigned,
        })
    }

    /// Numeric arguments, e.g. `[10, 2]` for `decimal(10,2)`
    pub fn numbers(&self) -> Vec<u32> {
        self.arguments
            .as_deref()
            .map(|args| {
                args.split(',')
                    .filter_map(|n| n.trim().parse::<u32>().ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// First numeric argument: length, display width or precision
    pub fn length(&self) -> Option<u32> {
        self.numbers().first().copied()
    }

    /// Values of an `enum(...)` or `set(...)` type, unquoted
    pub fn values(&self) -> Result<Vec<String>, FormatError> {
        let Some(arguments) = self.arguments.as_deref() else {
            return Ok(Vec::new());
        };

        let mut values = Vec::new();
        let mut chars = arguments.chars().peekable();
        loop {
            while chars.next_if(|c| c.is_whitespace()).is_some() {}
            if chars.next() != Some('\'') {
                return Err(unsupported(format!("Invalid value list ({})", arguments)));
            }

            let mut value = String::new();
            loop {
                match chars.next() {
                    Some('\'') if chars.next_if_eq(&'\'').is_some() => value.push('\''),
                    Some('\'') => break,
                    Some('\\') => match chars.next() {
                        Some(escaped) => value.push(escaped),
                        None => {
                            return Err(unsupported(format!(
                                "Invalid value list ({})",
                                arguments
                            )));
                        }
                    },
                    Some(c) => value.push(c),
                    None => {
                        return Err(unsupported(format!("Invalid value list ({})", arguments)));
                    }
                }
            }
            values.push(value);

            while chars.next_if(|c| c.is_whitespace()).is_some() {}
            match chars.next() {
                Some(',') => continue,
                None => break,
                Some(_) => {
                    return Err(unsupported(format!("Invalid value list ({})", arguments)));
                }
            }
        }
        Ok(values)
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self.base.as_str(),
            "tinyint" | "smallint" | "mediumint" | "int" | "integer" | "bigint"
        )
    }

    pub fn is_spatial(&self) -> bool {
        matches!(
            self.base.as_str(),
            "geometry"
                | "point"
                | "linestring"
                | "polygon"
                | "multipoint"
                | "multilinestring"
                | "multipolygon"
                | "geometrycollection"
                | "geomcollection"
        )
    }

    pub fn is_temporal(&self) -> bool {
        matches!(
            self.base.as_str(),
            "date" | "time" | "datetime" | "timestamp" | "year"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_types() {
        let ty = MySqlType::parse("int(11)").unwrap();
        assert_eq!(ty.base, "int");
        assert_eq!(ty.length(), Some(11));
        assert!(!ty.unsigned);

        let ty = MySqlType::parse("int(10) unsigned").unwrap();
        assert!(ty.unsigned);

        let ty = MySqlType::parse("mediumtext").unwrap();
        assert_eq!(ty.base, "mediumtext");
        assert_eq!(ty.arguments, None);

        let ty = MySqlType::parse("double precision unsigned zerofill").unwrap();
        assert_eq!(ty.base, "double precision");
        assert!(ty.unsigned);
    }

    #[test]
    fn test_parse_decimal() {
        let ty = MySqlType::parse("decimal(10,2)").unwrap();
        assert_eq!(ty.numbers(), vec![10, 2]);
    }

    #[test]
    fn test_enum_values() {
        let ty = MySqlType::parse("enum('banner','it''s','a,b')").unwrap();
        assert_eq!(ty.base, "enum");
        assert_eq!(ty.values().unwrap(), vec!["banner", "it's", "a,b"]);
    }

    #[test]
    fn test_invalid_types() {
        assert!(MySqlType::parse("").is_err());
        assert!(MySqlType::parse("int(11").is_err());
        assert!(MySqlType::parse("enum(banner)").unwrap().values().is_err());
    }
}
