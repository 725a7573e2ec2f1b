//! Conversion configuration
//!
//! Settings a caller would otherwise pass by hand: target format, live table
//! prefix, script mode and the export toggles. Loadable from TOML:
//!
//! ```toml
//! format = "postgresql"
//! prefix = "jos_"
//! mode = "sample_data"
//! with_data = true
//! tables = ["jos_users", "jos_content"]
//! ```

use serde::{Deserialize, Serialize};

use crate::convert::ConvertMode;
use crate::export::{ExportError, Exporter};
use crate::format::{DEFAULT_PREFIX, FormatOptions, FormatterRegistry};
use crate::source::SchemaSource;

/// Error loading a configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidInput(String),
}

/// Conversion settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Xml2SqlConfig {
    /// Formatter identifier
    pub format: String,
    /// Live table prefix for generated SQL
    pub prefix: String,
    /// Install or sample-data script
    pub mode: ConvertMode,
    /// Export table structure
    pub with_structure: bool,
    /// Export table rows
    pub with_data: bool,
    /// Tables to export (live names); empty selects every table
    pub tables: Vec<String>,
}

impl Default for Xml2SqlConfig {
    fn default() -> Self {
        Self {
            format: "mysql".to_string(),
            prefix: DEFAULT_PREFIX.to_string(),
            mode: ConvertMode::Install,
            with_structure: true,
            with_data: false,
            tables: Vec::new(),
        }
    }
}

impl Xml2SqlConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::InvalidInput(format!("Failed to parse TOML: {}", e)))?;
        if config.format.trim().is_empty() {
            return Err(ConfigError::InvalidInput("format must not be empty".to_string()));
        }
        if let Some(position) = config.tables.iter().position(|t| t.trim().is_empty()) {
            return Err(ConfigError::InvalidInput(format!(
                "Table name at position {} is empty",
                position
            )));
        }
        Ok(config)
    }

    /// Check the format against a registry
    pub fn validate(&self, registry: &FormatterRegistry) -> Result<(), ConfigError> {
        if !registry.contains(&self.format) {
            return Err(ConfigError::InvalidInput(format!(
                "Unknown format {:?}, expected one of: {}",
                self.format,
                registry.names().join(", ")
            )));
        }
        Ok(())
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_mode(mut self, mode: ConvertMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_structure(mut self, setting: bool) -> Self {
        self.with_structure = setting;
        self
    }

    pub fn with_data(mut self, setting: bool) -> Self {
        self.with_data = setting;
        self
    }

    pub fn with_tables(mut self, tables: Vec<String>) -> Self {
        self.tables = tables;
        self
    }

    /// Options handed to the formatter
    pub fn formatter_options(&self) -> FormatOptions {
        FormatOptions::default().with_prefix(self.prefix.clone())
    }

    /// Exporter bound to `source` with this configuration's toggles and tables
    pub fn exporter<'a>(&self, source: &'a dyn SchemaSource) -> Result<Exporter<'a>, ExportError> {
        let exporter = Exporter::new()
            .with_source(source)
            .with_structure(self.with_structure)
            .with_data(self.with_data);
        if self.tables.is_empty() {
            exporter.all_tables()
        } else {
            exporter.tables(self.tables.clone())
        }
    }
}
