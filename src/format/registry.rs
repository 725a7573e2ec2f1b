//! Registry of dialect formatters
//!
//! Formatters are looked up by identifier instead of by type, so callers can
//! pick a dialect from configuration. The registry is built explicitly and
//! passed around; there is no global instance.

use std::collections::BTreeMap;

use tracing::debug;

use crate::format::generic::GenericFormatter;
use crate::format::mysql::MySqlFormatter;
use crate::format::postgresql::PostgreSqlFormatter;
use crate::format::{FormatError, FormatOptions, SqlFormatter};

/// Builds a formatter from the caller's options
pub type FormatterFactory = fn(&FormatOptions) -> Box<dyn SqlFormatter>;

/// Identifier to factory mapping
///
/// # Example
///
/// ```rust
/// use xml2sql::format::{FormatOptions, FormatterRegistry};
///
/// let registry = FormatterRegistry::with_builtins();
/// let formatter = registry.create("postgres", &FormatOptions::default()).unwrap();
/// assert_eq!(formatter.name(), "postgresql");
/// assert!(registry.create("doesnotexist", &FormatOptions::default()).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FormatterRegistry {
    factories: BTreeMap<String, FormatterFactory>,
    aliases: BTreeMap<String, String>,
}

impl FormatterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the generic, MySQL and PostgreSQL formatters
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        registry.register("generic", |options| Box::new(GenericFormatter::new(options)));
        registry.register("mysql", |options| Box::new(MySqlFormatter::new(options)));
        registry.register("postgresql", |options| {
            Box::new(PostgreSqlFormatter::new(options))
        });

        registry.alias("sql", "generic");
        registry.alias("mysqli", "mysql");
        registry.alias("postgres", "postgresql");

        registry
    }

    /// Register a factory, replacing any previous one under the same name
    pub fn register(&mut self, name: impl Into<String>, factory: FormatterFactory) {
        let name = name.into().to_ascii_lowercase();
        debug!(format = %name, "Registering formatter");
        self.aliases.remove(&name);
        self.factories.insert(name, factory);
    }

    /// Make `alias` resolve to the formatter registered as `target`
    pub fn alias(&mut self, alias: impl Into<String>, target: impl Into<String>) {
        self.aliases
            .insert(alias.into().to_ascii_lowercase(), target.into().to_ascii_lowercase());
    }

    /// Whether `name` resolves to a formatter
    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Build the formatter registered as `name` (case-insensitive)
    pub fn create(
        &self,
        name: &str,
        options: &FormatOptions,
    ) -> Result<Box<dyn SqlFormatter>, FormatError> {
        let factory = self
            .resolve(name)
            .ok_or_else(|| FormatError::UnknownFormat(name.to_string()))?;
        Ok(factory(options))
    }

    /// Registered identifiers in sorted order, aliases excluded
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    fn resolve(&self, name: &str) -> Option<FormatterFactory> {
        let name = name.trim().to_ascii_lowercase();
        let target = self.aliases.get(&name).unwrap_or(&name);
        self.factories.get(target).copied()
    }
}
