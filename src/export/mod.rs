//! Export functionality
//!
//! Reads table metadata and rows from a schema source and produces the
//! intermediate XML dump:
//! - Exporter: fluent configuration and the export walk
//! - xml: streaming dump writer and `encode`

pub mod exporter;
pub mod xml;

use crate::source::SourceError;

/// Error during export
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),
    #[error("Schema source error: {0}")]
    Source(#[from] SourceError),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("IO error: {0}")]
    IoError(String),
}

// Re-export for convenience
pub use exporter::{Exporter, TableSelection};
pub use xml::{DumpWriter, encode};
