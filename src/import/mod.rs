//! Import functionality
//!
//! Decodes the intermediate XML dump back into the document model.

pub mod xml;

/// Error during import
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Malformed document: {0}")]
    MalformedDocument(String),
}

// Re-export for convenience
pub use xml::decode;
