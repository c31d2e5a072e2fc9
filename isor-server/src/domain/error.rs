//! Domain error types.
//!
//! These errors represent validation failures of user-supplied identifiers
//! and local reference data. They are distinct from portal/IO errors.

/// Domain-level errors.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// Locomotive number does not follow any accepted spelling
    #[error("invalid locomotive number '{input}': {reason}")]
    InvalidLocoNumber { input: String, reason: &'static str },

    /// Paint scheme file could not be read
    #[error("failed to read paint schemes from {path}: {source}")]
    PaintSchemesIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Paint scheme file is not a `{ color: [numbers] }` object
    #[error("invalid paint schemes file {path}: {source}")]
    PaintSchemesFormat {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
