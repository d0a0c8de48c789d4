use thiserror::Error;

/// Convenience result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;

/// Error type returned by decoding, matching, and remapping functions.
///
/// This is a single error enum shared across CSV (and optional Excel) decoding and the
/// mapping/remap pipeline. Per-cell coercion failures are *not* errors; they surface as
/// [`crate::types::Value::Invalid`] so one bad cell never aborts a batch.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV decoding error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "excel")]
    /// Excel decoding error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// The file could not be decoded into a table (empty input, no header row,
    /// unrecognized extension, unsupported format).
    #[error("decode error: {message}")]
    Decode { message: String },

    /// The registry is misconfigured (duplicate entity, duplicate alias, no required fields).
    #[error("invalid registry: {message}")]
    InvalidRegistry { message: String },

    /// A mapping referenced an entity type the registry does not know.
    #[error("unknown entity type '{entity}'")]
    UnknownEntity { entity: String },

    /// A mapping assigned a header to a field the target schema does not declare.
    #[error("entity '{entity}' has no field '{field}'")]
    UnknownField { entity: String, field: String },

    /// Two or more headers in a finalized mapping target the same field.
    ///
    /// Remap must refuse to run rather than silently keep the last-assigned value.
    #[error("mapping collision: headers {headers:?} all map to field '{field}'")]
    MappingCollision { field: String, headers: Vec<String> },

    /// `resolve_pending`/`cancel_pending` was called with no mapping request outstanding.
    #[error("no pending mapping request")]
    NoPendingMapping,
}
