//! Error taxonomy for wide-format generation.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while introspecting a survey database or assembling SQL.
#[derive(Debug, Error)]
pub enum WideFormatError {
    /// The database file could not be opened.
    #[error("failed to open survey database {}: {source}", path.display())]
    Connection {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// One or more of the expected input tables is absent.
    #[error("survey database is missing required tables: {}", missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },

    /// A field name cannot be expressed as a SQL identifier.
    #[error("invalid identifier {name:?}: {reason}")]
    InvalidIdentifier { name: String, reason: &'static str },

    /// The generated statement was rejected by SQLite.
    #[error("generated statement failed verification: {0}")]
    StatementInvalid(String),

    /// An output artifact could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The column manifest could not be serialized.
    #[error("failed to encode column manifest json: {0}")]
    ManifestEncoding(#[from] serde_json::Error),

    /// A metadata query failed.
    #[error("metadata query failed: {0}")]
    Query(#[from] rusqlite::Error),
}

impl WideFormatError {
    /// True for failures caused by the contents of the input database
    /// rather than by the runtime environment.
    #[must_use]
    pub fn is_input_schema_failure(&self) -> bool {
        matches!(
            self,
            Self::SchemaMismatch { .. } | Self::InvalidIdentifier { .. }
        )
    }
}

pub type WideFormatResult<T> = Result<T, WideFormatError>;
