//! Error types for sop-audit
//!
//! Only conditions that make a whole operation meaningless are raised here.
//! Row-level defects, numeric coercion and single lookup failures are
//! absorbed where they happen and only logged.

use thiserror::Error;

/// Audit error type
#[derive(Debug, Error)]
pub enum AuditError {
    /// Input has no header plus data row
    #[error("CSV must have at least a header and one data row")]
    EmptyFile,

    /// One or more required header columns are absent
    #[error(
        "Missing required columns: {}. Found columns: {}",
        .missing.join(", "),
        .found.join(", ")
    )]
    MissingColumns {
        missing: Vec<String>,
        found: Vec<String>,
    },

    /// Every data row was dropped during filtering
    #[error("No valid data rows found. Please ensure your CSV has URL and Title columns with data.")]
    NoValidRows,

    /// Rejected analysis parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Cache file (de)serialization error
    #[error("Cache error: {0}")]
    Cache(#[from] serde_json::Error),
}

impl AuditError {
    /// Names of the missing columns, if this is a [`AuditError::MissingColumns`]
    pub fn missing_columns(&self) -> Option<&[String]> {
        match self {
            AuditError::MissingColumns { missing, .. } => Some(missing),
            _ => None,
        }
    }
}

/// Result type for audit operations
pub type AuditResult<T> = Result<T, AuditError>;
