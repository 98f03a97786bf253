//! Store error types.

use std::path::PathBuf;

use ra_schema::SchemaError;
use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors from configuration store operations.
///
/// Every mutating path either fully commits both map and disk, or commits
/// neither; no variant here leaves the two inconsistent.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Validation(#[from] SchemaError),

    #[error("configuration \"{name}\" already exists; request overwrite to replace it")]
    Conflict { name: String },

    #[error("configuration \"{name}\" not found")]
    NotFound { name: String },

    #[error("persistence failure at {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Stable numeric code for this error kind.
    /// The boundary layer maps these to distinct statuses; validation,
    /// conflict, and malformed-request errors are client-caused,
    /// persistence errors are server-caused.
    pub fn code(&self) -> u32 {
        match self {
            StoreError::Validation(_) => 10,
            StoreError::MalformedRequest(_) => 11,
            StoreError::Conflict { .. } => 12,
            StoreError::NotFound { .. } => 13,
            StoreError::Persistence { .. } => 14,
            StoreError::Json(_) => 15,
        }
    }

    /// Whether the caller, not the store, caused this error.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            StoreError::Validation(_)
                | StoreError::MalformedRequest(_)
                | StoreError::Conflict { .. }
                | StoreError::NotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let errors = [
            StoreError::Validation(SchemaError::malformed("x")),
            StoreError::MalformedRequest("x".into()),
            StoreError::Conflict { name: "a".into() },
            StoreError::NotFound { name: "a".into() },
            StoreError::Persistence {
                path: PathBuf::from("/x"),
                source: std::io::Error::other("boom"),
            },
        ];
        let mut codes: Vec<u32> = errors.iter().map(StoreError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn client_vs_server_classification() {
        assert!(StoreError::Conflict { name: "a".into() }.is_client_error());
        assert!(StoreError::NotFound { name: "a".into() }.is_client_error());
        assert!(!StoreError::Persistence {
            path: PathBuf::from("/x"),
            source: std::io::Error::other("boom"),
        }
        .is_client_error());
    }
}
