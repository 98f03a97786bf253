//! Exit codes for the ra CLI.
//!
//! Exit codes communicate operation outcome without requiring output
//! parsing. Client-caused failures (validation, conflict, malformed input,
//! unknown name) and server-caused failures (persistence) get distinct
//! codes.

use ra_store::StoreError;

/// Exit codes for ra operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Operation completed.
    Ok = 0,

    /// Document failed schema validation.
    ValidationError = 10,

    /// Request body was not a JSON object / not parseable.
    MalformedRequest = 11,

    /// Name exists and overwrite was not requested.
    Conflict = 12,

    /// Name not present in the store.
    NotFound = 13,

    /// Disk write/remove failure.
    PersistenceError = 14,

    /// Internal/unknown error.
    InternalError = 99,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl From<&StoreError> for ExitCode {
    fn from(err: &StoreError) -> Self {
        match err {
            StoreError::Validation(_) => ExitCode::ValidationError,
            StoreError::MalformedRequest(_) => ExitCode::MalformedRequest,
            StoreError::Conflict { .. } => ExitCode::Conflict,
            StoreError::NotFound { .. } => ExitCode::NotFound,
            StoreError::Persistence { .. } => ExitCode::PersistenceError,
            StoreError::Json(_) => ExitCode::InternalError,
        }
    }
}
