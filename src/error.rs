//! Error types for record store operations

use thiserror::Error;

/// Errors that can occur while building or executing record statements
#[derive(Debug, Error)]
pub enum StoreError {
    /// The caller asked for something that can never produce a statement,
    /// such as an update with no fields.
    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Turn a unique-index violation into a `Conflict`, passing every other
    /// database error through unchanged.
    pub fn from_insert_error(err: sqlx::Error, msg: impl Into<String>) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return Self::Conflict(msg.into());
            }
        }
        Self::Sql(err)
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            StoreError::usage("No data supplied for update").to_string(),
            "Usage error: No data supplied for update"
        );
        assert_eq!(
            StoreError::not_found("No job: Farmer").to_string(),
            "Not found: No job: Farmer"
        );
        assert_eq!(
            StoreError::conflict("Duplicate job").to_string(),
            "Conflict: Duplicate job"
        );
    }

    #[test]
    fn test_predicates() {
        assert!(StoreError::usage("x").is_usage());
        assert!(StoreError::not_found("x").is_not_found());
        assert!(StoreError::conflict("x").is_conflict());
        assert!(!StoreError::validation("x").is_conflict());
    }

    #[test]
    fn test_non_database_error_passes_through() {
        let err = StoreError::from_insert_error(sqlx::Error::RowNotFound, "dup");
        assert!(matches!(err, StoreError::Sql(sqlx::Error::RowNotFound)));
    }
}
