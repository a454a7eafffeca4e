/// Errors that can occur within the storage layer.
///
/// # Examples
///
/// ```rust
/// use fleetwatch_storage::error::StorageError;
///
/// let err = StorageError::NotFound {
///     entity: "alert",
///     id: "alert-99".to_string(),
/// };
/// assert!(err.to_string().contains("alert-99"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A required record was not found in the database.
    #[error("Storage: {entity} not found (id={id})")]
    NotFound { entity: &'static str, id: String },

    /// Connection, query or migration failure reported by SeaORM.
    #[error("Storage: database error: {0}")]
    Db(#[from] sea_orm::DbErr),

    /// The `labels` column could not be encoded or decoded.
    #[error("Storage: JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A text column held a token that does not map to a known enum value.
    #[error("Storage: unexpected value '{value}' in column '{column}'")]
    UnexpectedValue { column: &'static str, value: String },

    /// Generic storage error for cases not covered by other variants.
    #[error("Storage: {0}")]
    Other(String),
}

/// Convenience `Result` alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Parse a stored enum token, reporting the offending column on failure.
pub(crate) fn parse_column<T: std::str::FromStr>(column: &'static str, value: &str) -> Result<T> {
    value.parse().map_err(|_| StorageError::UnexpectedValue {
        column,
        value: value.to_string(),
    })
}
