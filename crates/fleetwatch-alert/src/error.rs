use fleetwatch_storage::StorageError;

/// Failure to obtain samples from the alerting backend. Fatal to the pass.
///
/// # Examples
///
/// ```rust
/// use fleetwatch_alert::error::SourceError;
///
/// let err = SourceError::Backend("rule evaluation disabled".to_string());
/// assert!(err.to_string().starts_with("Source:"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Transport failure or an undecodable response body.
    #[error("Source: HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Source: backend returned status={status}, body={body}")]
    Status { status: u16, body: String },

    /// The backend answered but reported an error of its own.
    #[error("Source: backend error: {0}")]
    Backend(String),
}

/// Errors that abort a reconciliation pass.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
