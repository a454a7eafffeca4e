/// Errors that can occur while signalling notification dispatch.
///
/// # Examples
///
/// ```rust
/// use fleetwatch_notify::error::NotifyError;
///
/// let err = NotifyError::Status {
///     status: 503,
///     body: "busy".to_string(),
/// };
/// assert!(err.to_string().contains("503"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Building the client or sending the request failed.
    #[error("Notify: HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("Notify: endpoint returned status={status}, body={body}")]
    Status { status: u16, body: String },

    #[error("Notify: {0}")]
    Other(String),
}

/// Convenience `Result` alias for notification operations.
pub type Result<T> = std::result::Result<T, NotifyError>;
