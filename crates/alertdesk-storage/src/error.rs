/// Errors that can occur within the storage layer.
///
/// # Examples
///
/// ```rust
/// use alertdesk_storage::error::StorageError;
///
/// let err = StorageError::InvalidColumn {
///     column: "level",
///     value: "SEVERE".to_string(),
/// };
/// assert!(err.to_string().contains("level"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The database rejected a statement or could not be reached.
    #[error("Storage: database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem failure while preparing the data directory.
    #[error("Storage: I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored level or status no longer decodes into the canonical enums.
    #[error("Storage: unexpected value '{value}' in column '{column}'")]
    InvalidColumn { column: &'static str, value: String },
}

/// Convenience `Result` alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
