use alertdesk_common::types::AlertLevel;
use alertdesk_storage::StorageError;

/// Errors raised by the query engine and lifecycle operations.
///
/// Validation always fails before anything is written to the store.
///
/// # Examples
///
/// ```
/// use alertdesk_alert::AlertError;
///
/// let err = AlertError::NotFound { id: "42".into() };
/// assert_eq!(err.to_string(), "alert not found: 42");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    /// Blank or missing required input, unparseable level / status / time,
    /// or an inverted time range.
    #[error("{0}")]
    Validation(String),

    #[error("alert not found: {id}")]
    NotFound { id: String },

    /// Escalation requested on an alert already at the top of the ladder.
    #[error("alert {id} is already at the maximum level {level}")]
    AlreadyAtMaximum { id: String, level: AlertLevel },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AlertError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AlertError::Validation(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AlertError>;
