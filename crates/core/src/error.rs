use thiserror::Error;

/// Error types for report building and working-day conversion
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// Error for malformed input such as an inverted header range
    #[error("{message}")]
    InvalidArgument { message: String },

    /// Error when a custom holiday cannot be parsed
    #[error("Invalid custom holiday '{value}': expected YYYY-MM-DD or MM-DD")]
    InvalidHoliday { value: String },
}

impl ReportError {
    /// Shorthand for an `InvalidArgument` error with the given message.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        ReportError::InvalidArgument {
            message: message.into(),
        }
    }
}

/// Result type alias for report operations
pub type ReportResult<T> = Result<T, ReportError>;
