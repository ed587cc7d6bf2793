use thiserror::Error;

/// Errors reported by the schedule engine and its edges.
#[derive(Debug, Error)]
pub enum LoanError {
    /// A request field is missing, malformed or out of range.
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// Writing an exported schedule failed.
    #[error("Export error: {0}")]
    Export(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl LoanError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        LoanError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for LoanError {
    fn from(e: serde_json::Error) -> Self {
        LoanError::Serialization(e.to_string())
    }
}

impl From<csv::Error> for LoanError {
    fn from(e: csv::Error) -> Self {
        LoanError::Export(e.to_string())
    }
}

impl From<std::io::Error> for LoanError {
    fn from(e: std::io::Error) -> Self {
        LoanError::Export(e.to_string())
    }
}
