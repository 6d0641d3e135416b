use thiserror::Error;

/// Contract violations raised synchronously by the mention core.
///
/// None of these are transient; a provider that fails or returns nothing is
/// reported through the no-match path instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MentionError {
    /// Invalid or missing configuration (lookup, collections, values).
    #[error("configuration error: {0}")]
    Configuration(String),
    /// The operation is not supported by the target (e.g. appending to a provider).
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    /// The operation needs an open mention and none is open.
    #[error("invalid state: {0}")]
    State(String),
    /// A required argument was missing or out of range.
    #[error("invalid argument: {0}")]
    Argument(String),
}

pub type Result<T, E = MentionError> = std::result::Result<T, E>;
