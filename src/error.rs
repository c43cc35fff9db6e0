use thiserror::Error;

/// Errors surfaced by the translation safety pipeline for a single string.
///
/// These abort the enclosing string only; batch callers report them per entry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum XtError {
    #[error("Missing placeholder token in translation: {token}")]
    MissingPlaceholder { token: String },

    #[error("Too many placeholders in a single string (>= 9999).")]
    PlaceholderBudgetExceeded,

    #[error("Unsupported glossary mode: {0}")]
    UnsupportedMatchMode(String),

    #[error("Invalid chunk arguments: {0}")]
    InvalidChunkArgs(String),
}

pub type Result<T> = std::result::Result<T, XtError>;
