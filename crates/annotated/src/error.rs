use serde::Serialize;
use thiserror::Error;

/// Result type for annotated-stream operations
pub type Result<T> = std::result::Result<T, AnnotateError>;

/// Errors that stop a parse before it starts
#[derive(Error, Debug)]
pub enum AnnotateError {
    /// Invalid parser configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error while reading the annotated stream
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AnnotateError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

/// Recoverable problems found while parsing or folding.
///
/// None of these abort a parse; they travel next to the best-effort result.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A trailing provenance comment whose entries could not be parsed.
    /// The line is kept, without provenance.
    #[error("Malformed provenance on line {line}: {comment}")]
    MalformedProvenance { line: usize, comment: String },

    /// Braces left unmatched after folding.
    #[error("Unbalanced braces: {unmatched_open} unmatched opening, {unmatched_close} unmatched closing")]
    UnbalancedBraces {
        unmatched_open: usize,
        unmatched_close: usize,
    },
}

impl Diagnostic {
    /// Line the diagnostic points at, if it is tied to a single line
    #[must_use]
    pub const fn line(&self) -> Option<usize> {
        match self {
            Self::MalformedProvenance { line, .. } => Some(*line),
            Self::UnbalancedBraces { .. } => None,
        }
    }
}
