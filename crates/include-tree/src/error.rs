use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IncludeTreeError>;

#[derive(Error, Debug)]
pub enum IncludeTreeError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {0}")]
    NotFound(String),
}

/// Problems met while resolving; the tree is still returned
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IncludeDiagnostic {
    /// `file` is already on the resolution path; the branch is cut there
    #[error("Cyclic include of {file} from {includer}")]
    CyclicInclude { includer: String, file: String },

    /// No search directory holds the requested file
    #[error("Cannot resolve include \"{requested}\" from {includer}")]
    UnresolvableInclude { includer: String, requested: String },

    /// The file was found but could not be read
    #[error("Cannot read {file}: {message}")]
    UnreadableFile { file: String, message: String },
}
