use std::path::PathBuf;

use fwpub_types::TypeError;

/// Errors reading firmware metadata.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The source file could not be read.
    #[error("cannot read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required constant is not declared.
    #[error("constant `{name}` not found in {path}")]
    MissingConstant { name: &'static str, path: PathBuf },

    /// A constant is declared but its value is unusable.
    #[error("invalid firmware metadata in {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: TypeError,
    },
}

/// Result alias for metadata reading.
pub type SourceResult<T> = Result<T, SourceError>;
