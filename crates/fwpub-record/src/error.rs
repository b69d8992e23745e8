use std::path::PathBuf;

/// Unexpected failures while updating the version record.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The directory the record script must run in does not exist.
    #[error("script directory does not exist: {0}")]
    MissingScriptDir(PathBuf),

    /// The temporary script could not be written.
    #[error("cannot write record script in {dir}: {source}")]
    ScriptFile {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The record could not be encoded for the script.
    #[error("cannot encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result alias for record updates.
pub type RecordResult<T> = Result<T, RecordError>;
