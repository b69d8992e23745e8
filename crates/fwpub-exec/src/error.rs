use std::path::PathBuf;

/// Errors from running external processes.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// The program could not be found or started.
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The requested working directory does not exist.
    #[error("working directory does not exist: {0}")]
    MissingWorkingDir(PathBuf),

    /// The process ran but exited unsuccessfully.
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
}

/// Result alias for process operations.
pub type ExecResult<T> = Result<T, ExecError>;
