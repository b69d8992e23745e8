use std::path::PathBuf;

use fwpub_exec::ExecError;

/// Errors from the build step.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The output directory could not be created or scanned.
    #[error("build directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The compiler could not be started.
    #[error("compiler could not be started: {0}")]
    Compiler(#[from] ExecError),

    /// The compiler ran and reported failure.
    #[error("compilation failed ({status})")]
    CompileFailed { status: String },

    /// No firmware image in the output directory.
    #[error("no firmware image (*.bin) found in {0}")]
    NoArtifact(PathBuf),

    /// More than one candidate image; refusing to guess.
    #[error("ambiguous build output in {dir}: {}", names.join(", "))]
    AmbiguousArtifact { dir: PathBuf, names: Vec<String> },

    /// The chosen image could not be read.
    #[error("cannot read artifact {path}: {source}")]
    ArtifactUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result alias for build operations.
pub type BuildResult<T> = Result<T, BuildError>;
