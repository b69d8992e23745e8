use fwpub_build::BuildError;
use fwpub_publish::PublishError;
use fwpub_source::SourceError;

/// Fatal errors of a release run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Required tools are not installed.
    #[error("missing required tools: {}", .0.join(", "))]
    ToolMissing(Vec<String>),

    /// Firmware metadata could not be read.
    #[error("cannot read firmware info: {0}")]
    Parse(#[from] SourceError),

    /// The firmware did not build.
    #[error("build failed: {0}")]
    Build(#[from] BuildError),

    /// No backend delivered the image.
    #[error("upload failed: {0}")]
    Upload(#[from] PublishError),

    /// The confirmation prompt could not be read.
    #[error("cannot read confirmation: {0}")]
    Prompt(#[source] std::io::Error),
}

/// Result alias for release runs.
pub type PipelineResult<T> = Result<T, PipelineError>;
