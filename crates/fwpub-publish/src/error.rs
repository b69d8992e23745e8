use std::path::PathBuf;

use fwpub_cloud::CloudError;
use fwpub_exec::ExecError;

use crate::publisher::AttemptRecord;

/// Errors from publishing an artifact.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// A backend's command-line tool is not installed.
    #[error("{0} is not installed")]
    ToolUnavailable(&'static str),

    /// An external command failed to start or exited unsuccessfully.
    #[error(transparent)]
    Command(#[from] ExecError),

    /// A storage service call failed.
    #[error(transparent)]
    Cloud(#[from] CloudError),

    /// The renamed release copy could not be written.
    #[error("cannot stage {path}: {source}")]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The operator could not be asked for a URL.
    #[error("cannot read operator input: {0}")]
    Prompt(#[source] std::io::Error),

    /// Every backend failed.
    #[error("all publish backends failed: {}", summarize(.attempts))]
    Exhausted { attempts: Vec<AttemptRecord> },
}

fn summarize(attempts: &[AttemptRecord]) -> String {
    if attempts.is_empty() {
        return "no backends configured".to_string();
    }
    attempts
        .iter()
        .map(|a| format!("{} ({})", a.name, a.error.as_deref().unwrap_or("ok")))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result alias for publishing.
pub type PublishResult<T> = Result<T, PublishError>;
