/// Errors from cloud service operations.
#[derive(Debug, thiserror::Error)]
pub enum CloudError {
    /// No usable credentials, or the credential file is malformed.
    #[error("credentials: {0}")]
    Credentials(String),

    /// The token endpoint refused the credentials.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The service answered with an error status.
    #[error("{operation} failed with HTTP {status}: {body}")]
    Http {
        operation: String,
        status: u16,
        body: String,
    },

    /// The request could not be sent or the response not read.
    #[error("{operation}: {source}")]
    Transport {
        operation: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body was not what the service documents.
    #[error("unexpected response from {operation}: {reason}")]
    Protocol { operation: String, reason: String },

    /// A local file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The in-memory backends were told to fail.
    #[error("injected failure: {0}")]
    Injected(String),
}

impl CloudError {
    /// The caller has no usable credentials. Retrying another operation with
    /// the same token provider will fail the same way.
    pub fn is_credentials(&self) -> bool {
        matches!(self, Self::Credentials(_) | Self::Auth(_))
    }

    pub(crate) fn transport(operation: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            operation: operation.into(),
            source,
        }
    }
}

/// Result alias for cloud operations.
pub type CloudResult<T> = Result<T, CloudError>;
