use std::time::{Duration, Instant};

use fwpub_types::{BackendKind, DownloadUrl, Operator, Tone};
use tracing::{debug, info, warn};

use crate::backend::{PublishBackend, PublishRequest};
use crate::error::{PublishError, PublishResult};

/// What happened when one backend was tried.
#[derive(Clone, Debug)]
pub struct AttemptRecord {
    pub backend: BackendKind,
    pub name: String,
    /// Failure text, `None` on success.
    pub error: Option<String>,
    pub elapsed: Duration,
}

impl AttemptRecord {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// The result of a successful publish.
#[derive(Clone, Debug)]
pub struct PublishOutcome {
    pub url: DownloadUrl,
    /// The backend that produced `url`.
    pub backend: BackendKind,
    /// Every backend tried, in order, ending with the winner.
    pub attempts: Vec<AttemptRecord>,
}

/// Tries publish backends in order and stops at the first success.
pub struct ArtifactPublisher {
    backends: Vec<Box<dyn PublishBackend>>,
    debug: bool,
}

impl ArtifactPublisher {
    /// An empty chain. Add backends with [`Self::add_backend`].
    pub fn new() -> Self {
        Self {
            backends: Vec::new(),
            debug: false,
        }
    }

    /// Show each failure's full debug form to the operator as well.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Append a backend to the end of the chain.
    pub fn add_backend(&mut self, backend: Box<dyn PublishBackend>) {
        self.backends.push(backend);
    }

    /// Kinds of the configured backends, in the order they are tried.
    pub fn kinds(&self) -> Vec<BackendKind> {
        self.backends.iter().map(|b| b.kind()).collect()
    }

    pub fn publish(
        &self,
        request: &PublishRequest<'_>,
        operator: &dyn Operator,
    ) -> PublishResult<PublishOutcome> {
        operator.header("Upload firmware");
        operator.say(
            Tone::Progress,
            &format!("Uploading {}", request.info.artifact_file_name()),
        );

        let mut attempts = Vec::with_capacity(self.backends.len());
        for backend in &self.backends {
            let started = Instant::now();
            debug!(backend = backend.name(), "trying publish backend");
            let result = backend.publish(request, operator);
            let elapsed = started.elapsed();

            match result {
                Ok(url) => {
                    attempts.push(AttemptRecord {
                        backend: backend.kind(),
                        name: backend.name().to_string(),
                        error: None,
                        elapsed,
                    });
                    info!(backend = backend.name(), url = url.as_str(), "artifact published");
                    operator.say(Tone::Success, "Upload succeeded");
                    operator.say(Tone::Plain, &format!("Download URL: {url}"));
                    return Ok(PublishOutcome {
                        url,
                        backend: backend.kind(),
                        attempts,
                    });
                }
                Err(err) => {
                    warn!(backend = backend.name(), error = %err, "publish backend failed");
                    debug!(backend = backend.name(), "{err:?}");
                    operator.say(
                        Tone::Warning,
                        &format!("{} upload failed: {err}", backend.name()),
                    );
                    if self.debug {
                        operator.say(Tone::Detail, &format!("{err:#?}"));
                    }
                    attempts.push(AttemptRecord {
                        backend: backend.kind(),
                        name: backend.name().to_string(),
                        error: Some(err.to_string()),
                        elapsed,
                    });
                }
            }
        }

        Err(PublishError::Exhausted { attempts })
    }
}

impl Default for ArtifactPublisher {
    fn default() -> Self {
        Self::new()
    }
}
