use std::path::PathBuf;
use std::sync::Arc;

use fwpub_cloud::public_url;
use fwpub_exec::{CommandRunner, Invocation};
use fwpub_types::{BackendKind, DownloadUrl, Operator, Tone};

use crate::backend::{PublishBackend, PublishRequest};
use crate::error::{PublishError, PublishResult};

/// Uploads with the `gsutil` CLI: `cp` then a separate public-read `acl ch`.
pub struct GsutilBackend {
    runner: Arc<dyn CommandRunner>,
    gsutil: Option<PathBuf>,
    bucket: String,
}

impl GsutilBackend {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        gsutil: Option<PathBuf>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            runner,
            gsutil,
            bucket: bucket.into(),
        }
    }

    fn run(&self, invocation: Invocation) -> PublishResult<()> {
        self.runner.run(&invocation)?.into_result(&invocation)?;
        Ok(())
    }
}

impl PublishBackend for GsutilBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::ObjectStoreCli
    }

    fn name(&self) -> &str {
        "gsutil"
    }

    fn publish(
        &self,
        request: &PublishRequest<'_>,
        operator: &dyn Operator,
    ) -> PublishResult<DownloadUrl> {
        let gsutil = self
            .gsutil
            .as_ref()
            .ok_or(PublishError::ToolUnavailable("gsutil"))?;
        let key = request.target(self.kind()).storage_path;
        let object = format!("gs://{}/{key}", self.bucket);
        let local = request.artifact.local_path.to_string_lossy().into_owned();

        operator.say(Tone::Progress, "Uploading with gsutil...");
        self.run(Invocation::new(gsutil).args(["cp", local.as_str(), object.as_str()]))?;
        self.run(Invocation::new(gsutil).args(["acl", "ch", "-u", "AllUsers:R", object.as_str()]))?;

        Ok(DownloadUrl::Verified(public_url(&self.bucket, &key)))
    }
}
