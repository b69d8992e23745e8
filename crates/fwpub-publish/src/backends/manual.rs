use std::path;

use fwpub_cloud::public_url;
use fwpub_types::{BackendKind, DownloadUrl, Operator, Tone};

use crate::backend::{PublishBackend, PublishRequest};
use crate::error::{PublishError, PublishResult};

/// Last resort: the operator uploads by hand and confirms the URL.
///
/// Always yields a URL unless the prompt itself fails. The URL is
/// [`DownloadUrl::Unverified`] because nothing checks the upload happened.
pub struct ManualBackend {
    bucket: String,
    console_url: String,
}

impl ManualBackend {
    pub fn new(bucket: impl Into<String>, console_url: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            console_url: console_url.into(),
        }
    }

    /// The URL the object would have if uploaded to the bucket and made public.
    pub fn expected_url(&self, storage_path: &str) -> String {
        public_url(&self.bucket, storage_path)
    }
}

impl PublishBackend for ManualBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Manual
    }

    fn name(&self) -> &str {
        "manual upload"
    }

    fn publish(
        &self,
        request: &PublishRequest<'_>,
        operator: &dyn Operator,
    ) -> PublishResult<DownloadUrl> {
        let storage_path = request.target(self.kind()).storage_path;
        let local = &request.artifact.local_path;
        let absolute = path::absolute(local).unwrap_or_else(|_| local.clone());
        let expected = self.expected_url(&storage_path);

        operator.say(Tone::Warning, "Automatic upload failed, please upload manually");
        operator.say(Tone::Detail, &format!("File: {}", absolute.display()));
        operator.say(Tone::Detail, &format!("Storage path: {storage_path}"));
        operator.say(Tone::Plain, "Manual upload steps:");
        operator.say(Tone::Plain, &format!("1. Open the console: {}", self.console_url));
        operator.say(Tone::Plain, &format!("2. Upload the file to: {storage_path}"));
        operator.say(Tone::Plain, "3. Open the file and copy its download URL");
        operator.say(Tone::Plain, "4. Enter the URL below");
        operator.say(
            Tone::Detail,
            &format!("Expected URL (if uploaded and made public): {expected}"),
        );

        let answer = operator
            .ask("Download URL (press Enter to use the expected URL): ")
            .map_err(PublishError::Prompt)?;
        let url = if answer.is_empty() { expected } else { answer };
        Ok(DownloadUrl::Unverified(url))
    }
}
