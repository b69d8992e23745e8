use std::sync::Arc;

use fwpub_cloud::ObjectStorage;
use fwpub_types::{BackendKind, DownloadUrl, Operator, Tone};
use tracing::{debug, warn};

use crate::backend::{PublishBackend, PublishRequest};
use crate::error::PublishResult;

/// Uploads through the storage API and makes the object world-readable.
///
/// Bucket resolution: use the primary bucket if it exists, otherwise try to
/// create it; if that fails, use the fallback bucket, creating it if it is
/// absent too. A failed lookup counts as absent.
pub struct StorageSdkBackend {
    storage: Arc<dyn ObjectStorage>,
    primary_bucket: String,
    fallback_bucket: String,
    location: String,
    credentials: Option<String>,
}

impl StorageSdkBackend {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        primary_bucket: impl Into<String>,
        fallback_bucket: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            primary_bucket: primary_bucket.into(),
            fallback_bucket: fallback_bucket.into(),
            location: location.into(),
            credentials: None,
        }
    }

    /// Describe the credentials in use; shown when this backend runs.
    pub fn with_credentials_label(mut self, label: impl Into<String>) -> Self {
        self.credentials = Some(label.into());
        self
    }

    /// A failed lookup counts as absent, unless it failed for lack of
    /// credentials: then no later call can succeed either.
    fn exists(&self, bucket: &str) -> PublishResult<bool> {
        match self.storage.bucket_exists(bucket) {
            Ok(found) => Ok(found),
            Err(err) if err.is_credentials() => Err(err.into()),
            Err(err) => {
                debug!(bucket, error = %err, "bucket lookup failed, treating as absent");
                Ok(false)
            }
        }
    }

    /// Pick the bucket to upload into, creating one if needed.
    pub fn resolve_bucket(&self, operator: &dyn Operator) -> PublishResult<String> {
        let primary = self.primary_bucket.as_str();
        if self.exists(primary)? {
            operator.say(Tone::Detail, &format!("Using existing bucket: {primary}"));
            return Ok(primary.to_string());
        }

        operator.say(
            Tone::Progress,
            &format!("Bucket {primary} does not exist, creating it..."),
        );
        match self.storage.create_bucket(primary, &self.location) {
            Ok(()) => {
                operator.say(Tone::Success, "Bucket created");
                return Ok(primary.to_string());
            }
            Err(err) if err.is_credentials() => return Err(err.into()),
            Err(err) => {
                warn!(bucket = primary, error = %err, "bucket creation failed");
                operator.say(Tone::Warning, &format!("Creating bucket failed: {err}"));
            }
        }

        let fallback = self.fallback_bucket.as_str();
        operator.say(Tone::Detail, &format!("Trying default bucket: {fallback}"));
        if self.exists(fallback)? {
            return Ok(fallback.to_string());
        }
        self.storage.create_bucket(fallback, &self.location)?;
        operator.say(Tone::Success, "Default bucket created");
        Ok(fallback.to_string())
    }
}

impl PublishBackend for StorageSdkBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::ObjectStoreSdk
    }

    fn name(&self) -> &str {
        "Storage API"
    }

    fn publish(
        &self,
        request: &PublishRequest<'_>,
        operator: &dyn Operator,
    ) -> PublishResult<DownloadUrl> {
        operator.say(Tone::Progress, "Uploading through the storage API...");
        if let Some(label) = &self.credentials {
            operator.say(Tone::Detail, label);
        }
        let bucket = self.resolve_bucket(operator)?;
        let key = request.target(self.kind()).storage_path;

        operator.say(Tone::Progress, "Uploading...");
        self.storage
            .upload_file(&bucket, &key, &request.artifact.local_path)?;
        self.storage.make_public(&bucket, &key)?;

        Ok(DownloadUrl::Verified(self.storage.public_url(&bucket, &key)))
    }
}
