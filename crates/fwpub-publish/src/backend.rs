use fwpub_types::{Artifact, BackendKind, DownloadUrl, FirmwareInfo, Operator, PublishTarget};

use crate::error::PublishResult;

/// Everything a backend needs to deliver one artifact.
#[derive(Clone, Copy, Debug)]
pub struct PublishRequest<'a> {
    pub artifact: &'a Artifact,
    pub info: &'a FirmwareInfo,
    pub changelog: &'a str,
}

impl<'a> PublishRequest<'a> {
    pub fn new(artifact: &'a Artifact, info: &'a FirmwareInfo, changelog: &'a str) -> Self {
        Self {
            artifact,
            info,
            changelog,
        }
    }

    /// Where `kind` puts the artifact. The storage path is the same for
    /// every backend: `firmware/{model}/{model}_v{version}.bin`.
    pub fn target(&self, kind: BackendKind) -> PublishTarget {
        PublishTarget::for_firmware(kind, self.info)
    }
}

/// One delivery strategy in the publish chain.
///
/// Returning `Err` means "try the next backend". Implementations report
/// their own progress through `operator`; the publisher reports the failure.
pub trait PublishBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Short name used in progress output and logs.
    fn name(&self) -> &str;

    fn publish(
        &self,
        request: &PublishRequest<'_>,
        operator: &dyn Operator,
    ) -> PublishResult<DownloadUrl>;
}
