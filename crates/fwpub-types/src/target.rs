use std::fmt;

use serde::{Deserialize, Serialize};

use crate::firmware::FirmwareInfo;

/// The delivery backends, in the order the publisher tries them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BackendKind {
    /// Release asset on a hosted VCS repository.
    VcsRelease,
    /// Object storage through its HTTP API.
    ObjectStoreSdk,
    /// Object storage through its command-line tool.
    ObjectStoreCli,
    /// Operator uploads by hand and confirms the URL.
    Manual,
}

impl BackendKind {
    /// All kinds in priority order.
    pub const ALL: [BackendKind; 4] = [
        BackendKind::VcsRelease,
        BackendKind::ObjectStoreSdk,
        BackendKind::ObjectStoreCli,
        BackendKind::Manual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VcsRelease => "vcs-release",
            Self::ObjectStoreSdk => "object-store-sdk",
            Self::ObjectStoreCli => "object-store-cli",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a backend will put the artifact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishTarget {
    pub backend_kind: BackendKind,
    pub storage_path: String,
}

impl PublishTarget {
    /// Compute the target for a backend. Deterministic in `(model, version)`.
    pub fn for_firmware(backend_kind: BackendKind, info: &FirmwareInfo) -> Self {
        Self {
            backend_kind,
            storage_path: info.storage_path(),
        }
    }
}
