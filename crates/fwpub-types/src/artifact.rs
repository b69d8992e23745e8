use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// BLAKE3 digest of an artifact's bytes.
///
/// Shown to the operator so a published binary can be compared against the
/// local build by hand. It is not written to the version record.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactDigest([u8; 32]);

impl ArtifactDigest {
    /// Compute the digest of raw bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// The raw 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Debug for ArtifactDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArtifactDigest({})", self.short_hex())
    }
}

impl fmt::Display for ArtifactDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// A compiled firmware binary on the local filesystem.
///
/// Produced by the builder, consumed once by the publisher. The size is for
/// display only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub local_path: PathBuf,
    pub size_bytes: u64,
    pub digest: ArtifactDigest,
}

impl Artifact {
    /// Size in KiB, as displayed to the operator.
    pub fn size_kib(&self) -> f64 {
        self.size_bytes as f64 / 1024.0
    }

    /// File name of the local artifact, lossily converted.
    pub fn file_name(&self) -> String {
        self.local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
