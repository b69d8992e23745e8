use std::path::Path;

use crate::error::CloudResult;

const PUBLIC_HOST: &str = "https://storage.googleapis.com";

/// Public download URL of an object once it is world-readable.
pub fn public_url(bucket: &str, key: &str) -> String {
    format!("{PUBLIC_HOST}/{bucket}/{key}")
}

/// A bucket-based object store.
///
/// Implementations must be thread-safe. Existence checks return `Ok(false)`
/// only for a definite "not found"; anything else is an error.
pub trait ObjectStorage: Send + Sync {
    /// Check whether a bucket exists.
    fn bucket_exists(&self, bucket: &str) -> CloudResult<bool>;

    /// Create a bucket in `location`.
    fn create_bucket(&self, bucket: &str, location: &str) -> CloudResult<()>;

    /// Upload a local file to `bucket/key`, replacing any existing object.
    fn upload_file(&self, bucket: &str, key: &str, path: &Path) -> CloudResult<()>;

    /// Grant public read access to one object.
    fn make_public(&self, bucket: &str, key: &str) -> CloudResult<()>;

    /// URL under which a public object is served.
    fn public_url(&self, bucket: &str, key: &str) -> String {
        public_url(bucket, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_url_layout() {
        assert_eq!(
            public_url("hoctrl.firebasestorage.app", "firmware/hoRelay2/hoRelay2_v1.2.2.bin"),
            "https://storage.googleapis.com/hoctrl.firebasestorage.app/firmware/hoRelay2/hoRelay2_v1.2.2.bin"
        );
    }
}
