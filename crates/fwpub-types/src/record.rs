use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::firmware::FirmwareInfo;
use crate::url::DownloadUrl;

/// Minimum supported version written when none is given.
pub const DEFAULT_MIN_VERSION: &str = "1.0.0";

/// Changelog written when none is given.
pub const DEFAULT_CHANGELOG: &str = "Bug fixes and performance improvements";

/// Field names of the version record document. Devices read these, so they
/// must not change.
pub const FIELD_VERSION: &str = "version";
pub const FIELD_DOWNLOAD_URL: &str = "download_url";
pub const FIELD_CHANGELOG: &str = "changelog";
pub const FIELD_MIN_VERSION: &str = "min_version";
/// Server-assigned on every write.
pub const FIELD_PUBLISH_TIME: &str = "publish_time";

/// The per-model record devices poll to discover updates.
///
/// Keyed by `model`; at most one live record per model. Always written with
/// merge semantics: fields not listed in [`VersionRecord::fields`] are left
/// untouched on the stored document, and `publish_time` is set by the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub model: String,
    pub version: String,
    pub download_url: String,
    pub changelog: String,
    pub min_version: String,
}

impl VersionRecord {
    pub fn new(
        info: &FirmwareInfo,
        download_url: &DownloadUrl,
        changelog: impl Into<String>,
        min_version: impl Into<String>,
    ) -> Self {
        Self {
            model: info.model.clone(),
            version: info.version.clone(),
            download_url: download_url.as_str().to_string(),
            changelog: changelog.into(),
            min_version: min_version.into(),
        }
    }

    /// Document key.
    pub fn key(&self) -> &str {
        &self.model
    }

    /// The fields this record writes, excluding the server timestamp.
    pub fn fields(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(FIELD_VERSION.into(), Value::String(self.version.clone()));
        map.insert(
            FIELD_DOWNLOAD_URL.into(),
            Value::String(self.download_url.clone()),
        );
        map.insert(FIELD_CHANGELOG.into(), Value::String(self.changelog.clone()));
        map.insert(
            FIELD_MIN_VERSION.into(),
            Value::String(self.min_version.clone()),
        );
        map
    }
}
