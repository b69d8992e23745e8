//! Release settings.
//!
//! Every field has a default, so an empty or absent config file describes
//! the stock hoRelay2 release setup. Loading from disk and environment
//! overrides are the binary's job.

use std::path::PathBuf;

use fwpub_cloud::{FirestoreConfig, GcsConfig};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    /// Firmware source declaring the version and model constants.
    pub source_file: PathBuf,
    /// Sketch directory passed to the compiler.
    pub sketch_dir: PathBuf,
    /// Compiler output directory.
    pub build_dir: PathBuf,
    pub github: GithubSettings,
    pub storage: StorageSettings,
    pub records: RecordSettings,
    pub endpoints: Endpoints,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            source_file: PathBuf::from("ho_relay2.ino"),
            sketch_dir: PathBuf::from("."),
            build_dir: PathBuf::from("build"),
            github: GithubSettings::default(),
            storage: StorageSettings::default(),
            records: RecordSettings::default(),
            endpoints: Endpoints::default(),
        }
    }
}

impl PublisherConfig {
    /// Where the renamed release copy of the image is written.
    pub fn staging_dir(&self) -> PathBuf {
        self.build_dir.join("release")
    }

    pub fn storage_console_url(&self) -> String {
        format!(
            "https://console.firebase.google.com/project/{}/storage",
            self.storage.project
        )
    }

    pub fn records_console_url(&self) -> String {
        format!(
            "https://console.firebase.google.com/project/{}/firestore",
            self.storage.project
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubSettings {
    /// `owner/name` of the repository receiving releases.
    pub repo: String,
    pub host: String,
}

impl Default for GithubSettings {
    fn default() -> Self {
        Self {
            repo: "maotou316/hoctrl-firmware".into(),
            host: "github.com".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Cloud project; also hosts the document store.
    pub project: String,
    pub primary_bucket: String,
    pub fallback_bucket: String,
    /// Region for buckets created on demand.
    pub location: String,
    /// Service account key candidates, first existing file wins.
    pub credential_files: Vec<PathBuf>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            project: "hoctrl".into(),
            primary_bucket: "hoctrl.firebasestorage.app".into(),
            fallback_bucket: "hoctrl.appspot.com".into(),
            location: "asia-east1".into(),
            credential_files: vec![PathBuf::from("serviceAccountKey.json")],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordSettings {
    pub collection: String,
    pub credential_files: Vec<PathBuf>,
    /// Working directory of the Node.js record script.
    pub script_dir: PathBuf,
}

impl Default for RecordSettings {
    fn default() -> Self {
        Self {
            collection: "firmware_updates".into(),
            credential_files: vec![
                PathBuf::from("serviceAccountKey.json"),
                PathBuf::from("../../hoctrl/serviceAccountKey.json"),
            ],
            script_dir: PathBuf::from("../../hoctrl"),
        }
    }
}

/// Service base URLs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub storage_api: String,
    pub firestore_api: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            storage_api: GcsConfig::DEFAULT_API_BASE.into(),
            firestore_api: FirestoreConfig::DEFAULT_API_BASE.into(),
        }
    }
}
