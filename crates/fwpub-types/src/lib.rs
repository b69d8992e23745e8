//! Foundation types for fwpub, the firmware release publisher.
//!
//! Every other fwpub crate depends on `fwpub-types`. The types here are
//! created and consumed within a single publishing run; the only durable
//! state lives in the external document store.
//!
//! # Key Types
//!
//! - [`FirmwareInfo`] -- model and version read from the firmware source
//! - [`Artifact`] -- the compiled binary produced by the build step
//! - [`ArtifactDigest`] -- BLAKE3 digest of an artifact (display only)
//! - [`BackendKind`] / [`PublishTarget`] -- where an artifact is delivered
//! - [`VersionRecord`] -- the per-model record devices poll for updates
//! - [`DownloadUrl`] -- a download reference, verified or operator-asserted
//! - [`Operator`] -- injected interface for operator-facing output and prompts

pub mod artifact;
pub mod error;
pub mod firmware;
pub mod operator;
pub mod record;
pub mod target;
pub mod url;

pub use artifact::{Artifact, ArtifactDigest};
pub use error::TypeError;
pub use firmware::FirmwareInfo;
pub use operator::{Operator, ScriptedOperator, Tone};
pub use record::{
    VersionRecord, DEFAULT_CHANGELOG, DEFAULT_MIN_VERSION, FIELD_CHANGELOG, FIELD_DOWNLOAD_URL,
    FIELD_MIN_VERSION, FIELD_PUBLISH_TIME, FIELD_VERSION,
};
pub use target::{BackendKind, PublishTarget};
pub use url::DownloadUrl;
