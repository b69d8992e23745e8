//! Artifact publishing.
//!
//! An [`ArtifactPublisher`] holds an ordered list of [`PublishBackend`]s and
//! tries them one at a time. The first backend that returns a URL wins and
//! nothing after it runs; every failure is reported and the next backend is
//! tried.
//!
//! The standard chain, in priority order:
//!
//! 1. [`GithubReleaseBackend`] -- attach the image to release `v{version}`
//! 2. [`StorageSdkBackend`] -- upload through the storage API
//! 3. [`GsutilBackend`] -- upload through the storage CLI
//! 4. [`ManualBackend`] -- ask the operator; always yields a URL, marked
//!    [`DownloadUrl::Unverified`](fwpub_types::DownloadUrl::Unverified)
//!
//! Every backend derives its object name from `(model, version)` alone, so
//! publishing the same version twice overwrites rather than duplicates.

pub mod backend;
pub mod backends;
pub mod error;
pub mod publisher;

pub use backend::{PublishBackend, PublishRequest};
pub use backends::{
    release_download_url, GithubReleaseBackend, GsutilBackend, ManualBackend, StorageSdkBackend,
};
pub use error::{PublishError, PublishResult};
pub use publisher::{ArtifactPublisher, AttemptRecord, PublishOutcome};
