//! The concrete publish backends, in priority order.

mod github;
mod gsutil;
mod manual;
mod storage_sdk;

pub use github::{release_download_url, GithubReleaseBackend};
pub use gsutil::GsutilBackend;
pub use manual::ManualBackend;
pub use storage_sdk::StorageSdkBackend;
