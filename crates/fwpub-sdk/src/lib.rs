//! Release orchestration for fwpub.
//!
//! [`Release`] runs one firmware release end to end:
//!
//! 1. read model and version from the firmware source
//! 2. check that the required tools are installed
//! 3. confirm with the operator (unless told not to ask)
//! 4. compile the firmware
//! 5. publish the image through the backend chain
//! 6. upsert the version record through the tier chain
//!
//! Steps 1, 2, 4 and 5 are hard gates: a failure ends the run with a
//! [`PipelineError`]. A record failure is reported with manual recovery
//! steps and recorded in the [`ReleaseSummary`], but the run still succeeds
//! because the image is already live.

pub mod config;
pub mod error;
pub mod release;
pub mod requirements;

pub use config::{Endpoints, GithubSettings, PublisherConfig, RecordSettings, StorageSettings};
pub use error::{PipelineError, PipelineResult};
pub use release::{RecordStatus, Release, ReleaseOptions, ReleaseOutcome, ReleaseSummary};
pub use requirements::{check_requirements, Requirement, ToolSet, REQUIREMENTS};

pub use fwpub_types::{DownloadUrl, FirmwareInfo, Operator, ScriptedOperator, Tone};
