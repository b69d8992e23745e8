//! Version record updates.
//!
//! The [`RecordUpdater`] merge-upserts the per-model [`VersionRecord`]
//! through an ordered list of [`RecordTier`]s:
//!
//! 1. [`DirectStoreTier`] -- a document store client
//! 2. [`NodeScriptTier`] -- a throwaway `node` script using the admin SDK
//! 3. [`ManualTier`] -- prints what to enter by hand; never writes
//!
//! Expected failures move on to the next tier. [`RecordError`] is reserved
//! for conditions that indicate a broken setup rather than an unavailable
//! service.
//!
//! [`VersionRecord`]: fwpub_types::VersionRecord

pub mod error;
pub mod tier;
pub mod tiers;
pub mod updater;

pub use error::{RecordError, RecordResult};
pub use tier::{RecordTier, TierOutcome};
pub use tiers::{print_manual_instructions, DirectStoreTier, ManualTier, NodeScriptTier, RECORD_ENV};
pub use updater::{RecordReport, RecordUpdater, TierFailure};
