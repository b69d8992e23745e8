use fwpub_types::{Operator, VersionRecord};

use crate::error::RecordResult;

/// What a tier did with the record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TierOutcome {
    /// The record is in the store.
    Written,
    /// The tier could not write it; try the next one.
    FellThrough(String),
}

/// One strategy for writing the version record.
pub trait RecordTier: Send + Sync {
    fn name(&self) -> &str;

    /// Write `record` with merge semantics and a server-assigned
    /// `publish_time`.
    ///
    /// Service and tool failures are `Ok(TierOutcome::FellThrough)`; `Err`
    /// stops the chain.
    fn apply(&self, record: &VersionRecord, operator: &dyn Operator)
        -> RecordResult<TierOutcome>;
}
