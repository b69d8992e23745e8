use fwpub_types::{Operator, Tone, VersionRecord};
use tracing::{info, warn};

use crate::error::RecordResult;
use crate::tier::{RecordTier, TierOutcome};

/// A tier that did not write the record, and why.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TierFailure {
    pub tier: String,
    pub reason: String,
}

/// Result of a record update.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordReport {
    /// Name of the tier that wrote the record, if any did.
    pub written_by: Option<String>,
    /// Tiers that fell through, in order.
    pub failures: Vec<TierFailure>,
}

impl RecordReport {
    /// Whether an automated upsert happened.
    pub fn written(&self) -> bool {
        self.written_by.is_some()
    }
}

/// Runs record tiers in order until one writes the record.
pub struct RecordUpdater {
    tiers: Vec<Box<dyn RecordTier>>,
}

impl RecordUpdater {
    pub fn new() -> Self {
        Self { tiers: Vec::new() }
    }

    pub fn add_tier(&mut self, tier: Box<dyn RecordTier>) {
        self.tiers.push(tier);
    }

    pub fn upsert(
        &self,
        record: &VersionRecord,
        operator: &dyn Operator,
    ) -> RecordResult<RecordReport> {
        operator.header("Update version record");
        let mut report = RecordReport::default();

        for tier in &self.tiers {
            match tier.apply(record, operator)? {
                TierOutcome::Written => {
                    info!(tier = tier.name(), model = %record.model, version = %record.version, "version record written");
                    report.written_by = Some(tier.name().to_string());
                    return Ok(report);
                }
                TierOutcome::FellThrough(reason) => {
                    warn!(tier = tier.name(), %reason, "record tier fell through");
                    operator.say(
                        Tone::Warning,
                        &format!("{} update failed: {reason}", tier.name()),
                    );
                    report.failures.push(TierFailure {
                        tier: tier.name().to_string(),
                        reason,
                    });
                }
            }
        }
        Ok(report)
    }
}

impl Default for RecordUpdater {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use fwpub_types::{DownloadUrl, FirmwareInfo, ScriptedOperator};

    use super::*;
    use crate::error::RecordError;

    struct Canned {
        name: &'static str,
        outcome: fn() -> RecordResult<TierOutcome>,
        calls: Arc<AtomicUsize>,
    }

    impl RecordTier for Canned {
        fn name(&self) -> &str {
            self.name
        }

        fn apply(&self, _: &VersionRecord, _: &dyn Operator) -> RecordResult<TierOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.outcome)()
        }
    }

    fn tier(
        name: &'static str,
        outcome: fn() -> RecordResult<TierOutcome>,
    ) -> (Box<dyn RecordTier>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Box::new(Canned {
                name,
                outcome,
                calls: calls.clone(),
            }),
            calls,
        )
    }

    fn record() -> VersionRecord {
        let info = FirmwareInfo::new("hoRelay2", "1.2.2").unwrap();
        VersionRecord::new(&info, &DownloadUrl::Verified("https://x".into()), "bugfix", "1.0.0")
    }

    #[test]
    fn stops_at_first_writer() {
        let (a, a_calls) = tier("store", || Ok(TierOutcome::FellThrough("denied".into())));
        let (b, b_calls) = tier("script", || Ok(TierOutcome::Written));
        let (c, c_calls) = tier("manual", || Ok(TierOutcome::FellThrough("manual".into())));
        let mut updater = RecordUpdater::new();
        for t in [a, b, c] {
            updater.add_tier(t);
        }

        let operator = ScriptedOperator::new();
        let report = updater.upsert(&record(), &operator).unwrap();
        assert!(report.written());
        assert_eq!(report.written_by.as_deref(), Some("script"));
        assert_eq!(
            report.failures,
            [TierFailure {
                tier: "store".into(),
                reason: "denied".into()
            }]
        );
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
        assert_eq!(c_calls.load(Ordering::SeqCst), 0);
        assert!(operator.saw("store update failed: denied"));
    }

    #[test]
    fn all_tiers_falling_through_is_not_an_error() {
        let (a, _) = tier("store", || Ok(TierOutcome::FellThrough("denied".into())));
        let (b, _) = tier("manual", || Ok(TierOutcome::FellThrough("manual".into())));
        let mut updater = RecordUpdater::new();
        updater.add_tier(a);
        updater.add_tier(b);
        let report = updater.upsert(&record(), &ScriptedOperator::new()).unwrap();
        assert!(!report.written());
        assert_eq!(report.failures.len(), 2);
    }

    #[test]
    fn unexpected_error_stops_chain() {
        let (a, _) = tier("script", || {
            Err(RecordError::MissingScriptDir(PathBuf::from("../../hoctrl")))
        });
        let (b, b_calls) = tier("manual", || Ok(TierOutcome::Written));
        let mut updater = RecordUpdater::new();
        updater.add_tier(a);
        updater.add_tier(b);
        let err = updater
            .upsert(&record(), &ScriptedOperator::new())
            .unwrap_err();
        assert!(matches!(err, RecordError::MissingScriptDir(_)));
        assert_eq!(b_calls.load(Ordering::SeqCst), 0);
    }
}
