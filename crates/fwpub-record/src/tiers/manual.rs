use fwpub_types::{
    Operator, Tone, VersionRecord, FIELD_CHANGELOG, FIELD_DOWNLOAD_URL, FIELD_MIN_VERSION,
    FIELD_PUBLISH_TIME, FIELD_VERSION,
};

use crate::error::RecordResult;
use crate::tier::{RecordTier, TierOutcome};

/// Show the operator exactly what to enter in the store console.
pub fn print_manual_instructions(
    operator: &dyn Operator,
    record: &VersionRecord,
    collection: &str,
    console_url: &str,
) {
    operator.say(
        Tone::Warning,
        "Automatic record update failed, please update it manually",
    );
    operator.say(Tone::Plain, "Manual update steps:");
    operator.say(Tone::Plain, &format!("1. Open the console: {console_url}"));
    operator.say(Tone::Plain, &format!("2. Go to collection: {collection}"));
    operator.say(
        Tone::Plain,
        &format!("3. Edit or create document ID: {}", record.key()),
    );
    operator.say(Tone::Plain, "4. Set these fields:");
    for (name, value) in [
        (FIELD_VERSION, record.version.as_str()),
        (FIELD_DOWNLOAD_URL, record.download_url.as_str()),
        (FIELD_CHANGELOG, record.changelog.as_str()),
        (FIELD_MIN_VERSION, record.min_version.as_str()),
        (FIELD_PUBLISH_TIME, "(server timestamp)"),
    ] {
        operator.say(Tone::Detail, &format!("   - {name}: {value}"));
    }
}

/// Prints manual instructions. Never writes the record.
pub struct ManualTier {
    collection: String,
    console_url: String,
}

impl ManualTier {
    pub fn new(collection: impl Into<String>, console_url: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            console_url: console_url.into(),
        }
    }
}

impl RecordTier for ManualTier {
    fn name(&self) -> &str {
        "manual update"
    }

    fn apply(&self, record: &VersionRecord, operator: &dyn Operator) -> RecordResult<TierOutcome> {
        print_manual_instructions(operator, record, &self.collection, &self.console_url);
        Ok(TierOutcome::FellThrough(
            "the record must be entered by hand".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fwpub_types::{DownloadUrl, FirmwareInfo, ScriptedOperator};

    #[test]
    fn lists_every_field_and_never_writes() {
        let info = FirmwareInfo::new("hoRelay2", "1.2.2").unwrap();
        let record = VersionRecord::new(
            &info,
            &DownloadUrl::Unverified("https://x/fw.bin".into()),
            "bugfix",
            "1.0.0",
        );
        let operator = ScriptedOperator::new();
        let tier = ManualTier::new(
            "firmware_updates",
            "https://console.firebase.google.com/project/hoctrl/firestore",
        );

        let outcome = tier.apply(&record, &operator).unwrap();
        assert!(matches!(outcome, TierOutcome::FellThrough(_)));
        for line in [
            "console.firebase.google.com/project/hoctrl/firestore",
            "collection: firmware_updates",
            "document ID: hoRelay2",
            "version: 1.2.2",
            "download_url: https://x/fw.bin",
            "changelog: bugfix",
            "min_version: 1.0.0",
            "publish_time: (server timestamp)",
        ] {
            assert!(operator.saw(line), "missing {line}");
        }
        assert!(operator.questions().is_empty());
    }
}
