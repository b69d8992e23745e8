use std::sync::Arc;

use fwpub_cloud::DocumentStore;
use fwpub_types::{Operator, Tone, VersionRecord, FIELD_PUBLISH_TIME};

use crate::error::RecordResult;
use crate::tier::{RecordTier, TierOutcome};

/// Writes through a [`DocumentStore`] client.
pub struct DirectStoreTier {
    store: Arc<dyn DocumentStore>,
    collection: String,
    credentials: Option<String>,
}

impl DirectStoreTier {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
            credentials: None,
        }
    }

    /// Describe the credentials in use; shown when this tier runs.
    pub fn with_credentials_label(mut self, label: impl Into<String>) -> Self {
        self.credentials = Some(label.into());
        self
    }
}

impl RecordTier for DirectStoreTier {
    fn name(&self) -> &str {
        "Document store"
    }

    fn apply(&self, record: &VersionRecord, operator: &dyn Operator) -> RecordResult<TierOutcome> {
        if let Some(label) = &self.credentials {
            operator.say(Tone::Detail, label);
        }
        operator.say(Tone::Progress, "Updating version record...");
        match self.store.merge_upsert(
            &self.collection,
            record.key(),
            &record.fields(),
            Some(FIELD_PUBLISH_TIME),
        ) {
            Ok(()) => {
                operator.say(Tone::Success, "Version record updated");
                operator.say(
                    Tone::Plain,
                    &format!("Document: {}/{}", self.collection, record.key()),
                );
                Ok(TierOutcome::Written)
            }
            Err(err) => Ok(TierOutcome::FellThrough(err.to_string())),
        }
    }
}
