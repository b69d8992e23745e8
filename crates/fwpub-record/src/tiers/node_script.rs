use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use fwpub_exec::{CommandRunner, Invocation};
use fwpub_types::{Operator, Tone, VersionRecord, FIELD_PUBLISH_TIME};
use serde_json::json;
use tracing::debug;

use crate::error::{RecordError, RecordResult};
use crate::tier::{RecordTier, TierOutcome};

/// Environment variable carrying the record to the script as JSON.
pub const RECORD_ENV: &str = "FWPUB_RECORD";

/// Reads the record from [`RECORD_ENV`] and merge-writes it with the admin
/// SDK. Expects `serviceAccountKey.json` and `firebase-admin` in its
/// working directory.
const SCRIPT: &str = r#"const admin = require('firebase-admin');
const serviceAccount = require('./serviceAccountKey.json');

admin.initializeApp({ credential: admin.credential.cert(serviceAccount) });

const { collection, id, fields, serverTimeField } = JSON.parse(process.env.FWPUB_RECORD);
fields[serverTimeField] = admin.firestore.FieldValue.serverTimestamp();

admin.firestore()
  .collection(collection)
  .doc(id)
  .set(fields, { merge: true })
  .then(() => process.exit(0))
  .catch((error) => {
    console.error(error && error.message ? error.message : error);
    process.exit(1);
  });
"#;

/// Writes the record by running a temporary `node` script in `script_dir`.
///
/// The script file is created inside `script_dir` so `require` resolves the
/// project's modules, and is removed when the tier returns, whatever the
/// outcome.
pub struct NodeScriptTier {
    runner: Arc<dyn CommandRunner>,
    node: Option<PathBuf>,
    script_dir: PathBuf,
    collection: String,
}

impl NodeScriptTier {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        node: Option<PathBuf>,
        script_dir: impl Into<PathBuf>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            runner,
            node,
            script_dir: script_dir.into(),
            collection: collection.into(),
        }
    }

    fn payload(&self, record: &VersionRecord) -> RecordResult<String> {
        Ok(serde_json::to_string(&json!({
            "collection": self.collection,
            "id": record.key(),
            "fields": record.fields(),
            "serverTimeField": FIELD_PUBLISH_TIME,
        }))?)
    }
}

impl RecordTier for NodeScriptTier {
    fn name(&self) -> &str {
        "Node.js script"
    }

    fn apply(&self, record: &VersionRecord, operator: &dyn Operator) -> RecordResult<TierOutcome> {
        let Some(node) = &self.node else {
            return Ok(TierOutcome::FellThrough("node is not installed".into()));
        };
        if !self.script_dir.is_dir() {
            return Err(RecordError::MissingScriptDir(self.script_dir.clone()));
        }

        let script_error = |source| RecordError::ScriptFile {
            dir: self.script_dir.clone(),
            source,
        };
        let mut script = tempfile::Builder::new()
            .prefix("fwpub-record-")
            .suffix(".js")
            .tempfile_in(&self.script_dir)
            .map_err(script_error)?;
        script
            .write_all(SCRIPT.as_bytes())
            .and_then(|()| script.flush())
            .map_err(script_error)?;

        let file_name = script
            .path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let invocation = Invocation::new(node)
            .arg(file_name)
            .current_dir(&self.script_dir)
            .env(RECORD_ENV, self.payload(record)?);

        operator.say(Tone::Progress, "Updating version record with Node.js...");
        debug!(script = %script.path().display(), "running record script");
        let outcome = match self.runner.run(&invocation) {
            Ok(output) if output.is_success() => {
                operator.say(Tone::Success, "Version record updated");
                TierOutcome::Written
            }
            Ok(output) => TierOutcome::FellThrough(format!(
                "node exited with {}: {}",
                output.status_text(),
                output.stderr.trim()
            )),
            Err(err) => TierOutcome::FellThrough(err.to_string()),
        };
        drop(script);
        Ok(outcome)
    }
}
