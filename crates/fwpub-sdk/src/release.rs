use std::sync::Arc;

use fwpub_build::{Builder, COMPILER_TOOL};
use fwpub_cloud::{
    discover_credentials, token_provider, CredentialSource, DocumentStore, FirestoreClient,
    FirestoreConfig, GcsClient, GcsConfig, ObjectStorage,
};
use fwpub_exec::{CommandRunner, ToolLocator};
use fwpub_publish::{
    ArtifactPublisher, GithubReleaseBackend, GsutilBackend, ManualBackend, PublishRequest,
    StorageSdkBackend,
};
use fwpub_record::{
    print_manual_instructions, DirectStoreTier, ManualTier, NodeScriptTier, RecordUpdater,
};
use fwpub_source::MetadataReader;
use fwpub_types::{
    Artifact, BackendKind, DownloadUrl, FirmwareInfo, Operator, Tone, VersionRecord,
    DEFAULT_CHANGELOG, DEFAULT_MIN_VERSION,
};
use tracing::{info, warn};

use crate::config::PublisherConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::requirements::{check_requirements, ToolSet, REQUIREMENTS};

/// Per-run parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReleaseOptions {
    /// Release notes; [`DEFAULT_CHANGELOG`] when `None`.
    pub changelog: Option<String>,
    pub min_version: String,
    /// Skip the confirmation prompt.
    pub assume_yes: bool,
}

impl Default for ReleaseOptions {
    fn default() -> Self {
        Self {
            changelog: None,
            min_version: DEFAULT_MIN_VERSION.to_string(),
            assume_yes: false,
        }
    }
}

/// What happened to the version record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordStatus {
    /// Written by the named tier.
    Written(String),
    /// Every tier fell through; the operator was given manual steps.
    Manual,
    /// The chain stopped on an unexpected error; the operator was given
    /// manual steps.
    Failed(String),
}

impl RecordStatus {
    pub fn is_written(&self) -> bool {
        matches!(self, Self::Written(_))
    }
}

/// A completed release.
#[derive(Clone, Debug)]
pub struct ReleaseSummary {
    pub info: FirmwareInfo,
    pub artifact: Artifact,
    pub url: DownloadUrl,
    pub backend: BackendKind,
    pub record: RecordStatus,
}

#[derive(Clone, Debug)]
pub enum ReleaseOutcome {
    Published(ReleaseSummary),
    /// The operator declined at the confirmation prompt.
    Declined,
}

/// One firmware release run.
pub struct Release {
    config: PublisherConfig,
    runner: Arc<dyn CommandRunner>,
    locator: ToolLocator,
    operator: Arc<dyn Operator>,
    storage: Option<Arc<dyn ObjectStorage>>,
    documents: Option<Arc<dyn DocumentStore>>,
    debug: bool,
}

impl Release {
    pub fn new(
        config: PublisherConfig,
        runner: Arc<dyn CommandRunner>,
        locator: ToolLocator,
        operator: Arc<dyn Operator>,
    ) -> Self {
        Self {
            config,
            runner,
            locator,
            operator,
            storage: None,
            documents: None,
            debug: false,
        }
    }

    /// Show full error detail for failed upload backends.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Use this object storage instead of the storage API client.
    pub fn with_object_storage(mut self, storage: Arc<dyn ObjectStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Use this document store instead of the document API client.
    pub fn with_document_store(mut self, documents: Arc<dyn DocumentStore>) -> Self {
        self.documents = Some(documents);
        self
    }

    pub fn config(&self) -> &PublisherConfig {
        &self.config
    }

    pub fn run(&self, options: &ReleaseOptions) -> PipelineResult<ReleaseOutcome> {
        let operator = self.operator.as_ref();

        let info = self.read_info()?;
        let tools = check_requirements(REQUIREMENTS, &self.locator, operator)?;

        let changelog = options.changelog.clone().unwrap_or_else(|| {
            operator.say(
                Tone::Detail,
                &format!("Using default changelog: {DEFAULT_CHANGELOG}"),
            );
            DEFAULT_CHANGELOG.to_string()
        });
        if !self.confirm(&info, &changelog, options)? {
            operator.say(Tone::Warning, "Cancelled");
            return Ok(ReleaseOutcome::Declined);
        }

        let artifact = self.build(&info, &tools)?;

        let request = PublishRequest::new(&artifact, &info, &changelog);
        let published = self.publisher(&tools).publish(&request, operator)?;

        let record = VersionRecord::new(&info, &published.url, &changelog, &options.min_version);
        let record_status = self.update_record(&record, &tools);

        let summary = ReleaseSummary {
            info,
            artifact,
            url: published.url,
            backend: published.backend,
            record: record_status,
        };
        self.report(&summary);
        Ok(ReleaseOutcome::Published(summary))
    }

    fn read_info(&self) -> PipelineResult<FirmwareInfo> {
        self.operator.header("Read firmware info");
        let info = MetadataReader::new(&self.config.source_file).read()?;
        self.operator
            .say(Tone::Plain, &format!("Device model: {}", info.model));
        self.operator
            .say(Tone::Plain, &format!("Firmware version: {}", info.version));
        info!(model = %info.model, version = %info.version, "firmware info read");
        Ok(info)
    }

    fn confirm(
        &self,
        info: &FirmwareInfo,
        changelog: &str,
        options: &ReleaseOptions,
    ) -> PipelineResult<bool> {
        let operator = self.operator.as_ref();
        operator.header("Confirm release");
        operator.say(Tone::Plain, &format!("Device model: {}", info.model));
        operator.say(Tone::Plain, &format!("Firmware version: {}", info.version));
        operator.say(
            Tone::Plain,
            &format!("Minimum version: {}", options.min_version),
        );
        operator.say(Tone::Plain, &format!("Changelog:\n{changelog}"));
        if options.assume_yes {
            return Ok(true);
        }
        let answer = operator
            .ask(&format!("Publish {info}? [y/N] "))
            .map_err(PipelineError::Prompt)?;
        Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
    }

    fn build(&self, info: &FirmwareInfo, tools: &ToolSet) -> PipelineResult<Artifact> {
        let operator = self.operator.as_ref();
        operator.header("Build firmware");
        let compiler = tools
            .get(COMPILER_TOOL)
            .ok_or_else(|| PipelineError::ToolMissing(vec![COMPILER_TOOL.to_string()]))?;
        let builder = Builder::new(
            self.runner.clone(),
            compiler,
            &self.config.sketch_dir,
            &self.config.build_dir,
        );

        operator.say(Tone::Progress, "Compiling...");
        let artifact = builder.build(info)?;
        operator.say(
            Tone::Success,
            &format!("Build succeeded: {}", artifact.file_name()),
        );
        operator.say(
            Tone::Plain,
            &format!("Size: {:.2} KiB", artifact.size_kib()),
        );
        operator.say(Tone::Detail, &format!("BLAKE3: {}", artifact.digest));
        Ok(artifact)
    }

    fn credentials_label(source: &CredentialSource) -> String {
        match source {
            CredentialSource::ServiceAccount(path) => {
                format!("Using service account: {}", path.display())
            }
            CredentialSource::Ambient => "Trying default credentials...".to_string(),
        }
    }

    fn publisher(&self, tools: &ToolSet) -> ArtifactPublisher {
        let c = &self.config;
        let credentials = discover_credentials(&c.storage.credential_files);
        let storage = self.storage.clone().unwrap_or_else(|| {
            let tokens = token_provider(&credentials, self.runner.clone(), &self.locator);
            let config =
                GcsConfig::new(&c.storage.project).with_api_base(&c.endpoints.storage_api);
            let client: Arc<dyn ObjectStorage> = Arc::new(GcsClient::new(config, tokens));
            client
        });

        let mut publisher = ArtifactPublisher::new().with_debug(self.debug);
        publisher.add_backend(Box::new(GithubReleaseBackend::new(
            self.runner.clone(),
            tools.get("gh"),
            &c.github.repo,
            &c.github.host,
            c.staging_dir(),
        )));
        publisher.add_backend(Box::new(
            StorageSdkBackend::new(
                storage,
                &c.storage.primary_bucket,
                &c.storage.fallback_bucket,
                &c.storage.location,
            )
            .with_credentials_label(Self::credentials_label(&credentials)),
        ));
        publisher.add_backend(Box::new(GsutilBackend::new(
            self.runner.clone(),
            tools.get("gsutil"),
            &c.storage.primary_bucket,
        )));
        publisher.add_backend(Box::new(ManualBackend::new(
            &c.storage.primary_bucket,
            c.storage_console_url(),
        )));
        publisher
    }

    fn updater(&self, tools: &ToolSet) -> RecordUpdater {
        let c = &self.config;
        let credentials = discover_credentials(&c.records.credential_files);
        let documents = self.documents.clone().unwrap_or_else(|| {
            let tokens = token_provider(&credentials, self.runner.clone(), &self.locator);
            let config =
                FirestoreConfig::new(&c.storage.project).with_api_base(&c.endpoints.firestore_api);
            let client: Arc<dyn DocumentStore> = Arc::new(FirestoreClient::new(config, tokens));
            client
        });

        let mut updater = RecordUpdater::new();
        updater.add_tier(Box::new(
            DirectStoreTier::new(documents, &c.records.collection)
                .with_credentials_label(Self::credentials_label(&credentials)),
        ));
        updater.add_tier(Box::new(NodeScriptTier::new(
            self.runner.clone(),
            tools.get("node"),
            &c.records.script_dir,
            &c.records.collection,
        )));
        updater.add_tier(Box::new(ManualTier::new(
            &c.records.collection,
            c.records_console_url(),
        )));
        updater
    }

    fn update_record(&self, record: &VersionRecord, tools: &ToolSet) -> RecordStatus {
        let operator = self.operator.as_ref();
        match self.updater(tools).upsert(record, operator) {
            Ok(report) => match report.written_by {
                Some(tier) => RecordStatus::Written(tier),
                None => {
                    warn!(model = %record.model, "version record not written");
                    RecordStatus::Manual
                }
            },
            Err(err) => {
                warn!(error = %err, "version record update failed");
                operator.say(Tone::Error, &format!("Version record update failed: {err}"));
                print_manual_instructions(
                    operator,
                    record,
                    &self.config.records.collection,
                    &self.config.records_console_url(),
                );
                RecordStatus::Failed(err.to_string())
            }
        }
    }

    fn report(&self, summary: &ReleaseSummary) {
        let operator = self.operator.as_ref();
        operator.header("Firmware release complete");
        operator.say(Tone::Plain, &format!("Version: {}", summary.info.version));
        operator.say(Tone::Plain, &format!("Download URL: {}", summary.url));
        if summary.url.is_verified() {
            operator.say(Tone::Detail, &format!("Delivered by {}", summary.backend));
        } else {
            operator.say(
                Tone::Warning,
                "The download URL was entered by hand and has not been verified",
            );
        }
        if !summary.record.is_written() {
            operator.say(
                Tone::Warning,
                "The version record still has to be updated by hand",
            );
        }
        operator.say(
            Tone::Progress,
            "Devices will be notified of the update on their next check-in",
        );
    }
}
