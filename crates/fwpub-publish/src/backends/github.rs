use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fwpub_exec::{CommandRunner, Invocation};
use fwpub_types::{BackendKind, DownloadUrl, Operator, Tone};
use tracing::debug;

use crate::backend::{PublishBackend, PublishRequest};
use crate::error::{PublishError, PublishResult};

/// Download URL of a release asset. Devices can rebuild it from
/// `(model, version)` alone.
pub fn release_download_url(host: &str, repo: &str, tag: &str, file_name: &str) -> String {
    format!("https://{host}/{repo}/releases/download/{tag}/{file_name}")
}

/// Attaches the image to release `v{version}` with the `gh` CLI, creating
/// the release if it does not exist and replacing the asset if it does.
pub struct GithubReleaseBackend {
    runner: Arc<dyn CommandRunner>,
    gh: Option<PathBuf>,
    repo: String,
    host: String,
    staging_dir: PathBuf,
}

impl GithubReleaseBackend {
    /// `gh` is the located CLI, `None` if it is not installed. The renamed
    /// copy of the image is written into `staging_dir`.
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        gh: Option<PathBuf>,
        repo: impl Into<String>,
        host: impl Into<String>,
        staging_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            runner,
            gh,
            repo: repo.into(),
            host: host.into(),
            staging_dir: staging_dir.into(),
        }
    }

    /// Copy the image to `{staging_dir}/{model}_v{version}.bin` so the asset
    /// carries the canonical name. An existing copy is overwritten.
    fn stage(&self, source: &Path, file_name: &str) -> PublishResult<PathBuf> {
        let staged = self.staging_dir.join(file_name);
        if staged == source {
            return Ok(staged);
        }
        let staging_error = |source| PublishError::Staging {
            path: staged.clone(),
            source,
        };
        fs::create_dir_all(&self.staging_dir).map_err(staging_error)?;
        fs::copy(source, &staged).map_err(staging_error)?;
        Ok(staged)
    }
}

impl PublishBackend for GithubReleaseBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::VcsRelease
    }

    fn name(&self) -> &str {
        "GitHub Releases"
    }

    fn publish(
        &self,
        request: &PublishRequest<'_>,
        operator: &dyn Operator,
    ) -> PublishResult<DownloadUrl> {
        let gh = self.gh.as_ref().ok_or(PublishError::ToolUnavailable("gh"))?;
        let info = request.info;
        let tag = info.release_tag();
        let file_name = info.artifact_file_name();

        operator.say(Tone::Progress, "Uploading to GitHub Releases...");
        let staged = self.stage(&request.artifact.local_path, &file_name)?;
        operator.say(Tone::Detail, &format!("Repository: {}", self.repo));
        operator.say(Tone::Detail, &format!("Tag: {tag}"));

        let repo = self.repo.as_str();
        let view = Invocation::new(gh).args(["release", "view", tag.as_str(), "--repo", repo]);
        let exists = self.runner.run(&view)?.is_success();
        debug!(tag = %tag, exists, "release lookup");

        let staged_arg = staged.to_string_lossy().into_owned();
        let upload = if exists {
            operator.say(
                Tone::Detail,
                &format!("Release {tag} exists, replacing asset..."),
            );
            Invocation::new(gh).args([
                "release",
                "upload",
                tag.as_str(),
                staged_arg.as_str(),
                "--clobber",
                "--repo",
                repo,
            ])
        } else {
            operator.say(Tone::Detail, &format!("Creating release {tag}..."));
            let title = info.release_title();
            let notes = format!("Firmware version {}\n\n{}", info.version, request.changelog);
            Invocation::new(gh).args([
                "release",
                "create",
                tag.as_str(),
                staged_arg.as_str(),
                "--title",
                title.as_str(),
                "--notes",
                notes.as_str(),
                "--repo",
                repo,
            ])
        };
        self.runner.run(&upload)?.into_result(&upload)?;

        Ok(DownloadUrl::Verified(release_download_url(
            &self.host, &self.repo, &tag, &file_name,
        )))
    }
}
