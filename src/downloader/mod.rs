//! The sync run: manifest discovery, filtering and sequential transfer.
//!
//! A run moves through the stages in [`Stage`] order:
//! - credentials are completed from the config, the URL, or the prompt
//! - the manifest is fetched once and parsed
//! - each entry is filtered ([`selection`])
//! - each selected artifact is mapped to a local path and downloaded
//!
//! Artifacts are handled one at a time in manifest order. The first error
//! ends the run; artifacts written before it stay on disk.

pub mod selection;


use crate::config::{Endpoint, SyncConfig};
use crate::credentials::{CredentialField, CredentialPrompt, Credentials};
use crate::error::{Error, Result};
use crate::manifest::{self, ArtifactDescriptor, MANIFEST_FILE_NAME};
use crate::paths;
use crate::transfer::{BuildLocation, Transfer};
use crate::types::{Stage, SyncReport, SyncSummary, SyncedArtifact};
use selection::{ArtifactFilter, Selection};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Synchronizes the artifacts of one build into a local directory
#[derive(Clone, Debug)]
pub struct ArtifactDownloader {
    config: SyncConfig,
    endpoint: Endpoint,
    filter: ArtifactFilter,
    out_dir: PathBuf,
}

impl ArtifactDownloader {
    /// Create a downloader for `config`.
    ///
    /// `working_dir` anchors a relative (or missing) output directory; the
    /// process working directory is never read implicitly.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is not runnable.
    pub fn new(config: SyncConfig, working_dir: &Path) -> Result<Self> {
        config.validate()?;
        let endpoint = config.endpoint()?;
        let filter = ArtifactFilter::new(config.include_hidden, config.glob_pattern());
        let out_dir = config.output_dir(working_dir);

        Ok(Self {
            config,
            endpoint,
            filter,
            out_dir,
        })
    }

    /// The directory artifacts are written to
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Run the sync.
    ///
    /// Missing credentials are requested from `prompt`; if it cancels, the run
    /// returns [`SyncReport::Cancelled`] without contacting the server. In
    /// verbose mode the remote path of every selected artifact is written as a
    /// line to `progress`, dry run or not.
    ///
    /// # Errors
    ///
    /// The first failure aborts the run: [`Error::ManifestFetch`] or
    /// [`Error::InvalidManifest`] before any artifact is touched,
    /// [`Error::Transfer`], [`Error::Filesystem`] or
    /// [`Error::InvalidArtifactPath`] while handling an artifact.
    pub async fn run<W>(&self, prompt: &dyn CredentialPrompt, progress: &mut W) -> Result<SyncReport>
    where
        W: Write,
    {
        tracing::info!(
            url = %self.endpoint.url,
            build_type = %self.config.build_type,
            build_id = %self.config.build_id,
            out_dir = %self.out_dir.display(),
            dry_run = self.config.dry_run,
            "starting artifact sync"
        );

        let Some(credentials) = self.resolve_credentials(prompt).await else {
            tracing::info!(stage = %Stage::Credentials, "credential prompt cancelled, nothing to do");
            return Ok(SyncReport::Cancelled);
        };

        let transfer = Transfer::new(&credentials, self.config.timeout)?;
        let build = BuildLocation::new(
            self.endpoint.url.clone(),
            &self.config.build_type,
            &self.config.build_id,
        );

        let artifacts = self
            .fetch_manifest(&transfer, &build)
            .await
            .inspect_err(|e| log_failure(Stage::Manifest, e))?;

        let mut summary = SyncSummary {
            dry_run: self.config.dry_run,
            ..Default::default()
        };

        for artifact in &artifacts {
            let remote_path = artifact.full_name();
            match self.filter.check(&remote_path) {
                Selection::Selected => {}
                Selection::Hidden => {
                    tracing::debug!(stage = %Stage::Filtering, artifact = %remote_path, "skipping hidden artifact");
                    summary.skipped_hidden += 1;
                    continue;
                }
                Selection::GlobMismatch => {
                    tracing::debug!(stage = %Stage::Filtering, artifact = %remote_path, glob = %self.config.glob, "artifact does not match glob");
                    summary.skipped_glob += 1;
                    continue;
                }
            }

            let synced = self
                .sync_artifact(&transfer, &build, remote_path, progress)
                .await
                .inspect_err(|e| log_failure(Stage::Transferring, e))?;
            summary.artifacts.push(synced);
        }

        tracing::info!(
            stage = %Stage::Done,
            selected = summary.artifacts.len(),
            downloaded = summary.downloaded(),
            bytes = summary.total_bytes(),
            skipped_hidden = summary.skipped_hidden,
            skipped_glob = summary.skipped_glob,
            "artifact sync finished"
        );
        Ok(SyncReport::Completed(summary))
    }

    /// Complete the credentials: config first, then the URL, then the prompt.
    /// `None` when the prompt was cancelled.
    async fn resolve_credentials(&self, prompt: &dyn CredentialPrompt) -> Option<Credentials> {
        let username = match non_blank(self.config.username.as_deref())
            .or_else(|| non_blank(self.endpoint.username.as_deref()))
        {
            Some(username) => username,
            None => prompt.prompt(CredentialField::Username).await?,
        };

        let password = match non_blank(self.config.password.as_deref())
            .or_else(|| non_blank(self.endpoint.password.as_deref()))
        {
            Some(password) => password,
            None => prompt.prompt(CredentialField::Password).await?,
        };

        Some(Credentials::new(username, password))
    }

    /// Fetch and parse the build's manifest
    async fn fetch_manifest(
        &self,
        transfer: &Transfer,
        build: &BuildLocation,
    ) -> Result<Vec<ArtifactDescriptor>> {
        let url = build.file_url(MANIFEST_FILE_NAME)?;
        tracing::debug!(stage = %Stage::Manifest, url = %url, "fetching artifact manifest");

        let content = transfer
            .fetch_bytes(&url)
            .await
            .map_err(Error::into_manifest_fetch)?;
        let artifacts = manifest::parse_manifest(&content)?;

        tracing::info!(stage = %Stage::Manifest, count = artifacts.len(), "artifact manifest loaded");
        Ok(artifacts)
    }

    /// Map one selected artifact to its local path and download it
    async fn sync_artifact<W>(
        &self,
        transfer: &Transfer,
        build: &BuildLocation,
        remote_path: String,
        progress: &mut W,
    ) -> Result<SyncedArtifact>
    where
        W: Write,
    {
        let local_path = paths::resolve_local_path(&remote_path, self.config.flatten, &self.out_dir)?;
        paths::ensure_parent_dir(&local_path).await?;

        let bytes = if self.config.dry_run {
            tracing::debug!(stage = %Stage::Transferring, artifact = %remote_path, path = %local_path.display(), "dry run, not downloading");
            None
        } else {
            let url = build.file_url(&remote_path)?;
            tracing::debug!(stage = %Stage::Transferring, artifact = %remote_path, url = %url, "downloading artifact");
            Some(transfer.download_to_file(&url, &local_path).await?)
        };

        if self.config.verbose {
            writeln!(progress, "{remote_path}")?;
        }

        Ok(SyncedArtifact {
            remote_path,
            local_path,
            bytes,
        })
    }
}

/// A configured credential half, with blank values treated as missing
fn non_blank(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

fn log_failure(stage: Stage, error: &Error) {
    tracing::error!(stage = %stage, code = error.error_code(), error = %error, "artifact sync failed");
}
