//! Core types describing the outcome of a sync run

use std::path::PathBuf;

/// An artifact selected for syncing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncedArtifact {
    /// Path relative to the build's artifact root, `/`-separated
    pub remote_path: String,
    /// Where the artifact was (or, in a dry run, would have been) written
    pub local_path: PathBuf,
    /// Bytes written, `None` in a dry run
    pub bytes: Option<u64>,
}

/// Counters and artifacts of a finished run
#[must_use]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Artifacts that passed both filters, in manifest order
    pub artifacts: Vec<SyncedArtifact>,
    /// Entries skipped because they are server-generated hidden artifacts
    pub skipped_hidden: usize,
    /// Entries skipped because they did not match the glob
    pub skipped_glob: usize,
    /// Whether the run was a dry run
    pub dry_run: bool,
}

impl SyncSummary {
    /// Total bytes written across all artifacts
    pub fn total_bytes(&self) -> u64 {
        self.artifacts.iter().filter_map(|a| a.bytes).sum()
    }

    /// Number of artifacts actually downloaded
    pub fn downloaded(&self) -> usize {
        self.artifacts.iter().filter(|a| a.bytes.is_some()).count()
    }
}

/// Outcome of a run that did not fail
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncReport {
    /// The run went through the manifest
    Completed(SyncSummary),
    /// The credential prompt was cancelled; nothing was done
    Cancelled,
}

impl SyncReport {
    /// The summary of a completed run
    pub fn summary(&self) -> Option<&SyncSummary> {
        match self {
            SyncReport::Completed(summary) => Some(summary),
            SyncReport::Cancelled => None,
        }
    }
}

/// Stage of a sync run, recorded in log events
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Completing credentials
    Credentials,
    /// Fetching and parsing the manifest
    Manifest,
    /// Applying the hidden and glob filters
    Filtering,
    /// Resolving paths and downloading artifacts
    Transferring,
    /// Every selected artifact was handled
    Done,
}

impl Stage {
    /// Lowercase name for log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Credentials => "credentials",
            Stage::Manifest => "manifest",
            Stage::Filtering => "filtering",
            Stage::Transferring => "transferring",
            Stage::Done => "done",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
