//! Hidden-artifact and glob filtering of manifest entries.

use crate::glob::GlobPattern;

/// Prefix of the artifacts TeamCity generates for its own use (build logs,
/// properties, coverage data)
pub const HIDDEN_ARTIFACT_PREFIX: &str = ".teamcity";

/// Whether a remote artifact path belongs to the hidden, server-generated set
pub fn is_hidden(remote_path: &str) -> bool {
    remote_path.starts_with(HIDDEN_ARTIFACT_PREFIX)
}

/// Why an artifact was or was not selected
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    /// Passed both filters
    Selected,
    /// Hidden artifact while hidden artifacts are excluded
    Hidden,
    /// Rejected by the glob
    GlobMismatch,
}

/// The two filters a manifest entry must pass, hidden rule first
#[derive(Clone, Debug)]
pub struct ArtifactFilter {
    include_hidden: bool,
    glob: GlobPattern,
}

impl ArtifactFilter {
    /// Build a filter
    pub fn new(include_hidden: bool, glob: GlobPattern) -> Self {
        Self {
            include_hidden,
            glob,
        }
    }

    /// Classify one remote artifact path
    pub fn check(&self, remote_path: &str) -> Selection {
        if !self.include_hidden && is_hidden(remote_path) {
            Selection::Hidden
        } else if !self.glob.is_match(remote_path) {
            Selection::GlobMismatch
        } else {
            Selection::Selected
        }
    }
}
