//! Mapping remote artifact paths onto the local filesystem

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Separator used by the build server in artifact paths, on every platform
pub const REMOTE_SEPARATOR: char = '/';

/// Compute where a remote artifact is written locally.
///
/// The remote path is split on `/` and re-joined with the local separator below
/// `out_dir`. With `flatten` only the final segment (the file name) is kept, so
/// every artifact lands directly in `out_dir`.
///
/// Empty and `.` segments are dropped. A `..` segment is rejected so an artifact
/// can never be written outside `out_dir`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use tcad::paths::resolve_local_path;
///
/// let out = Path::new("/out/");
/// assert_eq!(
///     resolve_local_path("sub/dir/file.txt", false, out).unwrap(),
///     Path::new("/out/sub/dir/file.txt")
/// );
/// assert_eq!(
///     resolve_local_path("sub/dir/file.txt", true, out).unwrap(),
///     Path::new("/out/file.txt")
/// );
/// ```
pub fn resolve_local_path(remote_path: &str, flatten: bool, out_dir: &Path) -> Result<PathBuf> {
    let mut segments = Vec::new();
    for segment in remote_path.split(REMOTE_SEPARATOR) {
        match segment {
            "" | "." => continue,
            ".." => {
                return Err(Error::InvalidArtifactPath {
                    path: remote_path.to_string(),
                    reason: "parent directory segments are not allowed".to_string(),
                });
            }
            // Backslashes are directory separators on Windows and would let a
            // segment escape the output directory there.
            s if cfg!(windows) && s.contains('\\') => {
                return Err(Error::InvalidArtifactPath {
                    path: remote_path.to_string(),
                    reason: "backslashes are not allowed in path segments".to_string(),
                });
            }
            s => segments.push(s),
        }
    }

    if flatten {
        let file_name = segments.pop();
        segments.clear();
        segments.extend(file_name);
    }

    if segments.is_empty() {
        return Err(Error::InvalidArtifactPath {
            path: remote_path.to_string(),
            reason: "path has no file name".to_string(),
        });
    }

    let mut local = out_dir.to_path_buf();
    local.extend(segments);
    Ok(local)
}

/// Create the parent directory of `path`, including missing ancestors.
///
/// Succeeds without doing anything when the directory already exists.
pub async fn ensure_parent_dir(path: &Path) -> Result<()> {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };

    tokio::fs::create_dir_all(parent)
        .await
        .map_err(|source| Error::Filesystem {
            path: parent.to_path_buf(),
            source,
        })
}
