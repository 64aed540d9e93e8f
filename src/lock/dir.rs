use crate::error::{LockError, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::ProcessLock;

/// Name appended to (or nested under) the locked path to form the marker.
const MARKER_NAME: &str = ".lock";

/// Mutual exclusion through atomic directory creation.
///
/// The marker directory is the lock token: `mkdir` is atomic with respect
/// to concurrent creators, so at most one caller observes success when
/// many race.
///
/// Unlike [`FileLock`](super::FileLock) and [`PortLock`](super::PortLock),
/// the OS does not release this lock when the holder exits. A crashed
/// holder leaves a stale marker that must be removed by hand; callers may
/// rely on the stale marker to notice an unclean shutdown.
#[derive(Debug, Clone)]
pub struct DirLock {
    marker: PathBuf,
}

impl DirLock {
    /// Resolve the marker path for `path`, which must already exist.
    ///
    /// If `path` is a directory the marker is a `.lock` subdirectory
    /// inside it; otherwise the marker is `path` with `.lock` appended.
    /// No lock is taken.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let meta = fs::symlink_metadata(path).map_err(|e| LockError::StatFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        let marker = if meta.is_dir() {
            path.join(MARKER_NAME)
        } else {
            let mut name = path.as_os_str().to_os_string();
            name.push(MARKER_NAME);
            PathBuf::from(name)
        };
        Ok(DirLock { marker })
    }

    /// Path of the marker directory whose existence represents "held".
    pub fn marker_path(&self) -> &Path {
        &self.marker
    }
}

fn create_marker(path: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        // Owner-only, with the traversal bit so the marker can be removed.
        fs::DirBuilder::new().mode(0o700).create(path)
    }
    #[cfg(not(unix))]
    {
        fs::create_dir(path)
    }
}

impl ProcessLock for DirLock {
    fn try_lock(&self) -> Result<bool> {
        match create_marker(&self.marker) {
            Ok(()) => {
                debug!("Directory lock acquired: {}", self.marker.display());
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(LockError::MarkerCreateFailed {
                path: self.marker.clone(),
                source: e,
            }),
        }
    }

    /// Removes the marker. Errors are propagated, including "not found"
    /// when the marker was already removed.
    fn unlock(&self) -> Result<()> {
        fs::remove_dir(&self.marker).map_err(|e| LockError::MarkerRemoveFailed {
            path: self.marker.clone(),
            source: e,
        })?;
        debug!("Directory lock released: {}", self.marker.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_marker_is_subdirectory_for_directories() {
        let temp = TempDir::new().unwrap();
        let lock = DirLock::new(temp.path()).unwrap();
        assert_eq!(lock.marker_path(), temp.path().join(".lock"));
    }

    #[test]
    fn test_marker_is_suffix_for_files() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("data.txt");
        fs::write(&file, "").unwrap();

        let lock = DirLock::new(&file).unwrap();
        assert_eq!(lock.marker_path(), temp.path().join("data.txt.lock"));
    }

    #[test]
    fn test_new_requires_existing_path() {
        let temp = TempDir::new().unwrap();
        let result = DirLock::new(temp.path().join("missing"));
        assert!(matches!(
            result.unwrap_err(),
            LockError::StatFailed { .. }
        ));
    }
}
