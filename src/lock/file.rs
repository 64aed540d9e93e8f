use crate::error::{LockError, Result};
use fs2::FileExt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

use super::ProcessLock;

/// Check if an I/O error indicates lock contention (file locked by another process)
fn is_lock_contention(e: &io::Error) -> bool {
    // WouldBlock (Unix)
    if e.kind() == io::ErrorKind::WouldBlock {
        return true;
    }
    // Windows-specific lock errors
    // ERROR_LOCK_VIOLATION (33) - file region is locked
    // ERROR_SHARING_VIOLATION (32) - file in use by another process
    #[cfg(windows)]
    if let Some(code) = e.raw_os_error() {
        if code == 33 || code == 32 {
            return true;
        }
    }
    false
}

/// Exclusive advisory lock on an existing file.
///
/// The lock is cooperative: processes that never take it can still read and
/// write the file. The kernel drops the lock when the holding process
/// exits, so a crashed holder leaves nothing behind. This is the only lock
/// kind whose blocking [`lock`](ProcessLock::lock) suspends inside the
/// kernel instead of polling.
///
/// The open handle lives behind a mutex so that threads sharing one
/// `FileLock` serialize their `lock`/`try_lock`/`unlock` calls.
#[derive(Debug)]
pub struct FileLock {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl FileLock {
    /// Open `path` and wrap it in an unlocked handle.
    ///
    /// Fails if the file does not exist or is not readable; the file is
    /// never created.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = open(&path)?;
        Ok(FileLock {
            path,
            file: Mutex::new(Some(file)),
        })
    }

    /// Path of the locked file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| LockError::OpenFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

impl ProcessLock for FileLock {
    fn try_lock(&self) -> Result<bool> {
        let mut slot = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        let file = match slot.take() {
            Some(file) => file,
            None => open(&self.path)?,
        };
        let attempt = file.try_lock_exclusive();
        *slot = Some(file);

        match attempt {
            Ok(()) => {
                debug!("File lock acquired: {}", self.path.display());
                Ok(true)
            }
            Err(e) if is_lock_contention(&e) => Ok(false),
            Err(e) => Err(LockError::FileLockFailed {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    /// Kernel-blocking acquisition; the calling thread suspends until the
    /// advisory lock is granted.
    fn lock(&self) -> Result<()> {
        let mut slot = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        let file = match slot.take() {
            Some(file) => file,
            None => open(&self.path)?,
        };
        let attempt = file.lock_exclusive();
        *slot = Some(file);

        attempt.map_err(|e| LockError::FileLockFailed {
            path: self.path.clone(),
            source: e,
        })?;
        debug!("File lock acquired (blocking): {}", self.path.display());
        Ok(())
    }

    fn unlock(&self) -> Result<()> {
        let mut slot = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        let file = match slot.take() {
            Some(file) => file,
            None => return Ok(()),
        };
        // Release the advisory lock and close the handle; the next
        // lock/try_lock reopens the file.
        let released = file.unlock();
        drop(file);
        released.map_err(|e| LockError::FileUnlockFailed {
            path: self.path.clone(),
            source: e,
        })?;
        debug!("File lock released: {}", self.path.display());
        Ok(())
    }
}
