use crate::error::{LockError, Result};
use std::path::Path;
use tracing::{debug, warn};

use super::{DirLock, ProcessLock};

/// Acquire a [`DirLock`] on every path in `dirs`, all or nothing.
///
/// Paths are attempted in the order given. If any attempt fails — whether
/// busy or a hard error — every lock acquired so far is released before
/// the call returns, so the caller never holds a partial set. A busy
/// member is reported as [`LockError::AlreadyLocked`] naming the path.
pub fn lock_dirs<I, P>(dirs: I) -> Result<DirLockSet>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut acquired: Vec<DirLock> = Vec::new();
    for dir in dirs {
        match acquire_one(dir.as_ref()) {
            Ok(lock) => acquired.push(lock),
            Err(e) => {
                rollback(&acquired);
                return Err(e);
            }
        }
    }
    debug!("Acquired {} directory locks", acquired.len());
    Ok(DirLockSet { locks: acquired })
}

fn acquire_one(path: &Path) -> Result<DirLock> {
    let lock = DirLock::new(path)?;
    if lock.try_lock()? {
        Ok(lock)
    } else {
        Err(LockError::AlreadyLocked {
            path: path.to_path_buf(),
        })
    }
}

fn rollback(held: &[DirLock]) {
    for lock in held {
        if let Err(e) = lock.unlock() {
            warn!(
                "Failed to release {} during rollback (non-fatal): {}",
                lock.marker_path().display(),
                e
            );
        }
    }
}

/// An ordered set of held directory locks, releasable at once.
///
/// Only produced by [`lock_dirs`]; every member is held for as long as the
/// set exists.
#[derive(Debug)]
pub struct DirLockSet {
    locks: Vec<DirLock>,
}

impl DirLockSet {
    /// The held locks, in acquisition order.
    pub fn locks(&self) -> &[DirLock] {
        &self.locks
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    /// Release every lock in the set.
    ///
    /// A failed release does not stop the remaining releases; the first
    /// failure is returned once every member has been attempted.
    pub fn unlock(self) -> Result<()> {
        let mut first_err = None;
        for lock in &self.locks {
            if let Err(e) = lock.unlock() {
                warn!(
                    "Failed to release {}: {}",
                    lock.marker_path().display(),
                    e
                );
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl IntoIterator for DirLockSet {
    type Item = DirLock;
    type IntoIter = std::vec::IntoIter<DirLock>;

    fn into_iter(self) -> Self::IntoIter {
        self.locks.into_iter()
    }
}
