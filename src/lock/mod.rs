mod batch;
mod dir;
mod file;
mod port;

pub use batch::{lock_dirs, DirLockSet};
pub use dir::DirLock;
pub use file::FileLock;
pub use port::PortLock;

use crate::backoff::Backoff;
use crate::error::Result;

/// Capability contract shared by every lock kind.
///
/// Contention and hard failure are kept apart by the return type of
/// [`try_lock`](ProcessLock::try_lock): `Ok(false)` means the resource is
/// held by someone else, `Err(_)` is reserved for unexpected I/O failures.
pub trait ProcessLock {
    /// Attempt to acquire the lock without blocking.
    fn try_lock(&self) -> Result<bool>;

    /// Acquire the lock, blocking until it is held or a hard error occurs.
    ///
    /// The default implementation polls [`try_lock`](ProcessLock::try_lock)
    /// with a fresh default [`Backoff`]. There is no timeout or
    /// cancellation; a caller that needs a deadline should wrap `try_lock`
    /// with its own timer.
    fn lock(&self) -> Result<()> {
        self.lock_with(Backoff::default())
    }

    /// Like [`lock`](ProcessLock::lock), with a caller-supplied retry
    /// policy.
    fn lock_with(&self, mut backoff: Backoff) -> Result<()> {
        loop {
            if self.try_lock()? {
                return Ok(());
            }
            backoff.sleep();
        }
    }

    /// Release a held lock. A no-op on a handle that holds nothing.
    fn unlock(&self) -> Result<()>;
}
