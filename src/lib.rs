//! Mutual-exclusion primitives for coordinating processes on a single host.
//!
//! Each lock kind turns an OS-managed resource into a lock token:
//!
//! - [`FileLock`]: an exclusive advisory lock on an open file handle.
//! - [`DirLock`]: atomic creation of a marker directory.
//! - [`PortLock`]: an exclusive bind on a loopback TCP port.
//!
//! All three implement [`ProcessLock`], with a non-blocking `try_lock`, a
//! blocking `lock`, and `unlock`. [`lock_dirs`] acquires several directory
//! locks all-or-nothing. Blocking acquisition for [`DirLock`] and
//! [`PortLock`] polls `try_lock` with an exponential [`Backoff`]; only
//! [`FileLock`] can block inside the kernel.
//!
//! # Crash behavior
//!
//! The kinds differ when the holding process dies without unlocking: the
//! kernel releases a [`FileLock`] and closes a [`PortLock`] listener, so
//! both become available again with no cleanup. A [`DirLock`] marker
//! survives and must be removed by hand. Callers may rely on either
//! behavior, so neither is papered over here.

pub mod backoff;
pub mod error;
pub mod lock;

pub use backoff::Backoff;
pub use error::{LockError, Result};
pub use lock::{lock_dirs, DirLock, DirLockSet, FileLock, PortLock, ProcessLock};
