use std::io;
use std::net::SocketAddrV4;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("Failed to open lock file {path}: {source}")]
    OpenFailed { path: PathBuf, source: io::Error },

    #[error("Failed to lock {path}: {source}")]
    FileLockFailed { path: PathBuf, source: io::Error },

    #[error("Failed to unlock {path}: {source}")]
    FileUnlockFailed { path: PathBuf, source: io::Error },

    #[error("Failed to stat {path}: {source}")]
    StatFailed { path: PathBuf, source: io::Error },

    #[error("Failed to create lock marker {path}: {source}")]
    MarkerCreateFailed { path: PathBuf, source: io::Error },

    #[error("Failed to remove lock marker {path}: {source}")]
    MarkerRemoveFailed { path: PathBuf, source: io::Error },

    #[error("Failed to bind {addr}: {source}")]
    BindFailed {
        addr: SocketAddrV4,
        source: io::Error,
    },

    #[error("{path} is already locked")]
    AlreadyLocked { path: PathBuf },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl LockError {
    /// True for the batch helper's "some member was busy" condition, as
    /// opposed to a hard I/O failure.
    pub fn is_already_locked(&self) -> bool {
        matches!(self, LockError::AlreadyLocked { .. })
    }
}

pub type Result<T> = std::result::Result<T, LockError>;
