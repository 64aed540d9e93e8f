//! Shared contract checks run against every lock kind.

use hostlock::{DirLock, FileLock, PortLock, ProcessLock};
use std::fs;
use std::net::{Ipv4Addr, TcpListener};
use tempfile::TempDir;

/// try-lock, release, then take the blocking path on a free resource.
fn exercise(lock: &dyn ProcessLock) {
    // Use RUST_LOG to see acquire/release diagnostics from these runs.
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    assert!(lock.try_lock().unwrap(), "resource unexpectedly busy");
    lock.unlock().unwrap();

    lock.lock().unwrap();
    lock.unlock().unwrap();
}

#[test]
fn test_file_lock_contract() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("resource.txt");
    fs::write(&target, "").unwrap();

    let lock = FileLock::new(&target).unwrap();
    exercise(&lock);
}

#[test]
fn test_dir_lock_contract() {
    let temp = TempDir::new().unwrap();

    let lock = DirLock::new(temp.path()).unwrap();
    exercise(&lock);
}

#[test]
fn test_port_lock_contract() {
    let port = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let lock = PortLock::new(port);
    exercise(&lock);
}
