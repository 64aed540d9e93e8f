use crate::error::{LockError, Result};
use std::io;
use std::net::{Ipv4Addr, SocketAddrV4, TcpListener};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

use super::ProcessLock;

/// Mutual exclusion through an exclusive bind on a loopback TCP port.
///
/// Binding a port is exclusive per host at the OS level, which makes a
/// listening socket a coordination token that needs no filesystem access.
/// The kernel closes the socket when the holding process exits, releasing
/// the lock automatically. Only the IPv4 loopback interface is used, so
/// the listener is never reachable from other machines.
#[derive(Debug)]
pub struct PortLock {
    addr: SocketAddrV4,
    listener: Mutex<Option<TcpListener>>,
}

impl PortLock {
    /// Create an unbound lock for `port` on `127.0.0.1`. Nothing is bound
    /// until `lock`/`try_lock`.
    pub fn new(port: u16) -> Self {
        PortLock {
            addr: SocketAddrV4::new(Ipv4Addr::LOCALHOST, port),
            listener: Mutex::new(None),
        }
    }

    /// The loopback address this lock binds.
    pub fn addr(&self) -> SocketAddrV4 {
        self.addr
    }
}

impl ProcessLock for PortLock {
    fn try_lock(&self) -> Result<bool> {
        let mut slot = self.listener.lock().unwrap_or_else(PoisonError::into_inner);
        match TcpListener::bind(self.addr) {
            Ok(listener) => {
                *slot = Some(listener);
                debug!("Port lock acquired: {}", self.addr);
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::AddrInUse => Ok(false),
            Err(e) => Err(LockError::BindFailed {
                addr: self.addr,
                source: e,
            }),
        }
    }

    fn unlock(&self) -> Result<()> {
        let mut slot = self.listener.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.take().is_some() {
            debug!("Port lock released: {}", self.addr);
        }
        Ok(())
    }
}
