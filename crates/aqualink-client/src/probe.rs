//! Network reachability probes.
//!
//! The client asks the probe before every call; when it reports offline, the
//! call is answered from the response cache without touching the network.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;

/// Reports whether the device currently has network connectivity.
#[async_trait]
pub trait NetworkProbe: Send + Sync {
    /// `true` if requests are worth attempting.
    async fn is_online(&self) -> bool;
}

/// Probe that always reports online.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOnline;

#[async_trait]
impl NetworkProbe for AlwaysOnline {
    async fn is_online(&self) -> bool {
        true
    }
}

/// Probe whose answer is set explicitly.
#[derive(Debug)]
pub struct ManualProbe {
    online: AtomicBool,
}

impl ManualProbe {
    /// Create a probe with the given initial state.
    #[must_use]
    pub const fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    /// Change the reported state.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Relaxed);
    }
}

impl Default for ManualProbe {
    fn default() -> Self {
        Self::new(true)
    }
}

#[async_trait]
impl NetworkProbe for ManualProbe {
    async fn is_online(&self) -> bool {
        self.online.load(Ordering::Relaxed)
    }
}

/// Probe that opens a TCP connection to a well-known address.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    addr: String,
    timeout: Duration,
}

impl TcpProbe {
    /// Probe `addr` (`host:port`), giving up after `timeout`.
    #[must_use]
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            timeout,
        }
    }
}

#[async_trait]
impl NetworkProbe for TcpProbe {
    async fn is_online(&self) -> bool {
        let connect = tokio::net::TcpStream::connect(self.addr.as_str());
        match tokio::time::timeout(self.timeout, connect).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                tracing::debug!(addr = %self.addr, error = %e, "Reachability probe failed");
                false
            }
            Err(_) => {
                tracing::debug!(addr = %self.addr, "Reachability probe timed out");
                false
            }
        }
    }
}
