// src/network/node.rs
use crate::utils::error::MinerError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::net::{TcpStream, lookup_host};

/// Configuration for the upstream node connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// `host:port` of the node's miner endpoint (e.g., "127.0.0.1:19000")
    pub address: String,
    /// Give up on a connection that stays silent this long (no limit if unset)
    #[serde(default)]
    pub idle_timeout_secs: Option<u64>,
    /// Reconnects a worker attempts after a transport failure
    #[serde(default = "default_reconnect_attempts")]
    pub reconnect_attempts: u32,
    /// Delay before the first reconnect; doubled for each further attempt
    #[serde(default = "default_reconnect_backoff_ms")]
    pub reconnect_backoff_ms: u64,
}

fn default_reconnect_attempts() -> u32 {
    3
}

fn default_reconnect_backoff_ms() -> u64 {
    500
}

impl NodeConfig {
    /// Config for `address` with default timeouts and retry policy
    pub fn new(address: impl Into<String>) -> Self {
        NodeConfig {
            address: address.into(),
            idle_timeout_secs: None,
            reconnect_attempts: default_reconnect_attempts(),
            reconnect_backoff_ms: default_reconnect_backoff_ms(),
        }
    }

    /// Read deadline, if one is configured
    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_secs.map(Duration::from_secs)
    }

    /// Delay before reconnect number `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.reconnect_backoff_ms.saturating_mul(factor))
    }
}

/// Opens the transport to the node
///
/// Accepts either `ip:port` or `hostname:port`. Nagle's algorithm is
/// disabled so submissions leave immediately.
///
/// # Errors
/// Returns `MinerError::ConnectionError` if the address does not resolve
/// or the node is unreachable.
pub async fn connect(address: &str) -> Result<TcpStream, MinerError> {
    let mut addrs = lookup_host(address).await.map_err(|e| {
        MinerError::ConnectionError(format!("Cannot resolve '{}': {}", address, e))
    })?;
    let addr = addrs.next().ok_or_else(|| {
        MinerError::ConnectionError(format!("No addresses found for '{}'", address))
    })?;

    let stream = TcpStream::connect(addr).await.map_err(|e| {
        MinerError::ConnectionError(format!("Connection to '{}' failed: {}", address, e))
    })?;
    stream.set_nodelay(true)?;
    Ok(stream)
}
