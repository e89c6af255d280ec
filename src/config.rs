//! Configuration for connecting to a cluster's management API.

use std::time::Duration;

/// Connection parameters for one cluster.
///
/// The core takes address, token, and the TLS verification flag explicitly;
/// there is no default cluster and no ambient configuration.
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    /// Cluster address, host or host:port (e.g. "cluster.example.com").
    pub address: String,

    /// Bearer token for the management API (e.g. "session-v1:...").
    pub token: String,

    /// Skip TLS certificate verification. Explicit opt-in for clusters
    /// running self-signed certificates; never enabled by default.
    pub accept_invalid_certs: bool,

    /// Per-request timeout.
    pub timeout: Duration,

    /// Connection establishment timeout.
    pub connect_timeout: Duration,
}

impl ClusterConfig {
    /// Create a configuration with verification on and default timeouts.
    pub fn new(address: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            token: token.into(),
            accept_invalid_certs: false,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(8),
        }
    }

    /// Disable TLS certificate verification.
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Root URL of the management API on this cluster.
    pub fn api_root(&self) -> String {
        format!("https://{}/api", self.address)
    }
}
