// ── Runtime dispatch configuration ──
//
// These types describe *how* to reach the network server and how much
// dispatch concurrency to allow. They carry the API token but never
// touch disk; the CLI builds a `DispatchConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use fencelink_api::transport::{TlsMode, TransportConfig};
use fencelink_api::QueueClient;

use crate::error::CoreError;

/// Application port the collar firmware listens on for geofences.
pub const DEFAULT_F_PORT: u8 = 10;
/// Per-request network-server timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_WORKERS: usize = 4;
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// Bundled web PKI roots (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed network servers).
    DangerAcceptInvalid,
}

/// Worker pool sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Tasks pulling units off the queue. Each attempt runs in its own
    /// task, so this does not cap in-flight requests.
    pub workers: usize,
    /// Queued units beyond this are dropped, not awaited.
    pub queue_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Configuration for dispatching downlinks through one network server.
///
/// Built by the CLI, passed to [`Dispatcher`](crate::Dispatcher); core
/// never reads config files.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Network-server API root (e.g., `http://localhost:8080/api`).
    pub network_server: Url,
    /// Bearer token for the queue API.
    pub api_token: SecretString,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// LoRaWAN application port for geofence frames.
    pub f_port: u8,
    /// Request confirmed downlinks.
    pub confirmed: bool,
    pub pool: PoolConfig,
}

impl DispatchConfig {
    pub fn new(network_server: Url, api_token: SecretString) -> Self {
        Self {
            network_server,
            api_token,
            tls: TlsVerification::default(),
            timeout: DEFAULT_TIMEOUT,
            f_port: DEFAULT_F_PORT,
            confirmed: false,
            pool: PoolConfig::default(),
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
        }
    }

    /// Build the authenticated queue client described by this config.
    pub fn queue_client(&self) -> Result<QueueClient, CoreError> {
        Ok(QueueClient::from_token(
            self.network_server.as_str(),
            &self.api_token,
            &self.transport(),
        )?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_queue_contract() {
        let config = DispatchConfig::new(
            "http://localhost:8080/api".parse().unwrap(),
            SecretString::from("token".to_string()),
        );
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.f_port, 10);
        assert!(!config.confirmed);
        assert_eq!(config.transport().timeout, Duration::from_secs(5));
    }

    #[test]
    fn builds_queue_client() {
        let config = DispatchConfig::new(
            "http://localhost:8080/api".parse().unwrap(),
            SecretString::from("token".to_string()),
        );
        let client = config.queue_client().unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8080/api");
    }
}
