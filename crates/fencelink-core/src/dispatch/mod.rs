// ── Downlink dispatch ──
//
// A `Dispatcher` turns one (device, frame) pair into one queue request.
// It never returns an error: every attempt ends as a `DispatchOutcome`
// handed to the reporter, and the caller only learns whether it worked.

mod pool;
mod reporter;

pub use pool::{DispatchPool, DispatchUnit};
pub use reporter::{DispatchReporter, DropReason, RecordingReporter, SkipReason, TracingReporter};

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use fencelink_api::{DeviceQueueItem, QueueClient};

use crate::config::{DEFAULT_F_PORT, DispatchConfig};
use crate::error::CoreError;
use crate::frame::Frame;
use crate::model::DeviceId;

/// Result of a single dispatch attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchOutcome {
    pub device: DeviceId,
    pub delivered: bool,
    /// Frame counter assigned by the network server, when it reported one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub f_cnt: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub finished_at: DateTime<Utc>,
}

/// Sends encoded frames to the network server's device queue.
///
/// Cheap to clone; clones share the HTTP connection pool and reporter.
#[derive(Clone)]
pub struct Dispatcher {
    client: QueueClient,
    f_port: u8,
    confirmed: bool,
    reporter: Arc<dyn DispatchReporter>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("base_url", &self.client.base_url().as_str())
            .field("f_port", &self.f_port)
            .field("confirmed", &self.confirmed)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(client: QueueClient, reporter: Arc<dyn DispatchReporter>) -> Self {
        Self {
            client,
            f_port: DEFAULT_F_PORT,
            confirmed: false,
            reporter,
        }
    }

    /// Build a dispatcher (and its HTTP client) from runtime config.
    pub fn from_config(
        config: &DispatchConfig,
        reporter: Arc<dyn DispatchReporter>,
    ) -> Result<Self, CoreError> {
        Ok(Self::new(config.queue_client()?, reporter)
            .with_f_port(config.f_port)
            .with_confirmed(config.confirmed))
    }

    #[must_use]
    pub fn with_f_port(mut self, f_port: u8) -> Self {
        self.f_port = f_port;
        self
    }

    #[must_use]
    pub fn with_confirmed(mut self, confirmed: bool) -> Self {
        self.confirmed = confirmed;
        self
    }

    pub fn reporter(&self) -> &Arc<dyn DispatchReporter> {
        &self.reporter
    }

    /// Enqueue `frame` for `device` and report the outcome.
    ///
    /// Exactly one request, no retries. Failures of any kind (transport,
    /// timeout, non-200 status) are reported and yield `delivered: false`.
    pub async fn attempt(&self, device: &DeviceId, frame: &Frame) -> DispatchOutcome {
        let item = DeviceQueueItem {
            confirmed: self.confirmed,
            data: frame.to_base64(),
            dev_eui: device.as_str().to_owned(),
            f_port: self.f_port,
        };

        debug!(device = %device, frame = ?frame, "enqueueing geofence downlink");

        let outcome = match self.client.enqueue(&item).await {
            Ok(resp) => DispatchOutcome {
                device: device.clone(),
                delivered: true,
                f_cnt: resp.f_cnt,
                error: None,
                finished_at: Utc::now(),
            },
            Err(e) => DispatchOutcome {
                device: device.clone(),
                delivered: false,
                f_cnt: None,
                error: Some(e.to_string()),
                finished_at: Utc::now(),
            },
        };

        self.reporter.dispatched(&outcome);
        outcome
    }

    /// Like [`attempt`](Self::attempt), reduced to the success flag.
    pub async fn send(&self, device: &DeviceId, frame: &Frame) -> bool {
        self.attempt(device, frame).await.delivered
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dispatcher(reporter: Arc<RecordingReporter>) -> Dispatcher {
        // Port 9 (discard) on loopback: connection refused, fast.
        let client = QueueClient::from_reqwest("http://127.0.0.1:9/api", reqwest::Client::new())
            .unwrap();
        Dispatcher::new(client, reporter)
    }

    #[tokio::test]
    async fn unreachable_server_yields_failed_outcome() {
        let reporter = Arc::new(RecordingReporter::new());
        let dispatcher = dispatcher(Arc::clone(&reporter));
        let device = DeviceId::from("0011223344556677");

        let ok = dispatcher
            .send(&device, &crate::frame::encode(1.0, 2.0, 3))
            .await;

        assert!(!ok);
        let outcome = reporter.outcome_for(&device).unwrap();
        assert!(!outcome.delivered);
        assert!(outcome.error.is_some());
        assert_eq!(outcome.f_cnt, None);
    }

    #[test]
    fn builders_override_defaults() {
        let reporter = Arc::new(RecordingReporter::new());
        let d = dispatcher(reporter).with_f_port(42).with_confirmed(true);
        assert_eq!(d.f_port, 42);
        assert!(d.confirmed);
    }
}
