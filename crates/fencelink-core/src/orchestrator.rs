// ── Geofence write orchestration ──
//
// Called after a geofence is persisted. Resolves the target group, reduces
// the geometry, encodes one frame, and queues one unit per member device.
// Nothing here can fail the write: every problem becomes a skip or a
// dropped unit reported through the `DispatchReporter`.

use std::sync::Arc;

use serde::Serialize;

use crate::dispatch::{DispatchPool, DispatchReporter, DispatchUnit, SkipReason};
use crate::frame::DownlinkCommand;
use crate::geometry::reduce;
use crate::model::Geofence;
use crate::store::GroupDirectory;

/// What a geofence write scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Scheduling {
    /// Units handed to the pool. `rejected` were dropped at submission.
    Queued { devices: usize, rejected: usize },
    /// No units created.
    Skipped(SkipReason),
}

impl Scheduling {
    pub fn queued(&self) -> usize {
        match self {
            Self::Queued { devices, rejected } => devices - rejected,
            Self::Skipped(_) => 0,
        }
    }
}

/// Fans a persisted geofence out to its group's devices.
pub struct Orchestrator<D> {
    directory: Arc<D>,
    pool: Arc<DispatchPool>,
    reporter: Arc<dyn DispatchReporter>,
}

impl<D> Clone for Orchestrator<D> {
    fn clone(&self) -> Self {
        Self {
            directory: Arc::clone(&self.directory),
            pool: Arc::clone(&self.pool),
            reporter: Arc::clone(&self.reporter),
        }
    }
}

impl<D: GroupDirectory> Orchestrator<D> {
    pub fn new(
        directory: Arc<D>,
        pool: Arc<DispatchPool>,
        reporter: Arc<dyn DispatchReporter>,
    ) -> Self {
        Self {
            directory,
            pool,
            reporter,
        }
    }

    pub fn pool(&self) -> &Arc<DispatchPool> {
        &self.pool
    }

    /// Schedule downlinks for a created or updated geofence.
    ///
    /// Returns once every unit is queued or dropped; never waits for
    /// network I/O.
    pub async fn on_geofence_write(&self, geofence: &Geofence) -> Scheduling {
        let group = match self.directory.device_group(&geofence.group_id).await {
            Ok(Some(group)) if !group.is_empty() => group,
            Ok(Some(_)) => return self.skip(geofence, SkipReason::EmptyGroup),
            Ok(None) => return self.skip(geofence, SkipReason::GroupNotFound),
            Err(e) => return self.skip(geofence, SkipReason::LookupFailed(e.to_string())),
        };

        if geofence.geometry.is_degenerate() {
            self.reporter.geometry_defaulted(geofence);
        }

        let footprint = reduce(&geofence.geometry);
        let frame = DownlinkCommand::from_footprint(&footprint).encode();
        self.reporter.scheduled(geofence, &footprint, group.len());

        let devices = group.len();
        let rejected = group
            .devices
            .into_iter()
            .filter(|device| !self.pool.submit(DispatchUnit::new(device.clone(), frame)))
            .count();

        Scheduling::Queued { devices, rejected }
    }

    fn skip(&self, geofence: &Geofence, reason: SkipReason) -> Scheduling {
        self.reporter.skipped(geofence, &reason);
        Scheduling::Skipped(reason)
    }
}
