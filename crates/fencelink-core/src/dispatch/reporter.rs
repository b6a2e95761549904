// ── Dispatch reporting ──
//
// The dispatcher, pool, and orchestrator never log on their own; they hand
// every observable event to an injected `DispatchReporter`. The default
// reporter turns events into `tracing` records. Callers that need the
// outcomes (the CLI summary, tests) install a `RecordingReporter`.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tracing::{info, warn};

use super::DispatchOutcome;
use crate::geometry::Footprint;
use crate::model::{DeviceId, Geofence};

/// Why the orchestrator ended without scheduling anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    GroupNotFound,
    EmptyGroup,
    LookupFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GroupNotFound => f.write_str("device group not found"),
            Self::EmptyGroup => f.write_str("device group has no devices"),
            Self::LookupFailed(reason) => write!(f, "device group lookup failed: {reason}"),
        }
    }
}

/// Why the pool refused a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    QueueFull,
    ShutDown,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueueFull => f.write_str("dispatch queue full"),
            Self::ShutDown => f.write_str("dispatch pool shut down"),
        }
    }
}

/// Sink for dispatch events.
pub trait DispatchReporter: Send + Sync + 'static {
    /// One dispatch attempt finished, successfully or not.
    fn dispatched(&self, outcome: &DispatchOutcome);

    /// The pool refused a unit; it was never attempted.
    fn dropped(&self, device: &DeviceId, reason: DropReason);

    /// A write produced no dispatch.
    fn skipped(&self, geofence: &Geofence, reason: &SkipReason);

    /// Units were queued for a geofence write.
    fn scheduled(&self, _geofence: &Geofence, _footprint: &Footprint, _devices: usize) {}

    /// The geometry had nothing to reduce and fell back to the default footprint.
    fn geometry_defaulted(&self, _geofence: &Geofence) {}
}

// ── Tracing ─────────────────────────────────────────────────────────

/// Default reporter: structured `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl DispatchReporter for TracingReporter {
    fn dispatched(&self, outcome: &DispatchOutcome) {
        if outcome.delivered {
            info!(
                device = %outcome.device,
                f_cnt = ?outcome.f_cnt,
                "geofence downlink queued"
            );
        } else {
            warn!(
                device = %outcome.device,
                error = outcome.error.as_deref().unwrap_or("unknown"),
                "geofence downlink failed"
            );
        }
    }

    fn dropped(&self, device: &DeviceId, reason: DropReason) {
        warn!(device = %device, %reason, "geofence downlink dropped before dispatch");
    }

    fn skipped(&self, geofence: &Geofence, reason: &SkipReason) {
        match reason {
            SkipReason::LookupFailed(_) => warn!(
                geofence = %geofence.id,
                group = %geofence.group_id,
                %reason,
                "no geofence downlinks scheduled"
            ),
            _ => info!(
                geofence = %geofence.id,
                group = %geofence.group_id,
                %reason,
                "no geofence downlinks scheduled"
            ),
        }
    }

    fn scheduled(&self, geofence: &Geofence, footprint: &Footprint, devices: usize) {
        info!(
            geofence = %geofence.id,
            kind = %geofence.kind(),
            lat = footprint.center.lat,
            lng = footprint.center.lng,
            radius_m = footprint.radius_m,
            devices,
            "geofence downlinks scheduled"
        );
    }

    fn geometry_defaulted(&self, geofence: &Geofence) {
        warn!(
            geofence = %geofence.id,
            "polygon has no vertices, sending default footprint"
        );
    }
}

// ── Recording ───────────────────────────────────────────────────────

/// Keeps every event in memory and forwards it to [`TracingReporter`].
#[derive(Debug, Default)]
pub struct RecordingReporter {
    outcomes: Mutex<Vec<DispatchOutcome>>,
    dropped: Mutex<Vec<(DeviceId, DropReason)>>,
    skipped: Mutex<Vec<SkipReason>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outcomes(&self) -> Vec<DispatchOutcome> {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn dropped_units(&self) -> Vec<(DeviceId, DropReason)> {
        self.dropped
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn skips(&self) -> Vec<SkipReason> {
        self.skipped
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Outcome for one device, if it was attempted.
    pub fn outcome_for(&self, device: &DeviceId) -> Option<DispatchOutcome> {
        self.outcomes().into_iter().find(|o| &o.device == device)
    }
}

impl DispatchReporter for RecordingReporter {
    fn dispatched(&self, outcome: &DispatchOutcome) {
        TracingReporter.dispatched(outcome);
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(outcome.clone());
    }

    fn dropped(&self, device: &DeviceId, reason: DropReason) {
        TracingReporter.dropped(device, reason);
        self.dropped
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((device.clone(), reason));
    }

    fn skipped(&self, geofence: &Geofence, reason: &SkipReason) {
        TracingReporter.skipped(geofence, reason);
        self.skipped
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(reason.clone());
    }

    fn scheduled(&self, geofence: &Geofence, footprint: &Footprint, devices: usize) {
        TracingReporter.scheduled(geofence, footprint, devices);
    }

    fn geometry_defaulted(&self, geofence: &Geofence) {
        TracingReporter.geometry_defaulted(geofence);
    }
}
