//! Geofence reduction, downlink encoding, and failure-isolated dispatch.
//!
//! This crate owns the domain logic between stored geofences and the
//! network server that queues downlinks for LoRaWAN devices:
//!
//! - **[`geometry`]**: [`reduce`] collapses any [`Geometry`] to a single
//!   center and radius ([`Footprint`]). Total; never fails.
//!
//! - **[`frame`]**: packs a footprint into the fixed 11-byte [`Frame`] the
//!   collar firmware understands, and decodes it back for tooling.
//!
//! - **[`Dispatcher`]**: one frame to one device through
//!   [`fencelink_api::QueueClient`]. Every attempt ends as a
//!   [`DispatchOutcome`] handed to a [`DispatchReporter`].
//!
//! - **[`DispatchPool`]**: bounded worker pool. Submission never waits;
//!   shutdown drains what is queued.
//!
//! - **[`Orchestrator`]** and **[`GeofenceService`]**: after a geofence
//!   write is persisted, resolve its device group and queue one unit per
//!   device. Dispatch problems never reach the write's caller.
//!
//! Persistence is a collaborator: [`GeofenceStore`] and [`GroupDirectory`]
//! describe what core needs, and [`MemoryStore`] implements both in-process.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod model;
pub mod orchestrator;
pub mod service;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{DispatchConfig, PoolConfig, TlsVerification};
pub use dispatch::{
    DispatchOutcome, DispatchPool, DispatchReporter, DispatchUnit, Dispatcher, DropReason,
    RecordingReporter, SkipReason, TracingReporter,
};
pub use error::CoreError;
pub use frame::{DownlinkCommand, FRAME_LEN, Frame, FrameError};
pub use geometry::{Footprint, reduce};
pub use orchestrator::{Orchestrator, Scheduling};
pub use service::GeofenceService;
pub use store::{GeofenceStore, GroupDirectory, MemoryStore};

pub use model::{
    CircleArea, Coordinate, DeviceGroup, DeviceId, EntityId, Geofence, GeofenceDraft,
    GeofenceKind, GeofenceParseError, Geometry,
};
