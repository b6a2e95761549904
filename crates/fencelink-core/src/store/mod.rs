// ── Persistence collaborators ──
//
// Core does not own storage. Geofence records and device-group membership
// come from collaborators behind these traits; `MemoryStore` is the
// in-process implementation used by the CLI and tests.

mod memory;

pub use memory::MemoryStore;

use std::future::Future;

use crate::error::CoreError;
use crate::model::{DeviceGroup, EntityId, Geofence, GeofenceDraft};

/// Resolves a group id to its current membership.
pub trait GroupDirectory: Send + Sync + 'static {
    /// `Ok(None)` when the group does not exist.
    fn device_group(
        &self,
        group_id: &EntityId,
    ) -> impl Future<Output = Result<Option<DeviceGroup>, CoreError>> + Send;
}

/// Geofence record storage.
pub trait GeofenceStore: Send + Sync + 'static {
    /// Persist a new geofence and return it with its assigned id.
    fn create_geofence(
        &self,
        draft: GeofenceDraft,
    ) -> impl Future<Output = Result<Geofence, CoreError>> + Send;

    /// Replace an existing geofence. `Ok(None)` when `id` is unknown.
    fn update_geofence(
        &self,
        id: &EntityId,
        draft: GeofenceDraft,
    ) -> impl Future<Output = Result<Option<Geofence>, CoreError>> + Send;

    /// Returns whether a record was removed.
    fn delete_geofence(&self, id: &EntityId) -> impl Future<Output = Result<bool, CoreError>> + Send;

    fn get_geofence(
        &self,
        id: &EntityId,
    ) -> impl Future<Output = Result<Option<Geofence>, CoreError>> + Send;

    fn list_geofences_by_group(
        &self,
        group_id: &EntityId,
    ) -> impl Future<Output = Result<Vec<Geofence>, CoreError>> + Send;
}
