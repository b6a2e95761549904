// ── In-memory store ──
//
// Lock-free concurrent maps for geofences and device groups. Geofence ids
// are sequential integers starting at 1.

use std::sync::atomic::{AtomicI64, Ordering};

use dashmap::DashMap;

use super::{GeofenceStore, GroupDirectory};
use crate::error::CoreError;
use crate::model::{DeviceGroup, EntityId, Geofence, GeofenceDraft};

/// Geofence store and group directory backed by `DashMap`s.
#[derive(Debug)]
pub struct MemoryStore {
    geofences: DashMap<EntityId, Geofence>,
    groups: DashMap<EntityId, DeviceGroup>,
    next_id: AtomicI64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            geofences: DashMap::new(),
            groups: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with a set of device groups.
    pub fn with_groups(groups: impl IntoIterator<Item = DeviceGroup>) -> Self {
        let store = Self::new();
        for group in groups {
            store.insert_group(group);
        }
        store
    }

    /// Insert or replace a device group. Returns `true` if the id was new.
    pub fn insert_group(&self, group: DeviceGroup) -> bool {
        self.groups.insert(group.id.clone(), group).is_none()
    }

    fn allocate_id(&self) -> EntityId {
        EntityId::Int(self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

impl GroupDirectory for MemoryStore {
    async fn device_group(&self, group_id: &EntityId) -> Result<Option<DeviceGroup>, CoreError> {
        Ok(self.groups.get(group_id).map(|r| r.value().clone()))
    }
}

impl GeofenceStore for MemoryStore {
    async fn create_geofence(&self, draft: GeofenceDraft) -> Result<Geofence, CoreError> {
        let geofence = draft.into_geofence(self.allocate_id());
        self.geofences
            .insert(geofence.id.clone(), geofence.clone());
        Ok(geofence)
    }

    async fn update_geofence(
        &self,
        id: &EntityId,
        draft: GeofenceDraft,
    ) -> Result<Option<Geofence>, CoreError> {
        let Some(mut entry) = self.geofences.get_mut(id) else {
            return Ok(None);
        };
        let geofence = draft.into_geofence(id.clone());
        *entry = geofence.clone();
        Ok(Some(geofence))
    }

    async fn delete_geofence(&self, id: &EntityId) -> Result<bool, CoreError> {
        Ok(self.geofences.remove(id).is_some())
    }

    async fn get_geofence(&self, id: &EntityId) -> Result<Option<Geofence>, CoreError> {
        Ok(self.geofences.get(id).map(|r| r.value().clone()))
    }

    async fn list_geofences_by_group(&self, group_id: &EntityId) -> Result<Vec<Geofence>, CoreError> {
        let mut found: Vec<Geofence> = self
            .geofences
            .iter()
            .filter(|r| &r.value().group_id == group_id)
            .map(|r| r.value().clone())
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(found)
    }
}
