// ── Geofence write service ──
//
// Persists geofences through a `GeofenceStore` and, once a create or update
// has succeeded, hands the stored record to the orchestrator. The returned
// result is the store's result; dispatch never changes it.

use std::sync::Arc;

use tracing::debug;

use crate::error::CoreError;
use crate::model::{EntityId, Geofence, GeofenceDraft};
use crate::orchestrator::Orchestrator;
use crate::store::{GeofenceStore, GroupDirectory};

pub struct GeofenceService<S, D> {
    store: Arc<S>,
    orchestrator: Orchestrator<D>,
}

impl<S, D> Clone for GeofenceService<S, D> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            orchestrator: self.orchestrator.clone(),
        }
    }
}

impl<S: GeofenceStore, D: GroupDirectory> GeofenceService<S, D> {
    pub fn new(store: Arc<S>, orchestrator: Orchestrator<D>) -> Self {
        Self {
            store,
            orchestrator,
        }
    }

    pub fn orchestrator(&self) -> &Orchestrator<D> {
        &self.orchestrator
    }

    /// Persist a new geofence and schedule its downlinks.
    pub async fn create(&self, draft: GeofenceDraft) -> Result<Geofence, CoreError> {
        let geofence = self.store.create_geofence(draft).await?;
        let scheduling = self.orchestrator.on_geofence_write(&geofence).await;
        debug!(geofence = %geofence.id, ?scheduling, "geofence created");
        Ok(geofence)
    }

    /// Replace a geofence and schedule downlinks for the new geometry.
    pub async fn update(&self, id: &EntityId, draft: GeofenceDraft) -> Result<Geofence, CoreError> {
        let geofence = self
            .store
            .update_geofence(id, draft)
            .await?
            .ok_or_else(|| CoreError::GeofenceNotFound {
                identifier: id.to_string(),
            })?;
        let scheduling = self.orchestrator.on_geofence_write(&geofence).await;
        debug!(geofence = %geofence.id, ?scheduling, "geofence updated");
        Ok(geofence)
    }

    /// Remove a geofence. Devices are not told.
    pub async fn delete(&self, id: &EntityId) -> Result<(), CoreError> {
        if self.store.delete_geofence(id).await? {
            debug!(geofence = %id, "geofence deleted");
            Ok(())
        } else {
            Err(CoreError::GeofenceNotFound {
                identifier: id.to_string(),
            })
        }
    }

    pub async fn get(&self, id: &EntityId) -> Result<Geofence, CoreError> {
        self.store
            .get_geofence(id)
            .await?
            .ok_or_else(|| CoreError::GeofenceNotFound {
                identifier: id.to_string(),
            })
    }

    pub async fn list_by_group(&self, group_id: &EntityId) -> Result<Vec<Geofence>, CoreError> {
        self.store.list_geofences_by_group(group_id).await
    }
}
