// ── Device group domain type ──

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::entity_id::{DeviceId, EntityId};

/// A named set of devices sharing a geofence assignment.
///
/// Membership is a set: duplicates collapse and order carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceGroup {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub devices: BTreeSet<DeviceId>,
}

impl DeviceGroup {
    pub fn new(id: impl Into<EntityId>, devices: impl IntoIterator<Item = DeviceId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            devices: devices.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }
}
