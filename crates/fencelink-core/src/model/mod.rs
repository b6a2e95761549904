// ── Domain model ──
//
// Canonical types shared by the reducer, encoder, dispatcher, and the
// persistence collaborators.

pub mod entity_id;
pub mod geofence;
pub mod group;

pub use entity_id::{DeviceId, EntityId};
pub use geofence::{
    CircleArea, Coordinate, Geofence, GeofenceDraft, GeofenceKind, GeofenceParseError, Geometry,
};
pub use group::DeviceGroup;
