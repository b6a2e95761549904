// ── Geofence domain types ──
//
// The stored record carries a `geofence_type` discriminator next to a
// `coordinates` payload whose shape depends on it. Both are resolved once,
// at deserialization, into the `Geometry` tagged union; nothing downstream
// inspects raw coordinates again.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use strum::{Display, EnumString};
use thiserror::Error;

use super::entity_id::EntityId;

// ── Geometry ────────────────────────────────────────────────────────

/// A WGS84 point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const ORIGIN: Self = Self { lat: 0.0, lng: 0.0 };

    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Circle geometry. `radius_m` is optional on the wire; the reducer
/// substitutes its default when absent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleArea {
    pub center: Coordinate,
    pub radius_m: Option<u32>,
}

/// Discriminator of the stored `geofence_type` field.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GeofenceKind {
    Circle,
    Polygon,
}

/// Geofence geometry, exactly one representation per kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Circle(CircleArea),
    /// Ordered vertices. An empty list is accepted and reduces to the
    /// documented default footprint.
    Polygon(Vec<Coordinate>),
}

impl Geometry {
    pub fn circle(lat: f64, lng: f64, radius_m: Option<u32>) -> Self {
        Self::Circle(CircleArea {
            center: Coordinate::new(lat, lng),
            radius_m,
        })
    }

    pub fn polygon(vertices: impl IntoIterator<Item = (f64, f64)>) -> Self {
        Self::Polygon(
            vertices
                .into_iter()
                .map(|(lat, lng)| Coordinate::new(lat, lng))
                .collect(),
        )
    }

    pub fn kind(&self) -> GeofenceKind {
        match self {
            Self::Circle(_) => GeofenceKind::Circle,
            Self::Polygon(_) => GeofenceKind::Polygon,
        }
    }

    /// A polygon without vertices.
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Self::Polygon(v) if v.is_empty())
    }

    /// Resolve a `(geofence_type, coordinates)` pair.
    pub fn from_wire(kind: GeofenceKind, coordinates: Value) -> Result<Self, GeofenceParseError> {
        match kind {
            GeofenceKind::Circle => {
                let wire: CircleWire = serde_json::from_value(coordinates).map_err(|e| {
                    GeofenceParseError::Coordinates {
                        kind,
                        reason: e.to_string(),
                    }
                })?;
                let radius_m = wire.radius.map(radius_from_wire).transpose()?;
                Ok(Self::circle(wire.lat, wire.lng, radius_m))
            }
            GeofenceKind::Polygon => {
                let vertices: Vec<Coordinate> =
                    serde_json::from_value(coordinates).map_err(|e| {
                        GeofenceParseError::Coordinates {
                            kind,
                            reason: e.to_string(),
                        }
                    })?;
                Ok(Self::Polygon(vertices))
            }
        }
    }

    /// Inverse of [`from_wire`](Self::from_wire).
    pub fn to_wire(&self) -> (GeofenceKind, Value) {
        let coordinates = match self {
            Self::Circle(c) => {
                let mut obj = Map::new();
                obj.insert("lat".into(), json!(c.center.lat));
                obj.insert("lng".into(), json!(c.center.lng));
                if let Some(r) = c.radius_m {
                    obj.insert("radius".into(), json!(r));
                }
                Value::Object(obj)
            }
            Self::Polygon(vertices) => Value::Array(
                vertices
                    .iter()
                    .map(|v| json!({ "lat": v.lat, "lng": v.lng }))
                    .collect(),
            ),
        };
        (self.kind(), coordinates)
    }
}

#[derive(Deserialize)]
struct CircleWire {
    lat: f64,
    lng: f64,
    #[serde(default)]
    radius: Option<f64>,
}

/// Radii arrive as JSON numbers that may carry a fraction; meters are
/// truncated. Negative or non-finite radii are rejected.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::as_conversions)]
fn radius_from_wire(radius: f64) -> Result<u32, GeofenceParseError> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(GeofenceParseError::Radius(radius));
    }
    Ok(radius as u32)
}

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeofenceParseError {
    #[error("coordinates do not describe a {kind}: {reason}")]
    Coordinates { kind: GeofenceKind, reason: String },

    #[error("radius must be a non-negative number of meters, got {0}")]
    Radius(f64),

    #[error("stored geofence has no id")]
    MissingId,
}

// ── Records ─────────────────────────────────────────────────────────

/// Wire record shared by stored geofences and drafts.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeofenceRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    group_id: EntityId,
    geofence_type: GeofenceKind,
    coordinates: Value,
}

/// Geofence contents before the store assigns an identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GeofenceRecord", into = "GeofenceRecord")]
pub struct GeofenceDraft {
    pub name: Option<String>,
    pub group_id: EntityId,
    pub geometry: Geometry,
}

/// A persisted geofence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GeofenceRecord", into = "GeofenceRecord")]
pub struct Geofence {
    pub id: EntityId,
    pub name: Option<String>,
    pub group_id: EntityId,
    pub geometry: Geometry,
}

impl GeofenceDraft {
    pub fn new(group_id: impl Into<EntityId>, geometry: Geometry) -> Self {
        Self {
            name: None,
            group_id: group_id.into(),
            geometry,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach the identity assigned by the store.
    pub fn into_geofence(self, id: EntityId) -> Geofence {
        Geofence {
            id,
            name: self.name,
            group_id: self.group_id,
            geometry: self.geometry,
        }
    }
}

impl Geofence {
    pub fn kind(&self) -> GeofenceKind {
        self.geometry.kind()
    }

    /// Display label: the name when present, the id otherwise.
    pub fn label(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.id.to_string())
    }
}

impl TryFrom<GeofenceRecord> for GeofenceDraft {
    type Error = GeofenceParseError;

    fn try_from(rec: GeofenceRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            name: rec.name,
            group_id: rec.group_id,
            geometry: Geometry::from_wire(rec.geofence_type, rec.coordinates)?,
        })
    }
}

impl TryFrom<GeofenceRecord> for Geofence {
    type Error = GeofenceParseError;

    fn try_from(mut rec: GeofenceRecord) -> Result<Self, Self::Error> {
        let id = rec.id.take().ok_or(GeofenceParseError::MissingId)?;
        Ok(GeofenceDraft::try_from(rec)?.into_geofence(id))
    }
}

impl From<GeofenceDraft> for GeofenceRecord {
    fn from(draft: GeofenceDraft) -> Self {
        let (geofence_type, coordinates) = draft.geometry.to_wire();
        Self {
            id: None,
            name: draft.name,
            group_id: draft.group_id,
            geofence_type,
            coordinates,
        }
    }
}

impl From<Geofence> for GeofenceRecord {
    fn from(fence: Geofence) -> Self {
        let (geofence_type, coordinates) = fence.geometry.to_wire();
        Self {
            id: Some(fence.id),
            name: fence.name,
            group_id: fence.group_id,
            geofence_type,
            coordinates,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_circle_record() {
        let fence: Geofence = serde_json::from_value(json!({
            "id": 3,
            "name": "Corral",
            "group_id": 1,
            "geofence_type": "circle",
            "coordinates": { "lat": -33.45, "lng": -70.66, "radius": 50 }
        }))
        .unwrap();

        assert_eq!(fence.id, EntityId::Int(3));
        assert_eq!(fence.kind(), GeofenceKind::Circle);
        assert_eq!(fence.geometry, Geometry::circle(-33.45, -70.66, Some(50)));
    }

    #[test]
    fn circle_radius_is_optional() {
        let draft: GeofenceDraft = serde_json::from_value(json!({
            "group_id": "herd-a",
            "geofence_type": "circle",
            "coordinates": { "lat": 1.0, "lng": 2.0 }
        }))
        .unwrap();
        assert_eq!(draft.geometry, Geometry::circle(1.0, 2.0, None));
    }

    #[test]
    fn fractional_radius_is_truncated() {
        let geometry =
            Geometry::from_wire(GeofenceKind::Circle, json!({"lat": 0, "lng": 0, "radius": 75.9}))
                .unwrap();
        assert_eq!(geometry, Geometry::circle(0.0, 0.0, Some(75)));
    }

    #[test]
    fn negative_radius_is_rejected() {
        let err =
            Geometry::from_wire(GeofenceKind::Circle, json!({"lat": 0, "lng": 0, "radius": -1}))
                .unwrap_err();
        assert_eq!(err, GeofenceParseError::Radius(-1.0));
    }

    #[test]
    fn parses_polygon_record() {
        let draft: GeofenceDraft = serde_json::from_value(json!({
            "group_id": 9,
            "geofence_type": "polygon",
            "coordinates": [
                { "lat": 0, "lng": 0 },
                { "lat": 0, "lng": 2 },
                { "lat": 2, "lng": 0 }
            ]
        }))
        .unwrap();
        assert_eq!(
            draft.geometry,
            Geometry::polygon([(0.0, 0.0), (0.0, 2.0), (2.0, 0.0)])
        );
    }

    #[test]
    fn empty_polygon_parses_as_degenerate() {
        let geometry = Geometry::from_wire(GeofenceKind::Polygon, json!([])).unwrap();
        assert!(geometry.is_degenerate());
    }

    #[test]
    fn kind_and_coordinates_must_agree() {
        let result: Result<GeofenceDraft, _> = serde_json::from_value(json!({
            "group_id": 1,
            "geofence_type": "circle",
            "coordinates": [{ "lat": 0, "lng": 0 }]
        }));
        assert!(result.is_err());

        let result: Result<GeofenceDraft, _> = serde_json::from_value(json!({
            "group_id": 1,
            "geofence_type": "polygon",
            "coordinates": { "lat": 0, "lng": 0, "radius": 10 }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn stored_geofence_requires_id() {
        let result: Result<Geofence, _> = serde_json::from_value(json!({
            "group_id": 1,
            "geofence_type": "polygon",
            "coordinates": []
        }));
        assert!(result.is_err());
    }

    #[test]
    fn serializes_back_to_wire_record() {
        let fence = GeofenceDraft::new(1, Geometry::circle(1.5, -2.5, Some(10)))
            .with_name("Gate")
            .into_geofence(EntityId::Int(4));
        let value = serde_json::to_value(&fence).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 4,
                "name": "Gate",
                "group_id": 1,
                "geofence_type": "circle",
                "coordinates": { "lat": 1.5, "lng": -2.5, "radius": 10 }
            })
        );
    }

    #[test]
    fn kind_display_matches_wire() {
        assert_eq!(GeofenceKind::Polygon.to_string(), "polygon");
        assert_eq!("circle".parse::<GeofenceKind>().unwrap(), GeofenceKind::Circle);
    }
}
