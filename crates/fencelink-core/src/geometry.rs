// ── Geometry reduction ──
//
// Every geofence is shipped to devices as a single circle. Circles pass
// through; polygons collapse to the vertex mean plus the farthest vertex
// distance. Reduction is total: no input makes it fail or panic.
//
// Known accuracy limitation: polygon radii convert degrees to meters with a
// flat 111 km/degree factor, which is only right at the equator and for
// north-south offsets. East-west extents are overestimated by 1/cos(lat).
// Devices use the result as a coarse trigger boundary.

use serde::Serialize;

use crate::model::{Coordinate, Geometry};

/// Radius used when a circle has none and for empty polygons.
pub const DEFAULT_RADIUS_M: u32 = 100;

/// Flat degrees-to-meters factor (equatorial, not latitude-corrected).
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// A geofence reduced to center and radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Footprint {
    pub center: Coordinate,
    /// Meters. May exceed what the wire frame can carry; the encoder clamps.
    pub radius_m: u32,
}

impl Footprint {
    /// Footprint of a polygon with no vertices.
    pub const DEGENERATE: Self = Self {
        center: Coordinate::ORIGIN,
        radius_m: DEFAULT_RADIUS_M,
    };
}

/// Reduce any geometry to a single `(center, radius)` pair.
pub fn reduce(geometry: &Geometry) -> Footprint {
    match geometry {
        Geometry::Circle(circle) => Footprint {
            center: circle.center,
            radius_m: circle.radius_m.unwrap_or(DEFAULT_RADIUS_M),
        },
        Geometry::Polygon(vertices) => reduce_polygon(vertices),
    }
}

/// Arithmetic vertex mean (not the area centroid) and the largest planar
/// distance from it, in degrees, scaled to meters and truncated.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
fn reduce_polygon(vertices: &[Coordinate]) -> Footprint {
    if vertices.is_empty() {
        return Footprint::DEGENERATE;
    }

    let n = vertices.len() as f64;
    let (sum_lat, sum_lng) = vertices
        .iter()
        .fold((0.0, 0.0), |(lat, lng), v| (lat + v.lat, lng + v.lng));
    let center = Coordinate::new(sum_lat / n, sum_lng / n);

    let max_deg = vertices
        .iter()
        .map(|v| {
            let dlat = v.lat - center.lat;
            let dlng = v.lng - center.lng;
            (dlat * dlat + dlng * dlng).sqrt()
        })
        .fold(0.0_f64, f64::max);

    // `as` saturates: NaN -> 0, overflow -> u32::MAX.
    let radius_m = (max_deg * METERS_PER_DEGREE) as u32;

    Footprint { center, radius_m }
}
