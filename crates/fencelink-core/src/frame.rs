// ── Downlink frame codec ──
//
// Fixed 11-byte little-endian layout understood by the collar firmware:
//
//   [0]     type marker (0x01 = circle; polygons ship as circles too)
//   [1..5]  center latitude,  IEEE-754 f32
//   [5..9]  center longitude, IEEE-754 f32
//   [9..11] radius in meters, u16 (clamped, never wrapped)
//
// The frame travels base64-encoded inside the queue request body.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::{Buf, BufMut};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::geometry::Footprint;

/// Encoded frame length in bytes.
pub const FRAME_LEN: usize = 11;

/// Type marker for circle commands.
pub const CIRCLE_MARKER: u8 = 0x01;

// ── Command ─────────────────────────────────────────────────────────

/// Decoded form of a frame. Built fresh for every dispatch, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DownlinkCommand {
    pub type_tag: u8,
    pub center_lat: f32,
    pub center_lng: f32,
    pub radius_m: u16,
}

impl DownlinkCommand {
    /// Narrow a footprint to wire precision: f32 coordinates and a radius
    /// clamped to `u16::MAX`.
    #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
    pub fn from_footprint(footprint: &Footprint) -> Self {
        Self {
            type_tag: CIRCLE_MARKER,
            center_lat: footprint.center.lat as f32,
            center_lng: footprint.center.lng as f32,
            radius_m: clamp_radius(footprint.radius_m),
        }
    }

    pub fn encode(&self) -> Frame {
        let mut bytes = [0u8; FRAME_LEN];
        let mut buf = &mut bytes[..];
        buf.put_u8(self.type_tag);
        buf.put_f32_le(self.center_lat);
        buf.put_f32_le(self.center_lng);
        buf.put_u16_le(self.radius_m);
        Frame(bytes)
    }
}

/// Saturate a radius into the frame's u16 field.
pub fn clamp_radius(radius_m: u32) -> u16 {
    u16::try_from(radius_m).unwrap_or_else(|_| {
        debug!(radius_m, "radius exceeds frame range, clamping to {}", u16::MAX);
        u16::MAX
    })
}

/// Pack a center and radius into a circle frame.
pub fn encode(lat: f64, lng: f64, radius_m: u32) -> Frame {
    DownlinkCommand::from_footprint(&Footprint {
        center: crate::model::Coordinate::new(lat, lng),
        radius_m,
    })
    .encode()
}

// ── Frame ───────────────────────────────────────────────────────────

/// An encoded downlink payload. Always exactly [`FRAME_LEN`] bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frame([u8; FRAME_LEN]);

impl Frame {
    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }

    /// Standard, padded base64 as carried in the queue `data` field.
    pub fn to_base64(&self) -> String {
        BASE64.encode(self.0)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_base64(encoded: &str) -> Result<Self, FrameError> {
        let raw = BASE64
            .decode(encoded.trim())
            .map_err(|e| FrameError::Base64(e.to_string()))?;
        Self::try_from(raw.as_slice())
    }

    pub fn decode(&self) -> Result<DownlinkCommand, FrameError> {
        let mut buf = &self.0[..];
        let type_tag = buf.get_u8();
        if type_tag != CIRCLE_MARKER {
            return Err(FrameError::UnknownType(type_tag));
        }
        Ok(DownlinkCommand {
            type_tag,
            center_lat: buf.get_f32_le(),
            center_lng: buf.get_f32_le(),
            radius_m: buf.get_u16_le(),
        })
    }
}

impl TryFrom<&[u8]> for Frame {
    type Error = FrameError;

    fn try_from(raw: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; FRAME_LEN] = raw
            .try_into()
            .map_err(|_| FrameError::Length(raw.len()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({})", self.to_hex())
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame must be 11 bytes, got {0}")]
    Length(usize),

    #[error("unknown frame type marker 0x{0:02x}")]
    UnknownType(u8),

    #[error("invalid base64 payload: {0}")]
    Base64(String),
}
