//! Shared helpers for command handlers.

use std::io::Read;
use std::path::Path;

use fencelink_core::{DeviceGroup, DeviceId, GeofenceDraft};

use crate::error::CliError;

/// Read a file, or stdin when the path is `-`.
pub fn read_input(path: &Path) -> Result<String, CliError> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

/// Parse a geofence record. Any stored `id` is ignored.
pub fn read_geofence(path: &Path) -> Result<GeofenceDraft, CliError> {
    let contents = read_input(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::InvalidGeofence {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Parse a device-group inventory: a JSON array of groups.
pub fn read_inventory(path: &Path) -> Result<Vec<DeviceGroup>, CliError> {
    let contents = read_input(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "inventory".into(),
        reason: format!("{}: {e}", path.display()),
    })
}

/// Normalize and de-duplicate device EUIs, keeping first-seen order.
pub fn parse_devices(raw: &[String]) -> Result<Vec<DeviceId>, CliError> {
    let mut devices: Vec<DeviceId> = Vec::with_capacity(raw.len());
    for eui in raw {
        let device = DeviceId::new(eui);
        if device.as_str().is_empty() {
            return Err(CliError::Validation {
                field: "device".into(),
                reason: "device EUI cannot be empty".into(),
            });
        }
        if !devices.contains(&device) {
            devices.push(device);
        }
    }
    Ok(devices)
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}
