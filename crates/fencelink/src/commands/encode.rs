//! Encode and decode handlers: frame tooling without a network server.

use serde::Serialize;
use tracing::warn;

use fencelink_core::{DownlinkCommand, Footprint, Frame, GeofenceKind, reduce};

use crate::cli::{DecodeArgs, EncodeArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Debug, Serialize)]
struct EncodeReport {
    kind: GeofenceKind,
    footprint: Footprint,
    command: DownlinkCommand,
    hex: String,
    base64: String,
}

#[derive(Debug, Serialize)]
struct DecodeReport {
    command: DownlinkCommand,
    hex: String,
}

fn encode_detail(r: &EncodeReport) -> String {
    let mut radius = format!("{} m", r.footprint.radius_m);
    if u32::from(r.command.radius_m) != r.footprint.radius_m {
        radius.push_str(&format!(" (sent as {} m)", r.command.radius_m));
    }
    output::detail_lines(&[
        ("Kind", r.kind.to_string()),
        (
            "Center",
            format!("{:.6}, {:.6}", r.footprint.center.lat, r.footprint.center.lng),
        ),
        ("Radius", radius),
        ("Frame (hex)", r.hex.clone()),
        ("Payload", r.base64.clone()),
    ])
}

fn decode_detail(r: &DecodeReport) -> String {
    output::detail_lines(&[
        ("Type", format!("0x{:02x}", r.command.type_tag)),
        ("Latitude", r.command.center_lat.to_string()),
        ("Longitude", r.command.center_lng.to_string()),
        ("Radius", format!("{} m", r.command.radius_m)),
        ("Frame (hex)", r.hex.clone()),
    ])
}

pub fn encode(args: &EncodeArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let draft = util::read_geofence(&args.file)?;
    if draft.geometry.is_degenerate() {
        warn!("polygon has no vertices, encoding the default footprint");
    }

    let footprint = reduce(&draft.geometry);
    let command = DownlinkCommand::from_footprint(&footprint);
    let frame = command.encode();

    let report = EncodeReport {
        kind: draft.geometry.kind(),
        footprint,
        command,
        hex: frame.to_hex(),
        base64: frame.to_base64(),
    };

    let out = output::render_single(global.output, &report, encode_detail, |r| {
        r.base64.clone()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}

pub fn decode(args: &DecodeArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let frame = Frame::from_base64(&args.payload).map_err(fencelink_core::CoreError::from)?;
    let command = frame.decode().map_err(fencelink_core::CoreError::from)?;

    let report = DecodeReport {
        command,
        hex: frame.to_hex(),
    };

    let out = output::render_single(global.output, &report, decode_detail, |r| {
        format!(
            "{} {} {}",
            r.command.center_lat, r.command.center_lng, r.command.radius_m
        )
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
