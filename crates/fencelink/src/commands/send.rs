//! Direct dispatch: one geofence frame to an explicit list of devices.

use std::sync::Arc;

use futures_util::future::join_all;
use tabled::Tabled;
use tracing::debug;

use fencelink_core::{
    DispatchOutcome, Dispatcher, DownlinkCommand, TracingReporter, reduce,
};

use crate::cli::{GlobalOpts, SendArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
pub struct OutcomeRow {
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "fCnt")]
    f_cnt: String,
    #[tabled(rename = "Error")]
    error: String,
}

impl OutcomeRow {
    pub fn from_outcome(o: &DispatchOutcome, color: bool) -> Self {
        Self {
            device: o.device.to_string(),
            status: output::status_label(o.delivered, color),
            f_cnt: o.f_cnt.map(|n| n.to_string()).unwrap_or_default(),
            error: o.error.clone().unwrap_or_default(),
        }
    }
}

/// One line per device for `--output plain`.
pub fn plain_line(o: &DispatchOutcome) -> String {
    format!("{}\t{}", o.device, output::status_label(o.delivered, false))
}

pub async fn handle(args: &SendArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let draft = util::read_geofence(&args.file)?;
    let devices = util::parse_devices(&args.devices)?;

    let mut dispatch_config = config::build_dispatch_config(global)?;
    if let Some(f_port) = args.f_port {
        dispatch_config.f_port = f_port;
    }
    if args.confirmed {
        dispatch_config.confirmed = true;
    }

    let frame = DownlinkCommand::from_footprint(&reduce(&draft.geometry)).encode();
    let dispatcher = Dispatcher::from_config(&dispatch_config, Arc::new(TracingReporter))?;
    debug!(?dispatcher, devices = devices.len(), %frame, "sending geofence frame");

    // Independent attempts; one slow device does not hold up the others.
    let outcomes: Vec<DispatchOutcome> =
        join_all(devices.iter().map(|device| dispatcher.attempt(device, &frame))).await;

    let color = output::should_color(global.color);
    let out = output::render_list(
        global.output,
        &outcomes,
        |o| OutcomeRow::from_outcome(o, color),
        plain_line,
    );
    output::print_output(&out, global.quiet);

    let failed = outcomes.iter().filter(|o| !o.delivered).count();
    if failed > 0 {
        return Err(CliError::DispatchFailed {
            failed,
            total: outcomes.len(),
        });
    }
    Ok(())
}
