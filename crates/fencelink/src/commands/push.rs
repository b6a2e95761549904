//! Full write path: store the geofence, fan it out to its group through the
//! dispatch pool, drain the pool, and summarize what happened.
//!
//! The write result is independent of delivery, so a push whose downlinks
//! all failed still exits successfully. Use `send` when delivery must gate
//! the exit status.

use std::sync::Arc;

use serde::Serialize;

use fencelink_core::{
    DispatchOutcome, DispatchPool, DispatchReporter, Dispatcher, Geofence,
    GeofenceService, MemoryStore, Orchestrator, RecordingReporter, SkipReason,
};

use crate::cli::{GlobalOpts, PushArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::send::{OutcomeRow, plain_line};
use super::util;

#[derive(Debug, Serialize)]
struct DroppedUnit {
    device: String,
    reason: String,
}

#[derive(Debug, Serialize)]
struct PushReport {
    geofence: Geofence,
    #[serde(skip_serializing_if = "Option::is_none")]
    skipped: Option<SkipReason>,
    delivered: usize,
    failed: usize,
    dropped: Vec<DroppedUnit>,
    outcomes: Vec<DispatchOutcome>,
}

impl PushReport {
    fn summary(&self) -> String {
        match self.skipped {
            Some(ref reason) => format!("{}: no downlinks ({reason})", self.geofence.id),
            None => format!(
                "{}: {} queued, {} failed, {} dropped",
                self.geofence.id,
                self.delivered,
                self.failed,
                self.dropped.len()
            ),
        }
    }
}

fn push_detail(r: &PushReport, color: bool) -> String {
    let mut out = output::detail_lines(&[
        ("Geofence", r.geofence.label()),
        ("Id", r.geofence.id.to_string()),
        ("Group", r.geofence.group_id.to_string()),
        ("Kind", r.geofence.kind().to_string()),
        ("Result", r.summary()),
    ]);
    if !r.outcomes.is_empty() {
        out.push_str("\n\n");
        out.push_str(&output::render_list(
            crate::cli::OutputFormat::Table,
            &r.outcomes,
            |o| OutcomeRow::from_outcome(o, color),
            plain_line,
        ));
    }
    for unit in &r.dropped {
        out.push_str(&format!("\n{} dropped: {}", unit.device, unit.reason));
    }
    out
}

pub async fn handle(args: &PushArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let draft = util::read_geofence(&args.file)?;
    let groups = util::read_inventory(&args.inventory)?;

    let mut dispatch_config = config::build_dispatch_config(global)?;
    if let Some(workers) = args.workers {
        dispatch_config.pool.workers = workers;
    }

    let reporter = Arc::new(RecordingReporter::new());
    let shared: Arc<dyn DispatchReporter> = reporter.clone();

    let dispatcher = Dispatcher::from_config(&dispatch_config, Arc::clone(&shared))?;
    let pool = Arc::new(DispatchPool::start(dispatcher, dispatch_config.pool));
    let store = Arc::new(MemoryStore::with_groups(groups));
    let orchestrator = Orchestrator::new(Arc::clone(&store), Arc::clone(&pool), shared);
    let service = GeofenceService::new(store, orchestrator);

    let created = service.create(draft).await;
    // Drain before reporting, even when the write itself failed.
    pool.shutdown().await;
    let geofence = created?;

    let outcomes = reporter.outcomes();
    let delivered = outcomes.iter().filter(|o| o.delivered).count();
    let report = PushReport {
        skipped: reporter.skips().into_iter().next(),
        delivered,
        failed: outcomes.len() - delivered,
        dropped: reporter
            .dropped_units()
            .into_iter()
            .map(|(device, reason)| DroppedUnit {
                device: device.to_string(),
                reason: reason.to_string(),
            })
            .collect(),
        outcomes,
        geofence,
    };

    let color = output::should_color(global.color);
    let out = output::render_single(
        global.output,
        &report,
        |r| push_detail(r, color),
        PushReport::summary,
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
