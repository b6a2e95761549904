// ── Bounded dispatch pool ──
//
// A fixed set of worker tasks drains a bounded queue of dispatch units.
// Workers only dequeue and spawn; every attempt runs as its own task so a
// slow device never holds back the next unit. Submitting never waits: a
// full or closed queue drops the unit and reports it. Shutdown closes the
// queue, lets workers drain what is already queued, then joins every
// in-flight attempt.

use std::sync::{Arc, Mutex as StdMutex, PoisonError, RwLock};

use tokio::sync::{Mutex, mpsc};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, warn};

use super::{DispatchOutcome, DispatchReporter, Dispatcher, DropReason};
use crate::config::PoolConfig;
use crate::frame::Frame;
use crate::model::DeviceId;

/// One frame bound for one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchUnit {
    pub device: DeviceId,
    pub frame: Frame,
}

impl DispatchUnit {
    pub fn new(device: DeviceId, frame: Frame) -> Self {
        Self { device, frame }
    }
}

/// Worker pool executing dispatch units off the caller's path.
pub struct DispatchPool {
    tx: RwLock<Option<mpsc::Sender<DispatchUnit>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    in_flight: Arc<StdMutex<JoinSet<()>>>,
    reporter: Arc<dyn DispatchReporter>,
}

impl DispatchPool {
    /// Spawn the workers. Must be called inside a Tokio runtime.
    ///
    /// Zero workers or zero capacity are raised to one.
    pub fn start(dispatcher: Dispatcher, config: PoolConfig) -> Self {
        let workers = config.workers.max(1);
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let rx = Arc::new(Mutex::new(rx));
        let reporter = Arc::clone(dispatcher.reporter());
        let in_flight = Arc::new(StdMutex::new(JoinSet::new()));

        let handles = (0..workers)
            .map(|id| {
                tokio::spawn(worker(
                    id,
                    Arc::clone(&rx),
                    dispatcher.clone(),
                    Arc::clone(&in_flight),
                ))
            })
            .collect();

        debug!(workers, capacity = config.queue_capacity, "dispatch pool started");

        Self {
            tx: RwLock::new(Some(tx)),
            workers: Mutex::new(handles),
            in_flight,
            reporter,
        }
    }

    /// Queue a unit without waiting. Returns `false` (and reports the drop)
    /// when the queue is full or the pool is shut down.
    pub fn submit(&self, unit: DispatchUnit) -> bool {
        let guard = self.tx.read().unwrap_or_else(PoisonError::into_inner);
        let Some(tx) = guard.as_ref() else {
            self.reporter.dropped(&unit.device, DropReason::ShutDown);
            return false;
        };

        match tx.try_send(unit) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(unit)) => {
                self.reporter.dropped(&unit.device, DropReason::QueueFull);
                false
            }
            Err(mpsc::error::TrySendError::Closed(unit)) => {
                self.reporter.dropped(&unit.device, DropReason::ShutDown);
                false
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.tx
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Stop accepting units, finish the queued ones, and join every worker
    /// and in-flight attempt. Calling it again is a no-op.
    pub async fn shutdown(&self) {
        let sender = self
            .tx
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(sender);

        let handles = std::mem::take(&mut *self.workers.lock().await);
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "dispatch worker ended abnormally");
            }
        }

        // Workers have exited, so nothing else spawns into the set.
        let mut attempts =
            std::mem::take(&mut *self.in_flight.lock().unwrap_or_else(PoisonError::into_inner));
        while let Some(joined) = attempts.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "dispatch unit ended abnormally");
            }
        }
        debug!("dispatch pool stopped");
    }
}

impl std::fmt::Debug for DispatchPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchPool")
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

async fn worker(
    id: usize,
    rx: Arc<Mutex<mpsc::Receiver<DispatchUnit>>>,
    dispatcher: Dispatcher,
    in_flight: Arc<StdMutex<JoinSet<()>>>,
) {
    loop {
        let next = rx.lock().await.recv().await;
        let Some(unit) = next else { break };

        {
            let mut attempts = in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            // Reap finished attempts so the set tracks only live ones.
            while attempts.try_join_next().is_some() {}
            attempts.spawn(run_unit(dispatcher.clone(), unit));
        }
    }
    debug!(worker = id, "dispatch worker exiting");
}

/// Run one attempt in its own task so a panic costs one unit and is
/// still reported as a failed outcome.
async fn run_unit(dispatcher: Dispatcher, unit: DispatchUnit) {
    let device = unit.device.clone();
    let task_dispatcher = dispatcher.clone();
    let task = tokio::spawn(async move {
        task_dispatcher.attempt(&unit.device, &unit.frame).await;
    });

    if let Err(e) = task.await {
        warn!(device = %device, error = %e, "dispatch task aborted");
        dispatcher.reporter().dispatched(&DispatchOutcome {
            device,
            delivered: false,
            f_cnt: None,
            error: Some(format!("dispatch task aborted: {e}")),
            finished_at: chrono::Utc::now(),
        });
    }
}
