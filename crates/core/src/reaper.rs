use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::app_state::DbPool;
use crate::repositories::transaction_repository::TransactionRepository;

/// Wall-clock budget for one full pass over a batch.
const BATCH_DEADLINE: Duration = Duration::from_secs(30);

/// The sole expirer of lapsed holds. One long-lived worker: an immediate
/// pass on start, then one per interval until stopped. Request handlers
/// never cancel on read; two readers racing could each release the hold
/// once and double-credit the user.
pub struct ExpiryReaper {
    db: DbPool,
    interval: Duration,
    batch_size: i64,
    inner: Mutex<ReaperHandle>,
}

#[derive(Default)]
struct ReaperHandle {
    running: bool,
    stop: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<()>>,
}

impl ExpiryReaper {
    pub fn new(db: DbPool, interval: Duration, batch_size: i64) -> Self {
        Self {
            db,
            interval,
            batch_size,
            inner: Mutex::new(ReaperHandle::default()),
        }
    }

    /// Idempotent: a second start while running is a no-op.
    pub fn start(&self) {
        let mut inner = self.inner.lock().expect("reaper state poisoned");
        if inner.running {
            return;
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        let db = self.db.clone();
        let interval = self.interval;
        let batch_size = self.batch_size;

        inner.running = true;
        inner.stop = Some(stop_tx);
        inner.task = Some(tokio::spawn(Self::run(db, interval, batch_size, stop_rx)));

        info!(
            interval_secs = interval.as_secs(),
            batch_size, "expired reservations reaper started"
        );
    }

    /// Signals the worker and waits for the in-flight pass to finish.
    /// Stopping a stopped reaper is a no-op.
    pub async fn stop(&self) {
        let task = {
            let mut inner = self.inner.lock().expect("reaper state poisoned");
            if !inner.running {
                return;
            }
            inner.running = false;
            if let Some(stop) = inner.stop.take() {
                let _ = stop.send(true);
            }
            inner.task.take()
        };

        if let Some(task) = task {
            if let Err(e) = task.await {
                error!("reaper task join failed: {}", e);
            }
        }

        info!("expired reservations reaper stopped");
    }

    async fn run(db: DbPool, interval: Duration, batch_size: i64, mut stop_rx: watch::Receiver<bool>) {
        Self::process(db.clone(), batch_size).await;

        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await; // the immediate tick; the pass above covered it

        loop {
            tokio::select! {
                _ = stop_rx.changed() => return,
                _ = ticker.tick() => Self::process(db.clone(), batch_size).await,
            }
        }
    }

    async fn process(db: DbPool, batch_size: i64) {
        let pass = tokio::task::spawn_blocking(move || Self::process_batch(db, batch_size));

        match tokio::time::timeout(BATCH_DEADLINE, pass).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("reaper pass panicked: {}", e),
            Err(_) => error!(
                deadline_secs = BATCH_DEADLINE.as_secs(),
                "reaper pass exceeded its deadline"
            ),
        }
    }

    fn process_batch(db: DbPool, batch_size: i64) {
        let Ok(mut conn) = db.get() else {
            error!("reaper: failed to acquire db connection");
            return;
        };

        let ids = match TransactionRepository::list_expired(&mut conn, batch_size) {
            Ok(ids) => ids,
            Err(e) => {
                error!("reaper: failed to list expired reservations: {}", e);
                return;
            }
        };

        if ids.is_empty() {
            return;
        }

        info!(count = ids.len(), "found expired reservations");

        let mut succeeded = 0usize;
        let mut failed = 0usize;

        for id in ids {
            match TransactionRepository::cancel_expired(&mut conn, id) {
                Ok(_) => {
                    debug!(reservation_id = %id, "cancelled expired reservation");
                    succeeded += 1;
                }
                Err(e) => {
                    error!(reservation_id = %id, "failed to cancel expired reservation: {}", e);
                    failed += 1;
                }
            }
        }

        info!(succeeded, failed, "expired reservations pass completed");
    }
}
