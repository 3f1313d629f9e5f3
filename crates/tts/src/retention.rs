use std::{
    io,
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};

use tokio::{
    sync::mpsc,
    time::{Instant, Interval, MissedTickBehavior},
};

/// Outcome of one sweep
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub removed: usize,
    pub failed: usize,
}

/// Delete regular files directly under `dir` that are older than `max_age`
pub fn sweep(dir: &Path, max_age: Duration) -> SweepReport {
    sweep_at(dir, max_age, SystemTime::now())
}

/// [`sweep`] against an explicit clock
///
/// Subdirectories are not descended into. Per-file failures are logged and
/// counted; they never stop the sweep.
pub fn sweep_at(dir: &Path, max_age: Duration, now: SystemTime) -> SweepReport {
    let mut report = SweepReport::default();

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return report,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "failed to list output directory");
            report.failed += 1;
            return report;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "failed to read directory entry");
                report.failed += 1;
                continue;
            }
        };

        let path = entry.path();

        let expired = match is_expired(&entry, max_age, now) {
            Ok(expired) => expired,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read file metadata");
                report.failed += 1;
                continue;
            }
        };

        if !expired {
            continue;
        }

        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "removed expired output");
                report.removed += 1;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove expired output");
                report.failed += 1;
            }
        }
    }

    report
}

fn is_expired(entry: &std::fs::DirEntry, max_age: Duration, now: SystemTime) -> io::Result<bool> {
    let metadata = entry.metadata()?;

    if !metadata.is_file() {
        return Ok(false);
    }

    let modified = metadata.modified()?;

    Ok(now.duration_since(modified).is_ok_and(|age| age > max_age))
}

/// Handle to the background retention worker
///
/// Sweeps run on the blocking pool, one at a time. The worker stops once
/// every handle is dropped.
#[derive(Clone)]
pub struct RetentionSweeper {
    tx: mpsc::Sender<()>,
}

impl RetentionSweeper {
    /// Spawn the worker. With `interval` set it also sweeps on a timer
    pub fn spawn(dir: PathBuf, max_age: Duration, interval: Option<Duration>) -> Self {
        let (tx, rx) = mpsc::channel(1);

        tokio::spawn(process_requests(rx, dir, max_age, interval));

        Self { tx }
    }

    /// Queue a sweep without waiting for it
    ///
    /// Dropped when a sweep is already queued.
    pub fn request_sweep(&self) {
        match self.tx.try_send(()) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(())) => {
                tracing::trace!("sweep already queued");
            }
            Err(mpsc::error::TrySendError::Closed(())) => {
                tracing::warn!("retention worker stopped, sweep request dropped");
            }
        }
    }
}

impl std::fmt::Debug for RetentionSweeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetentionSweeper").finish_non_exhaustive()
    }
}

async fn process_requests(mut rx: mpsc::Receiver<()>, dir: PathBuf, max_age: Duration, interval: Option<Duration>) {
    let mut ticker = interval.map(|period| {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker
    });

    loop {
        tokio::select! {
            request = rx.recv() => {
                if request.is_none() {
                    break;
                }
            }
            () = next_tick(ticker.as_mut()) => {}
        }

        run_sweep(&dir, max_age).await;
    }

    tracing::debug!("retention worker shutting down");
}

async fn next_tick(ticker: Option<&mut Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn run_sweep(dir: &Path, max_age: Duration) {
    let walk_dir = dir.to_path_buf();

    match tokio::task::spawn_blocking(move || sweep(&walk_dir, max_age)).await {
        Ok(report) if report.removed > 0 || report.failed > 0 => {
            tracing::info!(
                dir = %dir.display(),
                removed = report.removed,
                failed = report.failed,
                "retention sweep finished"
            );
        }
        Ok(_) => tracing::trace!(dir = %dir.display(), "retention sweep found nothing to remove"),
        Err(e) => tracing::error!(error = %e, "retention sweep panicked"),
    }
}
