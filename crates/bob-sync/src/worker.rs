//! Background delivery of rows to a sink.

use std::collections::BTreeMap;
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{info, warn};

use crate::error::{SyncError, SyncResult};
use crate::sink::{RoundSink, RowKey, SyncRow};

/// Delivery state of one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    /// Queued or in flight.
    Pending,
    /// Accepted by the sink.
    Synced,
    /// The last attempt failed; can be retried.
    Failed(SyncError),
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Synced => write!(f, "synced"),
            Self::Failed(e) => write!(f, "failed: {e}"),
        }
    }
}

#[derive(Debug)]
struct Entry {
    status: SyncStatus,
    row: SyncRow,
}

#[derive(Debug, Default)]
struct Board {
    entries: Mutex<BTreeMap<RowKey, Entry>>,
    changed: Condvar,
}

impl Board {
    fn lock(&self) -> MutexGuard<'_, BTreeMap<RowKey, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set(&self, key: RowKey, status: SyncStatus) {
        if let Some(entry) = self.lock().get_mut(&key) {
            entry.status = status;
        }
        self.changed.notify_all();
    }
}

/// Feeds rows to a sink on its own thread and tracks each row's status.
///
/// One worker serves one session, across all of its games; rows are tracked
/// by [`RowKey`]. Rows are delivered in submission order.
#[derive(Debug)]
pub struct SyncWorker {
    sink_name: String,
    sender: Option<Sender<SyncRow>>,
    board: Arc<Board>,
    handle: Option<JoinHandle<()>>,
}

impl SyncWorker {
    /// Spawn the delivery thread.
    pub fn spawn(mut sink: Box<dyn RoundSink>) -> Self {
        let sink_name = sink.name().to_string();
        let board = Arc::new(Board::default());
        let (sender, receiver) = mpsc::channel::<SyncRow>();

        let thread_board = Arc::clone(&board);
        let handle = thread::spawn(move || {
            for row in receiver {
                let key = row.key();
                let status = match sink.append(&row) {
                    Ok(()) => {
                        info!(%key, sink = sink.name(), "round synced");
                        SyncStatus::Synced
                    }
                    Err(e) => {
                        warn!(%key, sink = sink.name(), error = %e, "round sync failed");
                        SyncStatus::Failed(e)
                    }
                };
                thread_board.set(key, status);
            }
        });

        Self {
            sink_name,
            sender: Some(sender),
            board,
            handle: Some(handle),
        }
    }

    /// Label of the sink being fed.
    pub fn sink_name(&self) -> &str {
        &self.sink_name
    }

    /// Queue a row. Returns immediately; the outcome shows up in
    /// [`SyncWorker::status`].
    pub fn submit(&self, row: SyncRow) -> SyncResult<()> {
        let key = row.key();
        self.board.lock().insert(
            key,
            Entry {
                status: SyncStatus::Pending,
                row: row.clone(),
            },
        );

        let sent = self
            .sender
            .as_ref()
            .is_some_and(|sender| sender.send(row).is_ok());
        if !sent {
            self.board
                .set(key, SyncStatus::Failed(SyncError::WorkerStopped));
            return Err(SyncError::WorkerStopped);
        }
        Ok(())
    }

    /// Status of one row, if it was ever submitted.
    pub fn status(&self, key: RowKey) -> Option<SyncStatus> {
        self.board.lock().get(&key).map(|e| e.status.clone())
    }

    /// Status of every submitted row, oldest game first.
    pub fn statuses(&self) -> Vec<(RowKey, SyncStatus)> {
        self.board
            .lock()
            .iter()
            .map(|(key, e)| (*key, e.status.clone()))
            .collect()
    }

    /// Number of rows not yet answered by the sink.
    pub fn pending(&self) -> usize {
        self.board
            .lock()
            .values()
            .filter(|e| e.status == SyncStatus::Pending)
            .count()
    }

    /// Queue every failed row again. Returns how many were resubmitted.
    pub fn retry_failed(&self) -> SyncResult<usize> {
        let failed: Vec<SyncRow> = self
            .board
            .lock()
            .values()
            .filter(|e| matches!(e.status, SyncStatus::Failed(_)))
            .map(|e| e.row.clone())
            .collect();
        let count = failed.len();
        for row in failed {
            self.submit(row)?;
        }
        Ok(count)
    }

    /// Wait until nothing is pending or `timeout` passes. Returns whether
    /// the queue drained.
    pub fn flush(&self, timeout: Duration) -> bool {
        let guard = self.board.lock();
        let (guard, _) = self
            .board
            .changed
            .wait_timeout_while(guard, timeout, |entries| {
                entries.values().any(|e| e.status == SyncStatus::Pending)
            })
            .unwrap_or_else(PoisonError::into_inner);
        !guard.values().any(|e| e.status == SyncStatus::Pending)
    }

    /// Stop accepting rows, deliver what is queued, and join the thread.
    /// Returns the final status of every row.
    pub fn shutdown(mut self) -> Vec<(RowKey, SyncStatus)> {
        self.stop();
        self.statuses()
    }

    fn stop(&mut self) {
        self.sender.take();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            warn!(sink = %self.sink_name, "sync worker panicked");
        }
    }
}

impl Drop for SyncWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails the first `failures` appends, then succeeds and keeps what it
    /// was given.
    struct FlakySink {
        failures: usize,
        calls: Arc<AtomicUsize>,
        delivered: Arc<Mutex<Vec<SyncRow>>>,
    }

    impl RoundSink for FlakySink {
        fn name(&self) -> &str {
            "flaky"
        }

        fn append(&mut self, row: &SyncRow) -> SyncResult<()> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(SyncError::Unauthorized("bad token".to_string()))
            } else {
                self.delivered.lock().unwrap().push(row.clone());
                Ok(())
            }
        }
    }

    struct Flaky {
        worker: SyncWorker,
        calls: Arc<AtomicUsize>,
        delivered: Arc<Mutex<Vec<SyncRow>>>,
    }

    fn flaky(failures: usize) -> Flaky {
        let calls = Arc::new(AtomicUsize::new(0));
        let delivered = Arc::new(Mutex::new(Vec::new()));
        let sink = FlakySink {
            failures,
            calls: Arc::clone(&calls),
            delivered: Arc::clone(&delivered),
        };
        Flaky {
            worker: SyncWorker::spawn(Box::new(sink)),
            calls,
            delivered,
        }
    }

    fn row(game: u32, round: u32, story: &str) -> SyncRow {
        SyncRow {
            game,
            round,
            header: vec!["Story".to_string()],
            values: vec![story.to_string()],
        }
    }

    #[test]
    fn rows_get_synced() {
        let f = flaky(0);
        f.worker.submit(row(1, 1, "a")).unwrap();
        f.worker.submit(row(1, 2, "b")).unwrap();
        assert!(f.worker.flush(Duration::from_secs(5)));
        assert_eq!(f.worker.status(RowKey::new(1, 1)), Some(SyncStatus::Synced));
        assert_eq!(f.worker.status(RowKey::new(1, 2)), Some(SyncStatus::Synced));
        assert_eq!(f.calls.load(Ordering::SeqCst), 2);
        assert_eq!(f.worker.pending(), 0);
    }

    #[test]
    fn failure_is_recorded_and_retryable() {
        let f = flaky(1);
        f.worker.submit(row(1, 1, "a")).unwrap();
        assert!(f.worker.flush(Duration::from_secs(5)));
        assert!(matches!(
            f.worker.status(RowKey::new(1, 1)),
            Some(SyncStatus::Failed(SyncError::Unauthorized(_)))
        ));

        assert_eq!(f.worker.retry_failed().unwrap(), 1);
        assert!(f.worker.flush(Duration::from_secs(5)));
        assert_eq!(f.worker.status(RowKey::new(1, 1)), Some(SyncStatus::Synced));
        assert_eq!(f.calls.load(Ordering::SeqCst), 2);
        assert_eq!(f.worker.retry_failed().unwrap(), 0);
    }

    #[test]
    fn new_game_keeps_failed_rows_of_the_previous_one() {
        let f = flaky(3);
        f.worker.submit(row(1, 1, "old game")).unwrap();
        f.worker.submit(row(1, 2, "old game r2")).unwrap();
        f.worker.submit(row(2, 1, "new game")).unwrap();
        assert!(f.worker.flush(Duration::from_secs(5)));

        let keys: Vec<RowKey> = f.worker.statuses().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            [RowKey::new(1, 1), RowKey::new(1, 2), RowKey::new(2, 1)]
        );

        assert_eq!(f.worker.retry_failed().unwrap(), 3);
        assert!(f.worker.flush(Duration::from_secs(5)));
        let stories: Vec<String> = f
            .delivered
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.values[0].clone())
            .collect();
        assert_eq!(stories, ["old game", "old game r2", "new game"]);
    }

    #[test]
    fn unknown_row_has_no_status() {
        let f = flaky(0);
        assert_eq!(f.worker.status(RowKey::new(1, 7)), None);
        assert!(f.worker.statuses().is_empty());
    }

    #[test]
    fn shutdown_delivers_queued_rows() {
        let f = flaky(0);
        for round in 1..=3 {
            f.worker.submit(row(1, round, "r")).unwrap();
        }
        let statuses = f.worker.shutdown();
        assert_eq!(f.calls.load(Ordering::SeqCst), 3);
        assert_eq!(statuses.len(), 3);
        assert!(statuses.iter().all(|(_, s)| *s == SyncStatus::Synced));
    }

    #[test]
    fn status_display() {
        assert_eq!(SyncStatus::Pending.to_string(), "pending");
        assert_eq!(
            SyncStatus::Failed(SyncError::Timeout).to_string(),
            "failed: remote sheet timed out"
        );
    }
}
