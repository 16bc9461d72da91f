//! Deferred deletion of temporary files.
//!
//! A single worker task owns a min-heap of pending deletions keyed by due
//! instant. Callers hand paths to [`CleanupScheduler::schedule`] and return
//! immediately; the worker sleeps until the earliest entry is due.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

#[derive(Debug)]
struct Pending {
    due: Instant,
    seq: u64,
    path: PathBuf,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Reversed so BinaryHeap pops the earliest deadline first.
impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Clone, Debug)]
pub struct CleanupScheduler {
    tx: mpsc::UnboundedSender<(Instant, PathBuf)>,
}

impl CleanupScheduler {
    /// Spawns the worker on the current tokio runtime.
    pub fn start() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(rx));
        Self { tx }
    }

    pub fn schedule<I, P>(&self, paths: I, delay: Duration)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let due = Instant::now() + delay;
        for path in paths {
            let path = path.into();
            log::debug!("Scheduling removal of {} in {:?}", path.display(), delay);
            if let Err(err) = self.tx.send((due, path)) {
                // Worker gone (runtime shutting down); remove right away.
                let (_, path) = err.0;
                remove_quietly(&path);
            }
        }
    }
}

async fn run_worker(mut rx: mpsc::UnboundedReceiver<(Instant, PathBuf)>) {
    let mut queue: BinaryHeap<Pending> = BinaryHeap::new();
    let mut seq = 0u64;

    loop {
        let next_due = queue.peek().map(|p| p.due);
        tokio::select! {
            msg = rx.recv() => match msg {
                Some((due, path)) => {
                    seq += 1;
                    queue.push(Pending { due, seq, path });
                }
                None => break,
            },
            _ = sleep_until_due(next_due) => {
                let now = Instant::now();
                while queue.peek().is_some_and(|p| p.due <= now) {
                    if let Some(pending) = queue.pop() {
                        remove_quietly(&pending.path);
                    }
                }
            }
        }
    }

    // Channel closed: flush whatever is left.
    while let Some(pending) = queue.pop() {
        remove_quietly(&pending.path);
    }
}

async fn sleep_until_due(due: Option<Instant>) {
    match due {
        Some(due) => tokio::time::sleep_until(due).await,
        None => std::future::pending::<()>().await,
    }
}

/// Deletes a file, treating "already gone" as success. Never fails.
pub fn remove_quietly(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => log::debug!("Removed {}", path.display()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            log::debug!("{} already removed", path.display())
        }
        Err(err) => log::warn!("Failed to remove {}: {}", path.display(), err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heap_pops_earliest_first() {
        let now = Instant::now();
        let mut heap = BinaryHeap::new();
        heap.push(Pending { due: now + Duration::from_secs(5), seq: 1, path: "late".into() });
        heap.push(Pending { due: now, seq: 2, path: "early".into() });
        heap.push(Pending { due: now, seq: 3, path: "early-2".into() });
        assert_eq!(heap.pop().unwrap().path, PathBuf::from("early"));
        assert_eq!(heap.pop().unwrap().path, PathBuf::from("early-2"));
        assert_eq!(heap.pop().unwrap().path, PathBuf::from("late"));
    }

    #[test]
    fn removing_a_missing_file_is_silent() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("gone.png");
        remove_quietly(&path);
        std::fs::write(&path, b"x").unwrap();
        remove_quietly(&path);
        remove_quietly(&path);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn scheduled_files_disappear_after_delay() {
        let tmp = tempfile::tempdir().unwrap();
        let soon = tmp.path().join("soon.png");
        let later = tmp.path().join("later.pdf");
        std::fs::write(&soon, b"png").unwrap();
        std::fs::write(&later, b"pdf").unwrap();

        let scheduler = CleanupScheduler::start();
        scheduler.schedule([soon.clone()], Duration::from_millis(50));
        scheduler.schedule([later.clone()], Duration::from_secs(60));
        // Same file twice: second delete must be a no-op.
        scheduler.schedule([soon.clone()], Duration::from_millis(80));

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(!soon.exists());
        assert!(later.exists());
    }
}
