//! Audit log of resolved request paths.
//!
//! Every successful resolution appends `/<path>` as one line, so page counts
//! fall out of `sort visits | uniq -c`. Many responder processes can append
//! at once, so writers take an advisory lock first: whoever manages to
//! create the lock file exclusively holds it, and removes it when done.
//!
//! A holder that crashes leaves the lock file behind. Waiters therefore give
//! up after a bounded number of attempts, log a warning and write anyway.
//! Nothing checks whether the holder is still alive, so a very slow holder
//! can lose its lock this way.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::config::VisitLogConfig;

/// Yields the Fibonacci sequence 1, 1, 2, 3, 5, ... as multiples of a unit.
#[derive(Debug, Clone)]
pub struct Backoff {
    unit: Duration,
    current: u32,
    next: u32,
}

impl Backoff {
    pub fn new(unit: Duration) -> Self {
        Self {
            unit,
            current: 1,
            next: 1,
        }
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let delay = self.unit.saturating_mul(self.current);
        let following = self.current.saturating_add(self.next);
        self.current = self.next;
        self.next = following;
        Some(delay)
    }
}

/// How the lock was obtained for one append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// We created the lock file
    Held,
    /// Retries ran out; the existing lock file was treated as stale
    Broken,
    /// The lock could not be attempted at all
    Unavailable,
}

#[derive(Debug, Clone)]
pub struct VisitLog {
    path: PathBuf,
    lock: PathBuf,
    max_attempts: u32,
    backoff_unit: Duration,
}

impl VisitLog {
    pub fn new(config: &VisitLogConfig) -> Self {
        Self {
            path: config.path.clone(),
            lock: config.lock.clone(),
            max_attempts: config.max_attempts,
            backoff_unit: Duration::from_millis(config.backoff_unit_ms),
        }
    }

    /// Appends `/<path>` under the lock. Failures are logged, not returned:
    /// a broken audit log must not break the reply.
    pub async fn record(&self, path: &str) -> LockState {
        let state = self.acquire().await;

        if let Err(e) = self.append(path).await {
            tracing::warn!(
                log = %self.path.display(),
                error = %e,
                "Failed to append to visit log"
            );
        }

        if state != LockState::Unavailable {
            self.release().await;
        }

        state
    }

    async fn acquire(&self) -> LockState {
        let mut backoff = Backoff::new(self.backoff_unit);
        let mut waited = Duration::ZERO;

        for _ in 0..self.max_attempts {
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&self.lock)
                .await
            {
                Ok(_) => return LockState::Held,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    let delay = backoff.next().unwrap_or(self.backoff_unit);
                    tokio::time::sleep(delay).await;
                    waited += delay;
                }
                Err(e) => {
                    tracing::warn!(
                        lock = %self.lock.display(),
                        error = %e,
                        "Bad visit log lock"
                    );
                    return LockState::Unavailable;
                }
            }
        }

        tracing::warn!(
            lock = %self.lock.display(),
            waited_ms = waited.as_millis() as u64,
            attempts = self.max_attempts,
            "Breaking stale visit log lock"
        );
        LockState::Broken
    }

    async fn append(&self, path: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        // one write per line so readers never see half of it
        file.write_all(format!("/{path}\n").as_bytes()).await?;
        file.flush().await
    }

    async fn release(&self) {
        match tokio::fs::remove_file(&self.lock).await {
            Err(e) if e.kind() != ErrorKind::NotFound => {
                tracing::warn!(
                    lock = %self.lock.display(),
                    error = %e,
                    "Failed to release visit log lock"
                );
            }
            _ => {}
        }
    }
}
