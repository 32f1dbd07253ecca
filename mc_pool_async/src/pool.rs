//! tokio flavour of the worker pool.
//!
//! A semaphore with one permit per worker bounds how many jobs run at once.
//! Each job runs on tokio's blocking thread pool, so CPU-bound work gets real
//! OS threads instead of stalling the async executor.

use mc_pool::{panic_message, Error, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{self, JoinError, JoinHandle};
use tracing::{debug, info};

/// Largest pool `AsyncWorkerPool::new` accepts: every permit must fit both
/// the semaphore and the single `acquire_many` that `shutdown` issues.
pub const MAX_ASYNC_WORKERS: usize = if Semaphore::MAX_PERMITS < u32::MAX as usize {
    Semaphore::MAX_PERMITS
} else {
    u32::MAX as usize
};

pub struct AsyncWorkerPool {
    permits: Arc<Semaphore>,
    workers: u32,
    next_job: AtomicU64,
    completed: Arc<AtomicU64>,
}

impl AsyncWorkerPool {
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(Error::NoWorkers);
        }
        let permits = match u32::try_from(workers) {
            Ok(permits) if workers <= MAX_ASYNC_WORKERS => permits,
            _ => {
                return Err(Error::TooManyWorkers {
                    requested: workers,
                    max: MAX_ASYNC_WORKERS,
                })
            }
        };

        info!(workers, "async worker pool started");
        Ok(Self {
            permits: Arc::new(Semaphore::new(workers)),
            workers: permits,
            next_job: AtomicU64::new(0),
            completed: Arc::new(AtomicU64::new(0)),
        })
    }

    pub fn worker_count(&self) -> usize {
        self.workers as usize
    }

    pub fn jobs_submitted(&self) -> u64 {
        self.next_job.load(Ordering::Relaxed)
    }

    pub fn jobs_completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Waits for a free slot, then starts `f` on the blocking pool.
    ///
    /// The slot is released as soon as `f` returns or panics, whether or not
    /// anyone has collected the result yet.
    pub async fn submit<F, T>(&self, f: F) -> Result<AsyncJobHandle<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| Error::PoolClosed)?;
        let job_id = self.next_job.fetch_add(1, Ordering::Relaxed);
        let completed = Arc::clone(&self.completed);

        let inner = task::spawn_blocking(move || {
            let _permit = permit;
            debug!(job_id, "job started");
            let value = f();
            completed.fetch_add(1, Ordering::Relaxed);
            value
        });

        Ok(AsyncJobHandle { job_id, inner })
    }

    /// Waits for every running job, then refuses further submissions.
    /// Returns the number of jobs that ran to completion.
    pub async fn shutdown(self) -> u64 {
        // Only fails if already closed, which nothing else does.
        let _drained = self.permits.acquire_many(self.workers).await;
        self.permits.close();
        let jobs = self.jobs_completed();
        info!(jobs, "async worker pool shut down");
        jobs
    }
}

/// Pending result of one job on an `AsyncWorkerPool`.
pub struct AsyncJobHandle<T> {
    job_id: u64,
    inner: JoinHandle<T>,
}

impl<T> AsyncJobHandle<T> {
    pub fn id(&self) -> u64 {
        self.job_id
    }

    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    pub async fn wait(self) -> Result<T> {
        let job_id = self.job_id;
        self.inner.await.map_err(|e| join_error(job_id, e))
    }
}

fn join_error(job_id: u64, err: JoinError) -> Error {
    if err.is_panic() {
        Error::TaskPanicked {
            job_id,
            message: panic_message(err.into_panic().as_ref()),
        }
    } else {
        Error::ResultLost { job_id }
    }
}
