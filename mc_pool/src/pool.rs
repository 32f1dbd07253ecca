//! Fixed-size thread pool with per-job result handles.
//!
//! Workers pull boxed jobs from one shared queue. Every submission gets its
//! own one-shot result channel, so handles can be awaited in any order and a
//! slow consumer never stalls a worker.
//!
//! Lifecycle: `new` spawns every worker up front, `submit` enqueues work,
//! `shutdown` (or drop) closes the queue, lets the workers drain what was
//! already submitted and joins them.

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::error::{Error, Result};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Upper bound on threads a single pool will spawn.
pub const MAX_WORKERS: usize = 4096;

thread_local! {
    static WORKER_ID: Cell<Option<usize>> = const { Cell::new(None) };
}

/// Id of the pool worker running on this thread, `None` outside a pool.
pub fn current_worker() -> Option<usize> {
    WORKER_ID.with(|id| id.get())
}

#[derive(Default)]
struct WorkerCounters {
    jobs: AtomicU64,
    busy_nanos: AtomicU64,
}

impl WorkerCounters {
    fn record(&self, elapsed: Duration) {
        self.jobs.fetch_add(1, Ordering::Relaxed);
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.busy_nanos.fetch_add(nanos, Ordering::Relaxed);
    }
}

pub struct WorkerPool {
    workers: Vec<thread::JoinHandle<()>>,
    job_tx: Option<Sender<Job>>,
    counters: Arc<Vec<WorkerCounters>>,
    next_job: AtomicU64,
}

impl WorkerPool {
    /// Spawns `num_workers` threads named `mc-worker-{id}`.
    pub fn new(num_workers: usize) -> Result<Self> {
        if num_workers == 0 {
            return Err(Error::NoWorkers);
        }
        if num_workers > MAX_WORKERS {
            return Err(Error::TooManyWorkers {
                requested: num_workers,
                max: MAX_WORKERS,
            });
        }

        let (job_tx, job_rx) = unbounded::<Job>();
        let counters: Arc<Vec<WorkerCounters>> =
            Arc::new((0..num_workers).map(|_| WorkerCounters::default()).collect());

        // Dropping a half-built pool closes the queue and joins what started.
        let mut pool = Self {
            workers: Vec::with_capacity(num_workers),
            job_tx: Some(job_tx),
            counters: Arc::clone(&counters),
            next_job: AtomicU64::new(0),
        };

        for worker_id in 0..num_workers {
            let job_rx = job_rx.clone();
            let counters = Arc::clone(&counters);

            let handle = thread::Builder::new()
                .name(format!("mc-worker-{}", worker_id))
                .spawn(move || worker_loop(worker_id, job_rx, counters))
                .map_err(|source| Error::Spawn { worker_id, source })?;

            pool.workers.push(handle);
        }

        info!(workers = num_workers, "worker pool started");
        Ok(pool)
    }

    pub fn worker_count(&self) -> usize {
        self.counters.len()
    }

    /// Queues `f` and returns a handle to its eventual result.
    ///
    /// A panic inside `f` is caught on the worker and reported through the
    /// handle; the worker keeps serving the queue.
    pub fn submit<F, T>(&self, f: F) -> Result<JobHandle<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let job_tx = self.job_tx.as_ref().ok_or(Error::PoolClosed)?;
        let job_id = self.next_job.fetch_add(1, Ordering::Relaxed);
        let (result_tx, result_rx) = bounded(1);

        let job: Job = Box::new(move || {
            debug!(job_id, worker = ?current_worker(), "job started");
            let outcome = panic::catch_unwind(AssertUnwindSafe(f));
            // The handle may already be gone; nobody is waiting then.
            let _ = result_tx.send(outcome);
        });

        job_tx.send(job).map_err(|_| Error::PoolClosed)?;
        Ok(JobHandle { job_id, result_rx })
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            workers: self
                .counters
                .iter()
                .enumerate()
                .map(|(worker_id, c)| WorkerStats {
                    worker_id,
                    jobs_completed: c.jobs.load(Ordering::Relaxed),
                    busy: Duration::from_nanos(c.busy_nanos.load(Ordering::Relaxed)),
                })
                .collect(),
        }
    }

    /// Stops accepting work, waits for every queued job and joins the workers.
    pub fn shutdown(mut self) -> PoolStats {
        self.close();
        let stats = self.stats();
        info!(jobs = stats.jobs_completed(), "worker pool shut down");
        stats
    }

    fn close(&mut self) {
        // Workers exit once the queue is both closed and empty.
        self.job_tx.take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.close();
    }
}

fn worker_loop(worker_id: usize, jobs: Receiver<Job>, counters: Arc<Vec<WorkerCounters>>) {
    WORKER_ID.with(|id| id.set(Some(worker_id)));
    for job in jobs.iter() {
        let started = Instant::now();
        job();
        counters[worker_id].record(started.elapsed());
    }
    debug!(worker_id, "worker exiting");
}

/// Pending result of one submitted job.
pub struct JobHandle<T> {
    job_id: u64,
    result_rx: Receiver<thread::Result<T>>,
}

impl<T> JobHandle<T> {
    pub fn id(&self) -> u64 {
        self.job_id
    }

    /// True once the result is ready; `wait` will not block.
    pub fn is_finished(&self) -> bool {
        !self.result_rx.is_empty()
    }

    /// Blocks until the job has run and returns its value.
    pub fn wait(self) -> Result<T> {
        match self.result_rx.recv() {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(payload)) => Err(Error::TaskPanicked {
                job_id: self.job_id,
                message: panic_message(payload.as_ref()),
            }),
            Err(_) => Err(Error::ResultLost {
                job_id: self.job_id,
            }),
        }
    }
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerStats {
    pub worker_id: usize,
    pub jobs_completed: u64,
    pub busy: Duration,
}

/// Per-worker job counts and busy time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStats {
    pub workers: Vec<WorkerStats>,
}

impl PoolStats {
    pub fn jobs_completed(&self) -> u64 {
        self.workers.iter().map(|w| w.jobs_completed).sum()
    }
}

impl fmt::Display for PoolStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>6} | {:>6} | {:>10}", "worker", "jobs", "busy (s)")?;
        for w in &self.workers {
            writeln!(
                f,
                "{:>6} | {:>6} | {:>10.3}",
                w.worker_id,
                w.jobs_completed,
                w.busy.as_secs_f64()
            )?;
        }
        write!(f, "total jobs: {}", self.jobs_completed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_workers_is_rejected() {
        assert!(matches!(WorkerPool::new(0), Err(Error::NoWorkers)));
    }

    #[test]
    fn oversized_pool_is_rejected() {
        for requested in [MAX_WORKERS + 1, usize::MAX] {
            match WorkerPool::new(requested) {
                Err(Error::TooManyWorkers { requested: r, max }) => {
                    assert_eq!((r, max), (requested, MAX_WORKERS));
                }
                Err(other) => panic!("expected TooManyWorkers, got {:?}", other),
                Ok(_) => panic!("pool of {} workers was accepted", requested),
            }
        }
    }

    #[test]
    fn handles_resolve_to_job_values() {
        let pool = WorkerPool::new(3).unwrap();
        assert_eq!(pool.worker_count(), 3);

        let handles: Vec<_> = (0..20u64)
            .map(|i| pool.submit(move || i * i).unwrap())
            .collect();
        let values: Vec<u64> = handles.into_iter().map(|h| h.wait().unwrap()).collect();

        assert_eq!(values, (0..20u64).map(|i| i * i).collect::<Vec<_>>());
    }

    #[test]
    fn job_ids_follow_submission_order() {
        let pool = WorkerPool::new(2).unwrap();
        let a = pool.submit(|| ()).unwrap();
        let b = pool.submit(|| ()).unwrap();
        assert_eq!((a.id(), b.id()), (0, 1));
    }

    #[test]
    fn jobs_run_on_pool_workers() {
        assert_eq!(current_worker(), None);

        let pool = WorkerPool::new(2).unwrap();
        let worker = pool.submit(current_worker).unwrap().wait().unwrap();
        assert!(matches!(worker, Some(id) if id < 2));
    }

    #[test]
    fn panic_surfaces_at_wait() {
        let pool = WorkerPool::new(1).unwrap();
        let bad = pool.submit(|| -> u32 { panic!("boom") }).unwrap();
        let good = pool.submit(|| 5u32).unwrap();

        match bad.wait() {
            Err(Error::TaskPanicked { job_id: 0, message }) => assert_eq!(message, "boom"),
            other => panic!("expected TaskPanicked, got {:?}", other),
        }
        // the worker survived the panic
        assert_eq!(good.wait().unwrap(), 5);
    }

    #[test]
    fn is_finished_turns_true() {
        let pool = WorkerPool::new(1).unwrap();
        let handle = pool.submit(|| 1).unwrap();

        let deadline = Instant::now() + Duration::from_secs(10);
        while !handle.is_finished() {
            assert!(Instant::now() < deadline, "job never finished");
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(handle.wait().unwrap(), 1);
    }

    #[test]
    fn shutdown_drains_queue_and_counts_jobs() {
        let pool = WorkerPool::new(2).unwrap();
        let handles: Vec<_> = (0..10)
            .map(|_| {
                pool.submit(|| thread::sleep(Duration::from_millis(2)))
                    .unwrap()
            })
            .collect();

        let stats = pool.shutdown();
        assert_eq!(stats.workers.len(), 2);
        assert_eq!(stats.jobs_completed(), 10);

        for handle in handles {
            assert!(handle.is_finished());
            handle.wait().unwrap();
        }
    }

    #[test]
    fn stats_render_one_row_per_worker() {
        let pool = WorkerPool::new(3).unwrap();
        let text = pool.shutdown().to_string();
        assert_eq!(text.lines().count(), 5);
        assert!(text.ends_with("total jobs: 0"));
    }
}
