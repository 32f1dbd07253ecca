//! Fan-out / ordered fan-in over a `WorkerPool`.

use std::time::Instant;
use tracing::{debug, info};

use crate::config::RunConfig;
use crate::error::Result;
use crate::monte_carlo::{build_tasks, sample_mean, SampleMean, SampleTask};
use crate::pool::WorkerPool;

/// Runs one full batch: pool up, submit all, collect in order, pool down.
///
/// The pool is shut down even when a task fails; the first failure in
/// submission order is returned.
pub fn run(config: &RunConfig) -> Result<Vec<SampleMean>> {
    let workers = config.worker_count.resolve();
    let pool = WorkerPool::new(workers)?;
    info!(
        workers,
        tasks = config.task_count,
        samples = config.sample_size,
        "running sample means"
    );

    let start = Instant::now();
    let results = run_tasks(&pool, build_tasks(config.task_count, config.sample_size));
    let stats = pool.shutdown();

    info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        jobs = stats.jobs_completed(),
        "batch finished"
    );
    debug!("per-worker stats\n{}", stats);
    results
}

/// Submits every task, then waits on the handles in submission order.
pub fn run_tasks<I>(pool: &WorkerPool, tasks: I) -> Result<Vec<SampleMean>>
where
    I: IntoIterator<Item = SampleTask>,
{
    let handles = tasks
        .into_iter()
        .map(|task| pool.submit(move || sample_mean(task)))
        .collect::<Result<Vec<_>>>()?;
    debug!(jobs = handles.len(), "all tasks submitted");

    handles
        .into_iter()
        .map(|handle| handle.wait().and_then(|result| result))
        .collect()
}
