use mc_pool::{build_tasks, sample_mean, Result, RunConfig, SampleMean, SampleTask};
use std::time::Instant;
use tracing::info;

use crate::pool::AsyncWorkerPool;

/// Async twin of `mc_pool::run`.
pub async fn run_async(config: &RunConfig) -> Result<Vec<SampleMean>> {
    let workers = config.worker_count.resolve();
    let pool = AsyncWorkerPool::new(workers)?;
    info!(
        workers,
        tasks = config.task_count,
        samples = config.sample_size,
        "running sample means"
    );

    let start = Instant::now();
    let results =
        run_tasks_async(&pool, build_tasks(config.task_count, config.sample_size)).await;
    let jobs = pool.shutdown().await;

    info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        jobs,
        "batch finished"
    );
    results
}

/// Submits every task, then awaits the handles in submission order.
pub async fn run_tasks_async<I>(pool: &AsyncWorkerPool, tasks: I) -> Result<Vec<SampleMean>>
where
    I: IntoIterator<Item = SampleTask>,
{
    let mut handles = Vec::new();
    for task in tasks {
        handles.push(pool.submit(move || sample_mean(task)).await?);
    }

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(handle.wait().await??);
    }
    Ok(results)
}
