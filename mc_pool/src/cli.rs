use clap::Parser;

use crate::config::{
    RunConfig, WorkerCount, DEFAULT_SAMPLE_SIZE, DEFAULT_TASK_COUNT, DEFAULT_WORKER_COUNT,
};

/// Seeded Monte Carlo sample means computed on a fixed worker pool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Pool size, or 'auto' for the available parallelism
    #[arg(short, long, default_value_t = WorkerCount::Fixed(DEFAULT_WORKER_COUNT))]
    pub workers: WorkerCount,

    /// Number of tasks (indices 0..tasks)
    #[arg(short = 'm', long, default_value_t = DEFAULT_TASK_COUNT)]
    pub tasks: u64,

    /// Standard-normal draws per task
    #[arg(short = 'n', long, default_value_t = DEFAULT_SAMPLE_SIZE, allow_negative_numbers = true)]
    pub samples: i64,

    /// Log level or filter directive
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    pub fn to_config(&self) -> RunConfig {
        RunConfig {
            worker_count: self.workers,
            task_count: self.tasks,
            sample_size: self.samples,
        }
    }
}
