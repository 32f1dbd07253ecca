pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod monte_carlo;
pub mod pool;
pub mod run;

pub use config::{RunConfig, RunConfigBuilder, WorkerCount};
pub use error::{Error, Result};
pub use monte_carlo::{build_tasks, format_results, sample_mean, SampleMean, SampleTask};
pub use pool::{
    current_worker, panic_message, JobHandle, PoolStats, WorkerPool, WorkerStats, MAX_WORKERS,
};
pub use run::{run, run_tasks};
