//! Run configuration.
//!
//! ```ignore
//! let config = RunConfig::builder()
//!     .worker_count(4)
//!     .task_count(3)
//!     .sample_size(1000)
//!     .build();
//! ```

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::thread;
use tracing::warn;

pub const DEFAULT_WORKER_COUNT: usize = 4;
pub const DEFAULT_TASK_COUNT: u64 = 40;
pub const DEFAULT_SAMPLE_SIZE: i64 = 10_000_000;

/// Pool size: a fixed number or whatever the machine reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerCount {
    Fixed(usize),
    Auto,
}

impl WorkerCount {
    /// `Auto` falls back to one worker if parallelism cannot be queried.
    pub fn resolve(self) -> usize {
        match self {
            WorkerCount::Fixed(n) => n,
            WorkerCount::Auto => thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or_else(|e| {
                    warn!("could not detect available parallelism ({}), using 1 worker", e);
                    1
                }),
        }
    }
}

impl FromStr for WorkerCount {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("auto") {
            return Ok(WorkerCount::Auto);
        }
        s.parse::<usize>()
            .map(WorkerCount::Fixed)
            .map_err(|_| format!("expected a worker count or 'auto', got '{}'", s))
    }
}

impl fmt::Display for WorkerCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerCount::Fixed(n) => write!(f, "{}", n),
            WorkerCount::Auto => f.write_str("auto"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Number of parallel workers in the pool
    pub worker_count: WorkerCount,
    /// Number of tasks, one per index `0..task_count`
    pub task_count: u64,
    /// Draws per task; negative values fail inside each task
    pub sample_size: i64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            worker_count: WorkerCount::Fixed(DEFAULT_WORKER_COUNT),
            task_count: DEFAULT_TASK_COUNT,
            sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }
}

impl RunConfig {
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::default()
    }
}

/// Builder for RunConfig with method chaining
#[derive(Default)]
pub struct RunConfigBuilder {
    config: RunConfig,
}

impl RunConfigBuilder {
    pub fn worker_count(mut self, workers: usize) -> Self {
        self.config.worker_count = WorkerCount::Fixed(workers);
        self
    }

    /// Size the pool from `std::thread::available_parallelism`.
    pub fn autodetect_workers(mut self) -> Self {
        self.config.worker_count = WorkerCount::Auto;
        self
    }

    pub fn task_count(mut self, tasks: u64) -> Self {
        self.config.task_count = tasks;
        self
    }

    pub fn sample_size(mut self, samples: i64) -> Self {
        self.config.sample_size = samples;
        self
    }

    pub fn build(self) -> RunConfig {
        self.config
    }
}
