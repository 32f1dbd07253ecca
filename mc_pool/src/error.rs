//! Error types for the sampling pool

use std::io;
use thiserror::Error;

/// Result type alias using the pool's Error type
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A pool needs at least one worker
    #[error("cannot create a worker pool with 0 workers")]
    NoWorkers,

    /// More workers than the pool can represent
    #[error("cannot create a worker pool with {requested} workers, the limit is {max}")]
    TooManyWorkers { requested: usize, max: usize },

    /// The OS refused to start a worker thread
    #[error("failed to spawn worker thread {worker_id}")]
    Spawn {
        worker_id: usize,
        #[source]
        source: io::Error,
    },

    /// Submission after the pool stopped accepting work
    #[error("worker pool is shut down")]
    PoolClosed,

    /// The job panicked on its worker
    #[error("job {job_id} panicked: {message}")]
    TaskPanicked { job_id: u64, message: String },

    /// The job was dropped without reporting a result
    #[error("job {job_id} finished without reporting a result")]
    ResultLost { job_id: u64 },

    /// Sample count must not be negative
    #[error("task {index}: invalid sample count {samples}, must be >= 0")]
    InvalidSampleCount { index: u64, samples: i64 },

    /// Subscriber setup failed
    #[error("logging error: {0}")]
    Logging(String),
}
