pub mod pool;
pub mod run;

pub use pool::{AsyncJobHandle, AsyncWorkerPool, MAX_ASYNC_WORKERS};
pub use run::{run_async, run_tasks_async};
