//! Thin glue around the silence-cut pipeline: task tracking, simulated
//! progress reporting, and worker configuration.

pub mod config;
pub mod error;
pub mod executor;
pub mod tasks;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use executor::run_tracked;
pub use tasks::{Task, TaskId, TaskRegistry, TaskStatus};
