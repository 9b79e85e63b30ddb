//! Message worker: a single task that logs a random catalog message through
//! the log-core pipeline.

pub mod catalog;
pub mod task;

pub use catalog::{pick_message, MESSAGES};
pub use task::{log_something, log_something_with, LogSomethingTask, TASK_NAME};
