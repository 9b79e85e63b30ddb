use crate::catalog::pick_message;
use anyhow::{Context, Result};
use async_trait::async_trait;
use log_core::{Task, TaskLogger, TaskResult};
use rand::Rng;
use std::sync::Arc;

/// Registered name of the task.
pub const TASK_NAME: &str = "tasks.log_something";

/// Log a random catalog message at INFO and return it.
pub fn log_something(logger: &TaskLogger) -> Result<&'static str> {
    log_something_with(logger, &mut rand::thread_rng())
}

/// [`log_something`] with a caller-supplied RNG.
pub fn log_something_with<R: Rng + ?Sized>(logger: &TaskLogger, rng: &mut R) -> Result<&'static str> {
    let message = pick_message(rng);
    logger
        .info(message)
        .with_context(|| format!("Failed to log message '{}'", message))?;
    Ok(message)
}

/// Runner-facing wrapper around [`log_something`].
pub struct LogSomethingTask {
    logger: Arc<TaskLogger>,
}

impl LogSomethingTask {
    pub fn new(logger: Arc<TaskLogger>) -> Self {
        Self { logger }
    }
}

#[async_trait]
impl Task for LogSomethingTask {
    fn name(&self) -> &str {
        TASK_NAME
    }

    async fn run(&self) -> Result<TaskResult> {
        let message = log_something(&self.logger)?;
        Ok(TaskResult::new(message))
    }
}
