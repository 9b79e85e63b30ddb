use anyhow::Result;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResult {
    /// Value handed back to the caller for result storage
    pub message: String,
}

impl TaskResult {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A unit of work the runner can invoke with no input.
#[async_trait]
pub trait Task: Send + Sync {
    /// Returns the name of the task
    fn name(&self) -> &str;

    /// Executes the task
    async fn run(&self) -> Result<TaskResult>;
}
