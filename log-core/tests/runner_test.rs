use anyhow::anyhow;
use async_trait::async_trait;
use log_core::{current_trace, RunnerConfig, Task, TaskResult, WorkerRunner};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct CountingTask {
    calls: AtomicUsize,
    fail_every: Option<usize>,
    traces: Mutex<HashSet<u64>>,
}

#[async_trait]
impl Task for CountingTask {
    fn name(&self) -> &str {
        "counting"
    }

    async fn run(&self) -> anyhow::Result<TaskResult> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(trace) = current_trace() {
            self.traces.lock().unwrap().insert(trace.trace_id);
        }
        match self.fail_every {
            Some(k) if n % k == 0 => Err(anyhow!("call {} failed", n)),
            _ => Ok(TaskResult::new(format!("call {}", n))),
        }
    }
}

#[tokio::test]
async fn test_runner_counts_success_and_failure() {
    let task = Arc::new(CountingTask {
        fail_every: Some(3),
        ..Default::default()
    });
    let config = RunnerConfig {
        workers: 1,
        iterations: Some(6),
        interval: Duration::from_millis(1),
    };

    let stats = WorkerRunner::run_task(Arc::clone(&task), config).await.unwrap();

    assert_eq!(stats.total(), 6);
    assert_eq!(stats.failed, 2);
    assert_eq!(stats.success, 4);
}

#[tokio::test]
async fn test_each_invocation_gets_its_own_trace() {
    let task = Arc::new(CountingTask::default());
    let config = RunnerConfig {
        workers: 2,
        iterations: Some(5),
        interval: Duration::from_millis(1),
    };

    WorkerRunner::run_task(Arc::clone(&task), config).await.unwrap();

    assert_eq!(task.calls.load(Ordering::SeqCst), 10);
    assert_eq!(task.traces.lock().unwrap().len(), 10);
    assert!(current_trace().is_none());
}

#[tokio::test]
async fn test_unbounded_runner_stops_on_cancel() {
    let task = Arc::new(CountingTask::default());
    let config = RunnerConfig {
        workers: 2,
        iterations: None,
        interval: Duration::from_millis(5),
    };
    let token = CancellationToken::new();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let stats = WorkerRunner::run_until(Arc::clone(&task), config, token).await;
    assert!(stats.success >= 2);
    assert_eq!(stats.failed, 0);
}

#[tokio::test]
async fn test_zero_iterations_never_invokes() {
    let task = Arc::new(CountingTask::default());
    let config = RunnerConfig {
        workers: 2,
        iterations: Some(0),
        interval: Duration::from_millis(1),
    };

    let stats = WorkerRunner::run_until(Arc::clone(&task), config, CancellationToken::new()).await;

    assert_eq!(stats.total(), 0);
    assert_eq!(task.calls.load(Ordering::SeqCst), 0);
}
