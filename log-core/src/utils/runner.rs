use crate::correlation::{in_trace, TraceContext};
use crate::traits::Task;
use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::signal;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, Instrument};

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Concurrent invocation loops
    pub workers: usize,
    /// Invocations per worker; `None` runs until cancelled
    pub iterations: Option<u64>,
    /// Pause between invocations on one worker
    pub interval: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            iterations: Some(1),
            interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub success: u64,
    pub failed: u64,
}

impl RunStats {
    pub fn total(&self) -> u64 {
        self.success + self.failed
    }
}

pub struct WorkerRunner;

impl WorkerRunner {
    /// Invoke `task` from `config.workers` concurrent loops until each has
    /// run `config.iterations` times or Ctrl+C is received.
    pub async fn run_task<T>(task: Arc<T>, config: RunnerConfig) -> Result<RunStats>
    where
        T: Task + ?Sized + 'static,
    {
        let token = CancellationToken::new();
        let cloned_token = token.clone();

        // Spawn a task to listen for Ctrl+C
        let signal_handle = tokio::spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    info!("🛑 Received Ctrl+C. Initiating graceful shutdown...");
                    cloned_token.cancel();
                }
                Err(err) => {
                    error!("Unable to listen for shutdown signal: {}", err);
                }
            }
        });

        let stats = Self::run_until(task, config, token).await;
        signal_handle.abort();
        Ok(stats)
    }

    /// Same as [`WorkerRunner::run_task`] but stops on `token` instead of a
    /// signal.
    pub async fn run_until<T>(task: Arc<T>, config: RunnerConfig, token: CancellationToken) -> RunStats
    where
        T: Task + ?Sized + 'static,
    {
        let mut set = JoinSet::new();
        let start_time = Instant::now();
        let workers = config.workers.max(1);
        info!(
            "Starting {} worker(s) for task '{}'...",
            workers,
            task.name()
        );

        for i in 0..workers {
            let id = i + 1;
            let span = tracing::info_span!("worker", worker_id = format!("{:03}", id));
            let task = Arc::clone(&task);
            let token = token.clone();
            let config = config.clone();

            set.spawn(
                async move {
                    let mut stats = RunStats::default();
                    let mut runs: u64 = 0;

                    loop {
                        if token.is_cancelled()
                            || config.iterations.is_some_and(|limit| runs >= limit)
                        {
                            break;
                        }

                        if runs > 0 {
                            tokio::select! {
                                _ = token.cancelled() => break,
                                _ = tokio::time::sleep(config.interval) => {}
                            }
                        }

                        let trace = TraceContext::new_root();
                        match in_trace(trace, task.run()).await {
                            Ok(result) => {
                                stats.success += 1;
                                debug!(trace_id = trace.trace_id, "Task returned: {}", result.message);
                            }
                            Err(e) => {
                                stats.failed += 1;
                                error!("Task '{}' failed: {:?}", task.name(), e);
                            }
                        }

                        runs += 1;
                    }

                    stats
                }
                .instrument(span),
            );
        }

        let mut total = RunStats::default();
        while let Some(res) = set.join_next().await {
            match res {
                Ok(stats) => {
                    total.success += stats.success;
                    total.failed += stats.failed;
                }
                Err(e) => {
                    error!("A worker task panicked or failed to join: {:?}", e);
                }
            }
        }

        let rate = if total.total() > 0 {
            (total.success as f64 / total.total() as f64) * 100.0
        } else {
            0.0
        };

        info!(
            "Total Time: {:.1}s | Total Success: {} | Total Fail: {} | Success Rate: {:.2}%",
            start_time.elapsed().as_secs_f64(),
            total.success,
            total.failed,
            rate
        );

        total
    }
}
