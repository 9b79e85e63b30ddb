use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use log_core::{setup_diagnostics, LogSettings, RunnerConfig, TaskLogger, WorkerRunner};
use message_worker::LogSomethingTask;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Invocations per worker; 0 runs until Ctrl+C
    #[arg(short, long, default_value = "1")]
    iterations: u64,
    /// Concurrent workers sharing one logger
    #[arg(short, long, default_value = "1")]
    workers: usize,
    /// Pause between invocations, in milliseconds
    #[arg(long, default_value = "1000")]
    interval_ms: u64,
    /// Also write the worker's own diagnostics to a rolling file here
    #[arg(long)]
    diagnostics_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();

    // Keep guard alive for file diagnostics
    let _diag_guard = setup_diagnostics(args.diagnostics_dir.as_deref())?;

    let settings = LogSettings::from_env().context("Invalid logging configuration")?;
    info!(
        "Log pipeline: format={:?} output={} correlated={} level={}",
        settings.format,
        settings.output.kind(),
        settings.correlated,
        settings.max_level
    );

    let logger = TaskLogger::from_settings(&settings).context("Failed to build task logger")?;
    let task = Arc::new(LogSomethingTask::new(Arc::new(logger)));

    let config = RunnerConfig {
        workers: args.workers,
        iterations: (args.iterations > 0).then_some(args.iterations),
        interval: Duration::from_millis(args.interval_ms),
    };

    let stats = WorkerRunner::run_task(task, config).await?;
    if stats.failed > 0 {
        anyhow::bail!("{} of {} task invocations failed", stats.failed, stats.total());
    }
    Ok(())
}
