//! Distributed-tracing correlation fields.
//!
//! A [`TraceContext`] is made active for the duration of one task invocation
//! (see [`in_trace`]); the [`CorrelationSource`] attached to a
//! [`TaskLogger`](crate::TaskLogger) reads it back when a line is rendered.
//! Outside any trace the ids render as `0`.

use rand::Rng;
use serde::Serialize;
use std::env;
use std::future::Future;

pub const ENV_DD_SERVICE: &str = "DD_SERVICE";
pub const ENV_DD_ENV: &str = "DD_ENV";
pub const ENV_DD_VERSION: &str = "DD_VERSION";

tokio::task_local! {
    static ACTIVE_TRACE: TraceContext;
}

/// Ids of the trace and span a log line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceContext {
    pub trace_id: u64,
    pub span_id: u64,
}

impl TraceContext {
    /// Start a new trace whose root span shares the trace id.
    pub fn new_root() -> Self {
        let trace_id = random_id();
        Self {
            trace_id,
            span_id: trace_id,
        }
    }

    /// A new span inside the same trace.
    pub fn child(&self) -> Self {
        Self {
            trace_id: self.trace_id,
            span_id: random_id(),
        }
    }
}

fn random_id() -> u64 {
    // Zero is reserved for "no active trace"
    rand::thread_rng().gen_range(1..=u64::MAX)
}

/// The trace active on the current task, if any.
pub fn current_trace() -> Option<TraceContext> {
    ACTIVE_TRACE.try_with(|ctx| *ctx).ok()
}

/// Run `fut` with `ctx` as the active trace.
pub async fn in_trace<F>(ctx: TraceContext, fut: F) -> F::Output
where
    F: Future,
{
    ACTIVE_TRACE.scope(ctx, fut).await
}

/// Synchronous counterpart of [`in_trace`].
pub fn in_trace_sync<F, R>(ctx: TraceContext, f: F) -> R
where
    F: FnOnce() -> R,
{
    ACTIVE_TRACE.sync_scope(ctx, f)
}

/// Service identity attached to every correlated line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceInfo {
    pub service: String,
    pub env: String,
    pub version: String,
}

impl ServiceInfo {
    pub fn from_env() -> Self {
        Self {
            service: env::var(ENV_DD_SERVICE).unwrap_or_default(),
            env: env::var(ENV_DD_ENV).unwrap_or_default(),
            version: env::var(ENV_DD_VERSION).unwrap_or_default(),
        }
    }
}

/// The five `dd.*` fields, serialized under their dotted names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorrelationFields {
    #[serde(rename = "dd.service")]
    pub service: String,
    #[serde(rename = "dd.env")]
    pub env: String,
    #[serde(rename = "dd.version")]
    pub version: String,
    #[serde(rename = "dd.trace_id")]
    pub trace_id: String,
    #[serde(rename = "dd.span_id")]
    pub span_id: String,
}

impl CorrelationFields {
    pub fn new(info: &ServiceInfo, trace: Option<TraceContext>) -> Self {
        let (trace_id, span_id) = trace.map(|t| (t.trace_id, t.span_id)).unwrap_or((0, 0));
        Self {
            service: info.service.clone(),
            env: info.env.clone(),
            version: info.version.clone(),
            trace_id: trace_id.to_string(),
            span_id: span_id.to_string(),
        }
    }
}

impl Default for CorrelationFields {
    fn default() -> Self {
        Self::new(&ServiceInfo::default(), None)
    }
}

/// Opaque provider of correlation fields for the line being rendered.
pub trait CorrelationSource: Send + Sync {
    fn fields(&self) -> CorrelationFields;
}

/// Datadog-style provider: static service info plus the active trace.
#[derive(Debug, Clone, Default)]
pub struct DatadogCorrelation {
    info: ServiceInfo,
}

impl DatadogCorrelation {
    pub fn new(info: ServiceInfo) -> Self {
        Self { info }
    }

    pub fn from_env() -> Self {
        Self::new(ServiceInfo::from_env())
    }
}

impl CorrelationSource for DatadogCorrelation {
    fn fields(&self) -> CorrelationFields {
        CorrelationFields::new(&self.info, current_trace())
    }
}
