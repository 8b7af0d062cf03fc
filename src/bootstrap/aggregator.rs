//! Background completion of async hooks.
//!
//! Futures handed to the [`TaskAggregator`] start running immediately on the
//! Tokio runtime. [`TaskAggregator::drain`] waits for them in completion
//! order, logs every failure once, and flips readiness when none remain.
//! There is no timeout: a future that never settles keeps the service
//! unready.

use super::error::{BootstrapFailure, panic_message};
use super::hook::Phase;
use super::readiness::ReadinessSetter;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::panic::AssertUnwindSafe;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tracing::Instrument;

/// One in-flight async hook invocation.
pub struct PendingTask {
    component: String,
    phase: Phase,
    future: BoxFuture<'static, anyhow::Result<()>>,
}

impl PendingTask {
    pub fn new(
        component: impl Into<String>,
        phase: Phase,
        future: BoxFuture<'static, anyhow::Result<()>>,
    ) -> Self {
        Self {
            component: component.into(),
            phase,
            future,
        }
    }

    pub fn component(&self) -> &str {
        &self.component
    }
}

impl std::fmt::Debug for PendingTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingTask")
            .field("component", &self.component)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

struct Settled {
    component: String,
    phase: Phase,
    outcome: Result<(), String>,
}

/// Summary of a finished drain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationReport {
    pub launched: usize,
    pub completed: usize,
    pub failures: Vec<BootstrapFailure>,
}

#[derive(Default)]
pub struct TaskAggregator {
    tasks: JoinSet<Settled>,
    launched: usize,
}

impl TaskAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `task` on the runtime. Must be called from within a Tokio runtime.
    pub fn track(&mut self, task: PendingTask) {
        let PendingTask {
            component,
            phase,
            future,
        } = task;

        tracing::debug!(component = %component, %phase, "Background hook launched");
        self.launched += 1;
        self.tasks.spawn(async move {
            let outcome = match AssertUnwindSafe(future).catch_unwind().await {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(format!("{e:#}")),
                Err(payload) => Err(panic_message(&*payload)),
            };
            Settled {
                component,
                phase,
                outcome,
            }
        });
    }

    pub fn launched(&self) -> usize {
        self.launched
    }

    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Await every tracked task, then mark the service ready exactly once.
    pub async fn drain(mut self, setter: ReadinessSetter) -> AggregationReport {
        let mut report = AggregationReport {
            launched: self.launched,
            ..Default::default()
        };

        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(Settled {
                    component,
                    phase,
                    outcome: Ok(()),
                }) => {
                    tracing::debug!(component = %component, %phase, "Background hook completed");
                    report.completed += 1;
                }
                Ok(Settled {
                    component,
                    phase,
                    outcome: Err(message),
                }) => {
                    tracing::error!(component = %component, %phase, error = %message, "Background hook failed");
                    report.failures.push(BootstrapFailure::Aggregation {
                        component,
                        phase,
                        message,
                    });
                }
                Err(join_error) => record_join_error(&mut report, join_error),
            }
        }

        setter.mark_ready();
        tracing::info!(
            launched = report.launched,
            completed = report.completed,
            failed = report.failures.len(),
            "Background bootstrap tasks settled, service is ready"
        );
        report
    }

    /// Run [`drain`](Self::drain) as its own task inside `span`.
    pub fn spawn_drain(self, setter: ReadinessSetter, span: tracing::Span) -> BackgroundTasks {
        BackgroundTasks {
            handle: tokio::spawn(self.drain(setter).instrument(span)),
        }
    }
}

// Panics are caught inside each task, so this only sees cancellation on runtime shutdown.
fn record_join_error(report: &mut AggregationReport, join_error: JoinError) {
    tracing::error!(error = %join_error, "Background hook did not settle");
    report.failures.push(BootstrapFailure::Aggregation {
        component: "<unknown>".to_string(),
        phase: Phase::Decorate,
        message: join_error.to_string(),
    });
}

/// Handle on the running drain.
#[derive(Debug)]
pub struct BackgroundTasks {
    handle: JoinHandle<AggregationReport>,
}

impl BackgroundTasks {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub async fn join(self) -> Result<AggregationReport, JoinError> {
        self.handle.await
    }
}
