use super::aggregator::{PendingTask, TaskAggregator};
use super::component::BootstrapComponent;
use super::error::{BootstrapFailure, panic_message};
use super::hook::{Callable, Phase, Subject};
use std::panic::{AssertUnwindSafe, catch_unwind};

/// What happened while one phase ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseOutcome {
    pub phase: Phase,
    /// Components whose hook was invoked, in invocation order.
    pub invoked: Vec<String>,
    /// Async hooks handed to the aggregator.
    pub launched: usize,
    pub failures: Vec<BootstrapFailure>,
}

impl PhaseOutcome {
    fn new(phase: Phase) -> Self {
        Self {
            phase,
            invoked: Vec::new(),
            launched: 0,
            failures: Vec::new(),
        }
    }
}

/// Invokes the hooks of one phase in scheduled order.
///
/// Sync hooks run to completion on the calling task; errors and panics are
/// caught and recorded. Async hooks are invoked for their future, which goes
/// to the aggregator without being awaited.
pub struct PhaseExecutor<'a> {
    aggregator: &'a mut TaskAggregator,
}

impl<'a> PhaseExecutor<'a> {
    pub fn new(aggregator: &'a mut TaskAggregator) -> Self {
        Self { aggregator }
    }

    pub fn run<S: Subject>(&mut self, components: &[BootstrapComponent], subject: &mut S) -> PhaseOutcome {
        let phase = S::PHASE;
        let mut outcome = PhaseOutcome::new(phase);
        tracing::info!(%phase, components = components.len(), "Running bootstrap phase");

        for component in components {
            let Some(hook) = component.hooks(phase).effective() else {
                continue;
            };
            let name = component.name();

            let Some(callable) = hook.callable::<S>() else {
                let failure = BootstrapFailure::HookExecution {
                    component: name.to_string(),
                    phase,
                    message: format!("hook takes `{}`, not the {phase} subject", hook.subject()),
                };
                tracing::error!(component = %name, %phase, error = %failure, "Hook skipped");
                outcome.failures.push(failure);
                continue;
            };

            tracing::debug!(
                component = %name,
                %phase,
                priority = component.priority(),
                kind = %hook.kind(),
                "Invoking hook"
            );

            let invoked = match callable {
                Callable::Sync(body) => catch_unwind(AssertUnwindSafe(|| body(subject)))
                    .map(|resolved| resolved.map(Invocation::Finished)),
                Callable::Async(body) => catch_unwind(AssertUnwindSafe(|| body(subject)))
                    .map(|resolved| resolved.map(Invocation::Started)),
            };

            let failure = match invoked {
                Ok(Ok(Invocation::Finished(Ok(())))) => {
                    outcome.invoked.push(name.to_string());
                    continue;
                }
                Ok(Ok(Invocation::Started(future))) => {
                    outcome.invoked.push(name.to_string());
                    outcome.launched += 1;
                    self.aggregator.track(PendingTask::new(name, phase, future));
                    continue;
                }
                Ok(Ok(Invocation::Finished(Err(e)))) => {
                    outcome.invoked.push(name.to_string());
                    BootstrapFailure::HookExecution {
                        component: name.to_string(),
                        phase,
                        message: format!("{e:#}"),
                    }
                }
                Ok(Err(unresolved)) => {
                    tracing::warn!(
                        component = %name,
                        %phase,
                        dependency = unresolved.type_name,
                        "Unresolved hook parameter, skipping component"
                    );
                    outcome.failures.push(BootstrapFailure::Resolution {
                        component: name.to_string(),
                        phase,
                        source: unresolved,
                    });
                    continue;
                }
                Err(payload) => {
                    outcome.invoked.push(name.to_string());
                    BootstrapFailure::HookExecution {
                        component: name.to_string(),
                        phase,
                        message: panic_message(&*payload),
                    }
                }
            };

            tracing::error!(component = %name, %phase, error = %failure, "Hook failed");
            outcome.failures.push(failure);
        }

        tracing::info!(
            %phase,
            invoked = outcome.invoked.len(),
            launched = outcome.launched,
            failed = outcome.failures.len(),
            "Bootstrap phase finished"
        );
        debug_assert!(outcome.launched <= outcome.invoked.len());
        outcome
    }
}

enum Invocation {
    Finished(anyhow::Result<()>),
    Started(futures::future::BoxFuture<'static, anyhow::Result<()>>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::{AppBuilder, ComponentDescriptor, StaticDiscovery, discover, schedule};
    use futures::future::BoxFuture;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Journal(Mutex<Vec<&'static str>>);

    impl Journal {
        fn push(&self, entry: &'static str) {
            self.0.lock().unwrap().push(entry);
        }

        fn entries(&self) -> Vec<&'static str> {
            self.0.lock().unwrap().clone()
        }
    }

    fn components(strategy: StaticDiscovery) -> Vec<BootstrapComponent> {
        schedule(discover(Box::new(strategy)).components)
    }

    fn builder_with_journal() -> (AppBuilder, Arc<Journal>) {
        let journal = Arc::new(Journal::default());
        let mut builder = AppBuilder::default();
        builder.container_mut().register_arc(Arc::clone(&journal));
        (builder, journal)
    }

    #[tokio::test]
    async fn sync_hooks_run_in_priority_order() {
        let scheduled = components(
            StaticDiscovery::new()
                .register_with_priority(
                    ComponentDescriptor::new("Y").method("ConfigureBuilder", |_: &mut AppBuilder, j: Arc<Journal>| -> anyhow::Result<()> {
                        j.push("Y");
                        Ok(())
                    }),
                    20,
                )
                .register_with_priority(
                    ComponentDescriptor::new("X").method("ConfiguresBuilder", |_: &mut AppBuilder, j: Arc<Journal>| -> anyhow::Result<()> {
                        j.push("X");
                        Ok(())
                    }),
                    10,
                ),
        );

        let (mut builder, journal) = builder_with_journal();
        let mut aggregator = TaskAggregator::new();
        let outcome = PhaseExecutor::new(&mut aggregator).run(&scheduled, &mut builder);

        assert_eq!(journal.entries(), vec!["X", "Y"]);
        assert_eq!(outcome.invoked, vec!["X", "Y"]);
        assert!(outcome.failures.is_empty());
        assert_eq!(aggregator.launched(), 0);
    }

    #[tokio::test]
    async fn async_hook_replaces_sync_hook() {
        let scheduled = components(StaticDiscovery::new().register(
            ComponentDescriptor::new("Both")
                .method("ConfigureBuilder", |_: &mut AppBuilder, j: Arc<Journal>| -> anyhow::Result<()> {
                    j.push("sync");
                    Ok(())
                })
                .method(
                    "ConfigureBuilderAsync",
                    |_: &mut AppBuilder, j: Arc<Journal>| -> BoxFuture<'static, anyhow::Result<()>> {
                        j.push("async");
                        Box::pin(async { Ok(()) })
                    },
                ),
        ));

        let (mut builder, journal) = builder_with_journal();
        let mut aggregator = TaskAggregator::new();
        let outcome = PhaseExecutor::new(&mut aggregator).run(&scheduled, &mut builder);

        assert_eq!(journal.entries(), vec!["async"]);
        assert_eq!(outcome.launched, 1);
        assert_eq!(aggregator.launched(), 1);
    }

    #[tokio::test]
    async fn errors_and_panics_are_contained() {
        let scheduled = components(
            StaticDiscovery::new()
                .register_with_priority(
                    ComponentDescriptor::new("Fails").method("ConfigureBuilder", |_: &mut AppBuilder| -> anyhow::Result<()> {
                        Err(anyhow::anyhow!("bad key file"))
                    }),
                    1,
                )
                .register_with_priority(
                    ComponentDescriptor::new("Panics").method("ConfigureBuilder", |_: &mut AppBuilder| -> anyhow::Result<()> {
                        panic!("unexpected state")
                    }),
                    2,
                )
                .register_with_priority(
                    ComponentDescriptor::new("Runs").method("ConfigureBuilder", |_: &mut AppBuilder, j: Arc<Journal>| -> anyhow::Result<()> {
                        j.push("Runs");
                        Ok(())
                    }),
                    3,
                ),
        );

        let (mut builder, journal) = builder_with_journal();
        let mut aggregator = TaskAggregator::new();
        let outcome = PhaseExecutor::new(&mut aggregator).run(&scheduled, &mut builder);

        assert_eq!(journal.entries(), vec!["Runs"]);
        assert_eq!(outcome.failures.len(), 2);
        assert!(outcome.failures.iter().all(|f| matches!(f, BootstrapFailure::HookExecution { .. })));
        assert!(outcome.failures[1].to_string().contains("unexpected state"));
    }

    #[tokio::test]
    async fn unresolved_parameter_skips_component() {
        struct Missing;

        let scheduled = components(StaticDiscovery::new().register(
            ComponentDescriptor::new("NeedsMissing").method(
                "ConfigureBuilder",
                |_: &mut AppBuilder, j: Arc<Journal>, _m: Arc<Missing>| -> anyhow::Result<()> {
                    j.push("ran");
                    Ok(())
                },
            ),
        ));

        let (mut builder, journal) = builder_with_journal();
        let mut aggregator = TaskAggregator::new();
        let outcome = PhaseExecutor::new(&mut aggregator).run(&scheduled, &mut builder);

        assert!(journal.entries().is_empty());
        assert!(outcome.invoked.is_empty());
        assert!(matches!(
            &outcome.failures[0],
            BootstrapFailure::Resolution { component, .. } if component == "NeedsMissing"
        ));
    }
}
