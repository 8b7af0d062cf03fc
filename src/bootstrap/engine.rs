use super::aggregator::{BackgroundTasks, TaskAggregator};
use super::application::{App, AppBuilder, ApplicationFactory, DefaultApplicationFactory};
use super::discovery::{
    Catalog, ConfiguredDiscovery, DiscoveryStrategy, InventoryDiscovery, discover,
};
use super::error::{BootstrapError, BootstrapFailure};
use super::executor::{PhaseExecutor, PhaseOutcome};
use super::readiness::ReadinessGate;
use super::scheduler::schedule;
use crate::config::{BootstrapSettings, DiscoveryMode};
use uuid::Uuid;

/// Orchestrates a bootstrap run.
///
/// Control flow: discover, schedule, configure phase, build, decorate phase.
/// Async hooks from both phases are drained in the background and the
/// readiness gate opens once they have all settled.
///
/// # Example
///
/// ```rust,ignore
/// let config = ConfigService::load(Some(Path::new("appsettings.json")))?;
/// let settings = BootstrapSettings::from_config(&config)?;
///
/// let Bootstrapped { app, .. } = BootstrapEngine::from_settings(&settings)
///     .run(AppBuilder::new(config))
///     .await?;
///
/// app.serve(TcpListener::bind("0.0.0.0:8080").await?).await?;
/// ```
pub struct BootstrapEngine {
    strategy: Box<dyn DiscoveryStrategy>,
    factory: Box<dyn ApplicationFactory>,
}

impl Default for BootstrapEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Scheduled position of a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledComponent {
    pub name: String,
    pub priority: i32,
}

/// Everything the synchronous part of a run produced.
#[derive(Debug, Clone)]
pub struct BootstrapReport {
    pub run_id: Uuid,
    pub scheduled: Vec<ScheduledComponent>,
    pub discovery_failures: Vec<BootstrapFailure>,
    pub configure: PhaseOutcome,
    pub decorate: PhaseOutcome,
}

impl BootstrapReport {
    /// Discovery, resolution and hook failures, in the order they happened.
    pub fn failures(&self) -> impl Iterator<Item = &BootstrapFailure> {
        self.discovery_failures
            .iter()
            .chain(&self.configure.failures)
            .chain(&self.decorate.failures)
    }

    pub fn launched(&self) -> usize {
        self.configure.launched + self.decorate.launched
    }
}

/// A successfully built application with its background work still running.
#[derive(Debug)]
pub struct Bootstrapped {
    pub app: App,
    pub report: BootstrapReport,
    pub background: BackgroundTasks,
}

impl BootstrapEngine {
    /// Inventory discovery with the default application factory.
    pub fn new() -> Self {
        Self {
            strategy: Box::new(InventoryDiscovery::new()),
            factory: Box::new(DefaultApplicationFactory),
        }
    }

    pub fn from_settings(settings: &BootstrapSettings) -> Self {
        let engine = Self::new();
        match settings.discovery {
            DiscoveryMode::Inventory => engine,
            DiscoveryMode::Configured => engine.discovery(ConfiguredDiscovery::new(
                settings.components.clone(),
                Catalog::from_inventory(),
            )),
        }
    }

    pub fn discovery(mut self, strategy: impl DiscoveryStrategy + 'static) -> Self {
        self.strategy = Box::new(strategy);
        self
    }

    pub fn factory(mut self, factory: impl ApplicationFactory + 'static) -> Self {
        self.factory = Box::new(factory);
        self
    }

    /// Run both phases and build the application.
    ///
    /// Returns as soon as the decorate phase's sync work is done; the
    /// returned [`BackgroundTasks`] resolves once readiness has flipped.
    /// Must be called from within a Tokio runtime.
    pub async fn run(self, builder: AppBuilder) -> Result<Bootstrapped, BootstrapError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("bootstrap", %run_id);
        let (readiness, setter) = ReadinessGate::channel();
        let mut aggregator = TaskAggregator::new();

        let (app, report) = span.in_scope(|| {
            self.run_phases(run_id, builder, readiness, &mut aggregator)
        })?;

        let background = aggregator.spawn_drain(setter, span);
        Ok(Bootstrapped {
            app,
            report,
            background,
        })
    }

    fn run_phases(
        self,
        run_id: Uuid,
        mut builder: AppBuilder,
        readiness: ReadinessGate,
        aggregator: &mut TaskAggregator,
    ) -> Result<(App, BootstrapReport), BootstrapError> {
        let Self { strategy, factory } = self;
        tracing::info!(strategy = strategy.name(), "Starting bootstrap");

        let discovered = discover(strategy);
        let components = schedule(discovered.components);
        let scheduled: Vec<ScheduledComponent> = components
            .iter()
            .map(|c| ScheduledComponent {
                name: c.name().to_string(),
                priority: c.priority(),
            })
            .collect();
        for (position, component) in scheduled.iter().enumerate() {
            tracing::debug!(
                position,
                component = %component.name,
                priority = component.priority,
                "Scheduled bootstrapper"
            );
        }

        let configure = PhaseExecutor::new(aggregator).run(&components, &mut builder);

        let mut app = factory.build(builder, readiness).map_err(|e| {
            tracing::error!(error = %format!("{e:#}"), "Application build failed");
            BootstrapError::Build(e)
        })?;

        let decorate = PhaseExecutor::new(aggregator).run(&components, &mut app);

        let report = BootstrapReport {
            run_id,
            scheduled,
            discovery_failures: discovered.failures,
            configure,
            decorate,
        };
        tracing::info!(
            components = report.scheduled.len(),
            failures = report.failures().count(),
            pending = aggregator.pending(),
            "Bootstrap phases complete, serving may start"
        );

        Ok((app, report))
    }
}
