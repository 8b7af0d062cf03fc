//! Phase subjects and the builder that turns one into the other.

use super::hook::{Phase, Subject};
use super::readiness::ReadinessGate;
use super::shutdown::shutdown_signal;
use crate::config::{AppInfo, BootstrapSettings, ConfigService};
use crate::di::Container;
use crate::http::{RequireReadyLayer, health_routes};
use axum::{Extension, Router};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Build-time state: the subject of the configure phase.
///
/// Configure hooks register services into the container and routes into
/// the router. The configuration is registered in the container as well,
/// so hooks can take `Arc<ConfigService>`.
#[derive(Debug)]
pub struct AppBuilder {
    container: Container,
    router: Router,
    config: ConfigService,
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new(ConfigService::new())
    }
}

impl AppBuilder {
    pub fn new(config: ConfigService) -> Self {
        Self::with_container(config, Container::new())
    }

    /// Start from a pre-seeded container, e.g. one from [`ContainerBuilder`].
    ///
    /// [`ContainerBuilder`]: crate::di::ContainerBuilder
    pub fn with_container(config: ConfigService, mut container: Container) -> Self {
        container.register(config.clone());
        Self {
            container,
            router: Router::new(),
            config,
        }
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut Container {
        &mut self.container
    }

    pub fn config(&self) -> &ConfigService {
        &self.config
    }

    /// Merge business routes into the application router.
    pub fn merge(&mut self, router: Router) -> &mut Self {
        let current = std::mem::replace(&mut self.router, Router::new());
        self.router = current.merge(router);
        self
    }

    pub fn into_parts(self) -> (Container, Router, ConfigService) {
        (self.container, self.router, self.config)
    }
}

impl Subject for AppBuilder {
    const PHASE: Phase = Phase::Configure;

    fn container(&self) -> &Container {
        &self.container
    }
}

/// The built application: the subject of the decorate phase.
///
/// The container is frozen; decorate hooks can still adjust the router.
#[derive(Debug)]
pub struct App {
    container: Arc<Container>,
    router: Router,
    config: ConfigService,
    readiness: ReadinessGate,
    info: AppInfo,
    require_ready: bool,
}

impl App {
    pub fn new(
        container: Container,
        router: Router,
        config: ConfigService,
        readiness: ReadinessGate,
    ) -> crate::Result<Self> {
        let require_ready = config
            .extract::<BootstrapSettings>(BootstrapSettings::SECTION)?
            .unwrap_or_default()
            .require_ready;

        Ok(Self {
            container: Arc::new(container),
            router,
            info: AppInfo::from_config(&config)?,
            config,
            readiness,
            require_ready,
        })
    }

    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    pub fn config(&self) -> &ConfigService {
        &self.config
    }

    pub fn readiness(&self) -> &ReadinessGate {
        &self.readiness
    }

    pub fn info(&self) -> &AppInfo {
        &self.info
    }

    pub fn merge(&mut self, router: Router) -> &mut Self {
        self.map_router(|current| current.merge(router))
    }

    /// Replace the router with `f(router)`, e.g. to add middleware.
    pub fn map_router<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(Router) -> Router,
    {
        let current = std::mem::replace(&mut self.router, Router::new());
        self.router = f(current);
        self
    }

    /// Final router: the built-in health routes plus the business routes,
    /// which get the container as an extension and, unless disabled, the
    /// readiness guard.
    pub fn into_router(self) -> Router {
        let mut business = self.router.layer(Extension(Arc::clone(&self.container)));
        if self.require_ready {
            business = business.layer(RequireReadyLayer::new(self.readiness.clone()));
        }

        health_routes(self.readiness, self.info).merge(business)
    }

    /// Serve until Ctrl+C or SIGTERM.
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(%addr, app = %self.info.name, "Listening");

        axum::serve(listener, self.into_router())
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

impl Subject for App {
    const PHASE: Phase = Phase::Decorate;

    fn container(&self) -> &Container {
        &self.container
    }
}

/// Turns configured build-time state into the application.
///
/// A failure here is the one fatal bootstrap error.
pub trait ApplicationFactory: Send + Sync {
    fn build(&self, builder: AppBuilder, readiness: ReadinessGate) -> anyhow::Result<App>;
}

/// Freezes the container and keeps the router as configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultApplicationFactory;

impl ApplicationFactory for DefaultApplicationFactory {
    fn build(&self, builder: AppBuilder, readiness: ReadinessGate) -> anyhow::Result<App> {
        let (container, router, config) = builder.into_parts();
        tracing::debug!(services = container.len(), "Freezing service container");
        Ok(App::new(container, router, config, readiness)?)
    }
}
