//! # Ignite
//!
//! Priority-ordered, two-phase application bootstrapping for axum services.
//!
//! Initialization code lives in small components ("bootstrappers") instead of
//! one long `main`. Each component contributes hooks to two phases:
//!
//! - **configure**: runs before the application is built and receives
//!   `&mut AppBuilder` (service container, router, configuration);
//! - **decorate**: runs after the build and receives `&mut App`.
//!
//! Hooks may be blocking or return a future. Futures are awaited in the
//! background while the server already answers `/health`; `/ready` (and the
//! business routes) switch to 200 once every one of them has settled.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ignite::prelude::*;
//! use std::path::Path;
//!
//! pub struct Greetings;
//!
//! #[bootstrapper(priority = 100)]
//! impl Greetings {
//!     #[hook]
//!     fn configure_builder(builder: &mut AppBuilder) -> anyhow::Result<()> {
//!         builder.merge(Router::new().route("/hello", get(|| async { "hello" })));
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigService::load(Some(Path::new("appsettings.json")))?;
//!     let settings = BootstrapSettings::from_config(&config)?;
//!
//!     let Bootstrapped { app, .. } = BootstrapEngine::from_settings(&settings)
//!         .run(AppBuilder::new(config))
//!         .await?;
//!
//!     app.serve(tokio::net::TcpListener::bind("0.0.0.0:8080").await?).await?;
//!     Ok(())
//! }
//! ```

pub mod bootstrap;
pub mod common;
pub mod config;
pub mod di;
pub mod error;
pub mod http;

// Re-export core types
pub use bootstrap::{
    App, AppBuilder, BootstrapEngine, BootstrapError, BootstrapFailure, Bootstrapped,
    ComponentDescriptor, DEFAULT_PRIORITY, ReadinessGate,
};
pub use common::ApiResponse;
pub use config::{BootstrapSettings, ConfigService};
pub use di::{Container, ContainerBuilder, Inject};
pub use error::{IgniteError, Result};

// Re-export macros
pub use ignite_macro::bootstrapper;

// Used by `#[bootstrapper]` expansions
#[doc(hidden)]
pub use inventory;

pub use axum;

/// Prelude module for convenient imports
///
/// ```
/// use ignite::prelude::*;
/// ```
pub mod prelude {
    pub use crate::bootstrap::{
        App, AppBuilder, ApplicationFactory, BootstrapEngine, BootstrapError, BootstrapFailure,
        Bootstrapped, ComponentDescriptor, DEFAULT_PRIORITY, Phase, ReadinessGate,
        StaticDiscovery, shutdown_signal,
    };
    pub use crate::bootstrapper;
    pub use crate::common::ApiResponse;
    pub use crate::config::{AppInfo, BootstrapSettings, ConfigService, DiscoveryMode};
    pub use crate::di::{Container, ContainerBuilder, Inject};
    pub use crate::error::{IgniteError, Result};
    pub use axum::{
        Json, Router,
        extract::{Path, Query, State},
        http::StatusCode,
        response::{IntoResponse, Response},
        routing::{delete, get, post, put},
    };
    pub use futures::FutureExt;
    pub use futures::future::BoxFuture;
    pub use std::sync::Arc;
}
