//! Bootstrap orchestration
//!
//! Initialization components ("bootstrappers") contribute hooks to two
//! lifecycle phases. The engine discovers them, orders them by priority and
//! runs them around application construction.
//!
//! # Phases
//!
//! ```text
//! 1. Discovery (inventory scan, configured list, or static table)
//!    ↓
//! 2. Scheduling by priority (lower first, DEFAULT_PRIORITY = 1000)
//!    ↓
//! 3. Configure phase        ← hooks receive &mut AppBuilder
//!    ↓
//! 4. ApplicationFactory::build
//!    ↓
//! 5. Decorate phase         ← hooks receive &mut App
//!    ↓
//! 6. Serving starts         (business routes answer 503)
//!    ↓
//! 7. Async hooks of both phases settle in the background
//!    ↓
//! 8. Readiness flips        (/ready answers 200)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use ignite::prelude::*;
//!
//! pub struct KeySetup;
//!
//! #[bootstrapper(priority = 10)]
//! impl KeySetup {
//!     #[hook]
//!     fn configure_builder(builder: &mut AppBuilder, config: Arc<ConfigService>) -> anyhow::Result<()> {
//!         builder.container_mut().register(KeyRing::load(&config)?);
//!         Ok(())
//!     }
//!
//!     #[hook("DecorateAppAsync")]
//!     fn announce(app: &mut App) -> BoxFuture<'static, anyhow::Result<()>> {
//!         let keys = app.container().try_resolve::<KeyRing>();
//!         async move { publish(keys).await }.boxed()
//!     }
//! }
//! ```

mod aggregator;
mod application;
mod component;
mod discovery;
mod engine;
mod error;
mod executor;
mod hook;
mod readiness;
mod scheduler;
mod shutdown;

pub use aggregator::{AggregationReport, BackgroundTasks, PendingTask, TaskAggregator};
pub use application::{App, AppBuilder, ApplicationFactory, DefaultApplicationFactory};
pub use component::{
    BootstrapComponent, ComponentDescriptor, DEFAULT_PRIORITY, PhaseHooks, Registration,
};
pub use discovery::{
    Candidate, Catalog, ConfiguredDiscovery, Discovered, DiscoveryStrategy, InventoryDiscovery,
    LookupError, StaticDiscovery, discover,
};
pub use engine::{BootstrapEngine, BootstrapReport, Bootstrapped, ScheduledComponent};
pub use error::{BootstrapError, BootstrapFailure};
pub use executor::{PhaseExecutor, PhaseOutcome};
pub use hook::{Blocking, Hook, HookKind, HookSlot, IntoHook, NonBlocking, Phase, Subject};
pub use readiness::{ReadinessGate, ReadinessSetter};
pub use scheduler::schedule;
pub use shutdown::shutdown_signal;
