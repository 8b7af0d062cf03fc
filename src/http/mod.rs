//! HTTP surface owned by the framework rather than the application.

pub mod guard;
pub mod health;

pub use guard::{RequireReady, RequireReadyLayer};
pub use health::{InfoResponse, ServerInfo, health_routes};

pub(crate) const NOT_READY_MESSAGE: &str = "Server is not ready to handle requests.";
