//! Bootstrap failure taxonomy.
//!
//! Every variant of [`BootstrapFailure`] is non-fatal: the component in
//! question is dropped or skipped and the run carries on. Only a failing
//! application factory aborts a run, as [`BootstrapError::Build`].

use super::hook::Phase;
use crate::di::Unresolved;
use std::any::Any;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BootstrapFailure {
    /// The component was dropped before scheduling.
    #[error("bootstrapper '{component}' dropped during discovery: {reason}")]
    Discovery { component: String, reason: String },

    /// A required hook argument was not registered.
    #[error("bootstrapper '{component}' skipped in {phase} phase: {source}")]
    Resolution {
        component: String,
        phase: Phase,
        #[source]
        source: Unresolved,
    },

    /// A hook returned an error or panicked while it was being invoked.
    #[error("{phase} hook of '{component}' failed: {message}")]
    HookExecution {
        component: String,
        phase: Phase,
        message: String,
    },

    /// A background future returned an error or panicked.
    #[error("background {phase} task of '{component}' failed: {message}")]
    Aggregation {
        component: String,
        phase: Phase,
        message: String,
    },
}

impl BootstrapFailure {
    pub fn component(&self) -> &str {
        match self {
            Self::Discovery { component, .. }
            | Self::Resolution { component, .. }
            | Self::HookExecution { component, .. }
            | Self::Aggregation { component, .. } => component,
        }
    }

    pub fn phase(&self) -> Option<Phase> {
        match self {
            Self::Discovery { .. } => None,
            Self::Resolution { phase, .. }
            | Self::HookExecution { phase, .. }
            | Self::Aggregation { phase, .. } => Some(*phase),
        }
    }
}

/// Fatal bootstrap errors.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("application build failed: {0:#}")]
    Build(#[source] anyhow::Error),
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        format!("panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {message}")
    } else {
        "panicked".to_string()
    }
}
