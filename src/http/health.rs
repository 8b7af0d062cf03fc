//! Built-in liveness, readiness and info endpoints.
//!
//! These routes are never guarded: `/ready` is how orchestrators find out
//! when background bootstrap work has finished.

use super::NOT_READY_MESSAGE;
use crate::bootstrap::ReadinessGate;
use crate::common::ApiResponse;
use crate::config::AppInfo;
use axum::{Router, extract::State, http::StatusCode, routing::get};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::sync::Arc;

#[derive(Clone)]
struct HealthState {
    readiness: ReadinessGate,
    info: Arc<AppInfo>,
}

#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub env: String,
    pub time: DateTime<Local>,
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub ready: bool,
    pub app: AppInfo,
    pub server: ServerInfo,
}

pub fn health_routes(readiness: ReadinessGate, info: AppInfo) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready))
        .route("/info", get(info_handler))
        .with_state(HealthState {
            readiness,
            info: Arc::new(info),
        })
}

async fn health() -> ApiResponse<()> {
    ApiResponse::ok()
}

async fn ready(State(state): State<HealthState>) -> ApiResponse<bool> {
    if state.readiness.is_ready() {
        ApiResponse::success(true)
    } else {
        ApiResponse::error(StatusCode::SERVICE_UNAVAILABLE, NOT_READY_MESSAGE)
    }
}

async fn info_handler(State(state): State<HealthState>) -> ApiResponse<InfoResponse> {
    ApiResponse::success(InfoResponse {
        ready: state.readiness.is_ready(),
        app: state.info.as_ref().clone(),
        server: ServerInfo {
            env: state.info.environment.clone(),
            time: Local::now(),
        },
    })
}
