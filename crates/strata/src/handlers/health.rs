//! Health check endpoints for Kubernetes-style liveness and readiness checks.
//!
//! The engine pool boots with the first full render, so an idle engine is
//! healthy: the next request will start it. With SSR disabled the engine is
//! never needed.
//!
//! - `/livez` - Basic liveness check (immediate 200)
//! - `/healthz` - Engine state and pool stats (passive)
//! - `/readyz` - Engine state plus an active check render once booted

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use strata_ssr::{HealthStatus, SsrPoolStats};

use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    /// SSR is disabled; every request gets the client shell.
    Disabled,
    /// Not booted yet.
    Idle,
    Ready,
    Unhealthy,
}

#[derive(Debug, Serialize)]
pub struct EngineReport {
    pub engine: EngineState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<SsrPoolStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check: Option<HealthStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EngineReport {
    fn new(engine: EngineState) -> Self {
        Self {
            engine,
            stats: None,
            check: None,
            error: None,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self.engine {
            EngineState::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::OK,
        }
    }
}

impl IntoResponse for EngineReport {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

/// Report for a state without a booted pool.
fn unbooted(state: &AppState) -> EngineReport {
    if state.no_ssr {
        EngineReport::new(EngineState::Disabled)
    } else {
        EngineReport::new(EngineState::Idle)
    }
}

/// GET /livez - Basic liveness check.
#[axum::debug_handler]
pub async fn livez() -> StatusCode {
    StatusCode::OK
}

/// GET /healthz - Engine state and pool stats (no render).
#[axum::debug_handler]
pub async fn healthz(State(state): State<AppState>) -> EngineReport {
    let Some(pool) = state.ssr_pool() else {
        return unbooted(&state);
    };

    EngineReport {
        stats: Some(pool.stats()),
        ..EngineReport::new(EngineState::Ready)
    }
}

/// GET /readyz - Active engine health check once the pool is booted.
#[axum::debug_handler]
pub async fn readyz(State(state): State<AppState>) -> EngineReport {
    let Some(pool) = state.ssr_pool() else {
        return unbooted(&state);
    };

    match pool.health_check().await {
        Ok(check) => {
            let engine = if check.healthy {
                EngineState::Ready
            } else {
                EngineState::Unhealthy
            };
            EngineReport {
                check: Some(check),
                ..EngineReport::new(engine)
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Engine health check failed");
            EngineReport {
                stats: Some(pool.stats()),
                error: Some(strata_ssr::sanitize_error(&e)),
                ..EngineReport::new(EngineState::Unhealthy)
            }
        }
    }
}
