//! HTTP request handlers

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Extension, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use registry_api::{Notifications, VersionResponse};
use tracing::{error, info, warn};

use crate::errors::RedeployError;
use crate::models::context::RequestContext;
use crate::server::middleware::RequestId;
use crate::server::state::ServerState;
use crate::utils::version_info;

/// Health check handler: 204 while serving, 503 otherwise
pub async fn health_handler(State(state): State<Arc<ServerState>>) -> StatusCode {
    if state.health.is_healthy() {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Version handler
pub async fn version_handler() -> impl IntoResponse {
    let version = version_info();
    Json(VersionResponse {
        version: version.version,
        git_hash: version.git_hash,
        build_time: version.build_time,
    })
}

/// Registry notification endpoint
pub async fn registry_callback_handler(
    State(state): State<Arc<ServerState>>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let notifications: Notifications = match serde_json::from_slice(&body) {
        Ok(notifications) => notifications,
        Err(e) => {
            warn!(request_id = %request_id, "Unable to decode registry notification: {}", e);
            return (StatusCode::BAD_REQUEST, "bad request");
        }
    };

    let ctx = RequestContext::new(request_id);
    match state.dispatcher.dispatch(&ctx, &notifications.events).await {
        Ok(redeployed) => {
            if redeployed > 0 {
                info!(request_id = %ctx.request_id, "Triggered redeploy of {} jobs", redeployed);
            }
            (StatusCode::OK, "ok")
        }
        Err(err) => {
            match &err.source {
                RedeployError::VersionNotSupported { .. } => error!(
                    request_id = %ctx.request_id,
                    repository = %err.repository,
                    tag = %err.tag,
                    job_name = %err.job,
                    "Unable to trigger job redeployment due to definition lacks version support: {}", err
                ),
                _ => error!(
                    request_id = %ctx.request_id,
                    repository = %err.repository,
                    tag = %err.tag,
                    job_name = %err.job,
                    "Unable to read/write job definition in nomad: {}", err
                ),
            }
            (StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
        }
    }
}
