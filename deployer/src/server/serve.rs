//! HTTP server setup

use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::Request,
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::{info, info_span, Level};

use crate::app::options::ServerOptions;
use crate::errors::DeployerError;
use crate::server::handlers::{health_handler, registry_callback_handler, version_handler};
use crate::server::middleware::{request_id_middleware, RequestId};
use crate::server::state::ServerState;

/// Build the router with its middleware stack
pub fn router(options: &ServerOptions, state: Arc<ServerState>) -> Router {
    let mut app = Router::new()
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .route("/registry/callback", post(registry_callback_handler))
        .with_state(state)
        .layer(TimeoutLayer::new(options.request_timeout));

    if options.log_requests {
        app = app.layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request| {
                    let request_id = request
                        .extensions()
                        .get::<RequestId>()
                        .map(|id| id.0.as_str())
                        .unwrap_or_default();
                    info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                })
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );
    }

    // outermost, so timeouts and trace spans see the request id
    app.layer(middleware::from_fn(request_id_middleware))
}

/// Start the HTTP server
pub async fn serve(
    options: &ServerOptions,
    state: Arc<ServerState>,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<JoinHandle<Result<(), DeployerError>>, DeployerError> {
    let app = router(options, state);

    let listener = TcpListener::bind(&options.address)
        .await
        .map_err(|e| DeployerError::ServerError(format!("{}: {}", options.address, e)))?;
    let local_addr = listener
        .local_addr()
        .map_err(|e| DeployerError::ServerError(e.to_string()))?;
    info!("Server is ready to handle requests at {}", local_addr);

    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| DeployerError::ServerError(e.to_string()))
    });

    Ok(handle)
}
