use std::sync::Arc;
use std::time::Duration;

use aide::openapi::{Info, OpenApi};
use axum::{
    http::{header, HeaderValue},
    Extension, Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer, set_header::SetResponseHeaderLayer, timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::routes;
use crate::{todos::TodoService, types::Environment};

/// Builds the application router with all layers applied
///
/// Every response, errors included, carries
/// `Access-Control-Allow-Origin: *` and `Access-Control-Allow-Credentials: true`.
#[must_use]
pub fn build_router(environment: Environment, todo_service: Arc<TodoService>) -> Router {
    let mut openapi = OpenApi {
        info: Info {
            title: "Todo API".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            ..Info::default()
        },
        ..OpenApi::default()
    };

    routes::handler()
        .finish_api(&mut openapi)
        .layer(Extension(Arc::new(openapi)))
        .layer(Extension(environment))
        .layer(Extension(todo_service))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(5)))
        // Answers preflight requests
        .layer(CorsLayer::permissive())
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        ))
}

/// Starts the server with the given environment and dependencies
///
/// # Errors
///
/// Returns an error if `PORT` is not a valid port or binding fails
pub async fn start(environment: Environment, todo_service: Arc<TodoService>) -> anyhow::Result<()> {
    let router = build_router(environment, todo_service);

    let addr = std::net::SocketAddr::from((
        [0, 0, 0, 0],
        std::env::var("PORT").map_or(Ok(8001), |p| p.parse())?,
    ));

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🔄 Todo Backend started on http://{addr}");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
