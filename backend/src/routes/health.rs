use aide::axum::IntoApiResponse;
use axum::Json;
use schemars::JsonSchema;
use serde::Serialize;

/// Liveness payload
#[derive(Debug, Serialize, JsonSchema)]
pub struct HealthResponse {
    status: &'static str,
    /// Crate version
    semver: &'static str,
    /// Commit hash baked in at build time, if any
    rev: Option<&'static str>,
}

/// Health check endpoint
///
/// Needs no caller identity and touches no store.
#[allow(clippy::unused_async)]
pub async fn handler() -> impl IntoApiResponse {
    Json(HealthResponse {
        status: "ok",
        semver: env!("CARGO_PKG_VERSION"),
        rev: option_env!("GIT_REV"),
    })
}
