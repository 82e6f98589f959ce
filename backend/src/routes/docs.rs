//! OpenAPI document and Scalar UI; both are hidden in production

use std::sync::Arc;

use aide::{axum::ApiRouter, openapi::OpenApi, scalar::Scalar};
use axum::{
    extract::Request,
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json,
};

use crate::types::Environment;

const OPENAPI_PATH: &str = "/openapi.json";

pub fn handler() -> ApiRouter {
    ApiRouter::new()
        .route(
            "/docs",
            Scalar::new(OPENAPI_PATH).with_title("Todo API").axum_route(),
        )
        .route(OPENAPI_PATH, get(openapi_schema))
        .route_layer(middleware::from_fn(docs_visibility))
}

#[allow(clippy::unused_async)]
async fn openapi_schema(Extension(openapi): Extension<Arc<OpenApi>>) -> Response {
    Json(openapi.as_ref()).into_response()
}

/// Answers 404 unless the environment exposes API docs
async fn docs_visibility(request: Request, next: Next) -> Response {
    let visible = request
        .extensions()
        .get::<Environment>()
        .is_some_and(Environment::show_api_docs);

    if visible {
        next.run(request).await
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}
