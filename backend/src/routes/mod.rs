mod docs;
pub mod health;
pub mod todos;

use aide::axum::{
    routing::{get, post},
    ApiRouter,
};
use axum::middleware;

use crate::middleware::principal_middleware;

/// Creates the router with all handler routes
pub fn handler() -> ApiRouter {
    let public_routes = ApiRouter::new()
        .merge(docs::handler())
        .api_route("/health", get(health::handler));

    let protected_routes = ApiRouter::new()
        .api_route("/todos", get(todos::list_todos).post(todos::create_todo))
        .api_route(
            "/todos/{todo_id}",
            get(todos::get_todo)
                .patch(todos::update_todo)
                .delete(todos::delete_todo),
        )
        .api_route(
            "/todos/{todo_id}/attachment",
            post(todos::create_attachment_upload_url),
        )
        .route_layer(middleware::from_fn(principal_middleware));

    public_routes.merge(protected_routes)
}
