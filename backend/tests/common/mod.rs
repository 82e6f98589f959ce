#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request},
    response::Response,
    Router,
};
use backend::{middleware::PRINCIPAL_ID_HEADER, server, todos::TodoService, types::Environment};
use backend_storage::memory::{InMemoryAttachmentStore, InMemoryTodoStore};
use http_body_util::BodyExt;
use tower::ServiceExt;

pub const TEST_BUCKET: &str = "todo-attachments-test";

/// Initialize tracing once for the test binary
pub fn setup_test_env() {
    dotenvy::from_path(".env.example").ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .ok();
}

/// Full router wired to in-memory stores
pub struct TestSetup {
    pub router: Router,
    pub todo_store: Arc<InMemoryTodoStore>,
    pub attachment_store: Arc<InMemoryAttachmentStore>,
}

impl TestSetup {
    pub fn new() -> Self {
        Self::with_environment(Environment::Development {
            presign_expiry_override: None,
        })
    }

    pub fn with_environment(environment: Environment) -> Self {
        setup_test_env();

        let todo_store = Arc::new(InMemoryTodoStore::new());
        let attachment_store = Arc::new(InMemoryAttachmentStore::new(TEST_BUCKET));
        let todo_service = Arc::new(TodoService::new(
            todo_store.clone(),
            attachment_store.clone(),
        ));

        Self {
            router: server::build_router(environment, todo_service),
            todo_store,
            attachment_store,
        }
    }

    pub async fn send(
        &self,
        method: Method,
        route: &str,
        principal: Option<&str>,
        payload: Option<serde_json::Value>,
    ) -> Response {
        let mut builder = Request::builder().uri(route).method(method);

        if let Some(principal) = principal {
            builder = builder.header(PRINCIPAL_ID_HEADER, principal);
        }

        let body = match payload {
            Some(payload) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(payload.to_string())
            }
            None => Body::empty(),
        };

        let request = builder.body(body).expect("Failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible")
    }

    pub async fn get(&self, route: &str, principal: Option<&str>) -> Response {
        self.send(Method::GET, route, principal, None).await
    }

    pub async fn post(
        &self,
        route: &str,
        principal: Option<&str>,
        payload: Option<serde_json::Value>,
    ) -> Response {
        self.send(Method::POST, route, principal, payload).await
    }

    pub async fn patch(
        &self,
        route: &str,
        principal: Option<&str>,
        payload: serde_json::Value,
    ) -> Response {
        self.send(Method::PATCH, route, principal, Some(payload))
            .await
    }

    pub async fn delete(&self, route: &str, principal: Option<&str>) -> Response {
        self.send(Method::DELETE, route, principal, None).await
    }

    /// Creates an item through the API and returns its ID
    pub async fn create_todo(&self, principal: &str, name: &str) -> String {
        let response = self
            .post(
                "/todos",
                Some(principal),
                Some(serde_json::json!({ "name": name, "dueDate": "2030-01-01" })),
            )
            .await;
        assert_eq!(response.status(), 201);

        let body = parse_response_body(response).await;
        body["item"]["todoId"]
            .as_str()
            .expect("todoId missing from create response")
            .to_string()
    }
}

pub async fn parse_response_body(response: Response) -> serde_json::Value {
    let body = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    serde_json::from_slice(&body).expect("Body is not JSON")
}
