//! Todo use cases
//!
//! Every use case takes the caller's user ID, already authenticated upstream,
//! and returns either its payload or an [`AppError`] carrying the status code.
//! Existence is checked before ownership, and ownership before any write.

mod requests;

use std::sync::Arc;

use backend_storage::{
    attachment::AttachmentStore,
    todo::{TodoItem, TodoStorageError, TodoStore},
};
use chrono::{SecondsFormat, Utc};
use tracing::instrument;
use uuid::Uuid;

pub use requests::{CreateTodoRequest, UpdateTodoRequest};

use crate::types::AppError;

const ITEM_NOT_FOUND: &str = "Item not found";

/// Business logic between the HTTP handlers and the stores
pub struct TodoService {
    todo_store: Arc<dyn TodoStore>,
    attachment_store: Arc<dyn AttachmentStore>,
}

impl TodoService {
    /// Creates a service over the given stores
    #[must_use]
    pub fn new(todo_store: Arc<dyn TodoStore>, attachment_store: Arc<dyn AttachmentStore>) -> Self {
        Self {
            todo_store,
            attachment_store,
        }
    }

    /// Lists every item owned by `user_id`
    ///
    /// # Errors
    ///
    /// `500` if the store query fails
    #[instrument(skip(self))]
    pub async fn list_todos(&self, user_id: &str) -> Result<Vec<TodoItem>, AppError> {
        let todos = self
            .todo_store
            .list_by_owner(user_id)
            .await
            .map_err(|err| {
                tracing::error!(error = %err, "Failed to list todos");
                AppError::internal("Error occurred when getting user's todos")
            })?;

        tracing::info!(count = todos.len(), "Listed todos");
        Ok(todos)
    }

    /// Reads one item owned by `user_id`
    ///
    /// # Errors
    ///
    /// `404` if the item does not exist, `403` if another user owns it,
    /// `500` if the store read fails
    #[instrument(skip(self))]
    pub async fn get_todo(&self, user_id: &str, todo_id: &str) -> Result<TodoItem, AppError> {
        self.owned_item(
            user_id,
            todo_id,
            "User is not authorized to read item",
            "Error occurred when getting todo item",
        )
        .await
    }

    /// Creates a new item for `user_id`
    ///
    /// The item gets a fresh UUID, `done = false` and no attachment.
    ///
    /// # Errors
    ///
    /// `500` if the store write fails
    #[instrument(skip(self, request))]
    pub async fn create_todo(
        &self,
        user_id: &str,
        request: CreateTodoRequest,
    ) -> Result<TodoItem, AppError> {
        let item = TodoItem {
            user_id: user_id.to_string(),
            todo_id: Uuid::new_v4().to_string(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            name: request.name,
            due_date: request.due_date,
            done: false,
            attachment_url: None,
        };

        self.todo_store.insert(&item).await.map_err(|err| {
            tracing::error!(todo_id = %item.todo_id, error = %err, "Failed to create todo");
            AppError::internal("Error occurred when creating user todo item")
        })?;

        tracing::info!(todo_id = %item.todo_id, "Created todo");
        Ok(item)
    }

    /// Overwrites name, due date and done flag of an item owned by `user_id`
    ///
    /// # Errors
    ///
    /// `404` if the item does not exist, `403` if another user owns it,
    /// `500` if a store call fails
    #[instrument(skip(self, request))]
    pub async fn update_todo(
        &self,
        user_id: &str,
        todo_id: &str,
        request: UpdateTodoRequest,
    ) -> Result<(), AppError> {
        const FAILURE: &str = "Error occurred when updating todo item";

        self.owned_item(
            user_id,
            todo_id,
            "User is not authorized to update item",
            FAILURE,
        )
        .await?;

        self.todo_store
            .update_partial(todo_id, &request.into())
            .await
            .map_err(|err| write_error(&err, FAILURE))?;

        tracing::info!("Updated todo");
        Ok(())
    }

    /// Deletes an item owned by `user_id`
    ///
    /// # Errors
    ///
    /// `404` if the item does not exist, `403` if another user owns it,
    /// `500` if a store call fails
    #[instrument(skip(self))]
    pub async fn delete_todo(&self, user_id: &str, todo_id: &str) -> Result<(), AppError> {
        const FAILURE: &str = "Error occurred when deleting todo item";

        self.owned_item(
            user_id,
            todo_id,
            "User is not authorized to delete item",
            FAILURE,
        )
        .await?;

        self.todo_store
            .delete(todo_id)
            .await
            .map_err(|err| write_error(&err, FAILURE))?;

        tracing::info!("Deleted todo");
        Ok(())
    }

    /// Issues an upload URL for `attachment_id`
    ///
    /// Touches no todo item; pair with [`Self::attach_to_todo`] to record it.
    ///
    /// # Errors
    ///
    /// `500` if the URL cannot be signed
    #[instrument(skip(self))]
    pub async fn generate_attachment_upload_url(
        &self,
        attachment_id: &str,
    ) -> Result<String, AppError> {
        let upload_url = self
            .attachment_store
            .issue_upload_url(attachment_id)
            .await
            .map_err(|err| {
                tracing::error!(error = %err, "Failed to generate upload URL");
                AppError::internal("Error occurred when generating presigned Url to upload")
            })?;

        tracing::info!("Generated upload URL");
        Ok(upload_url)
    }

    /// Records the public URL of `attachment_id` on an item owned by `user_id`
    ///
    /// # Errors
    ///
    /// `404` if the item does not exist, `403` if another user owns it,
    /// `500` if a store call fails
    #[instrument(skip(self))]
    pub async fn attach_to_todo(
        &self,
        user_id: &str,
        todo_id: &str,
        attachment_id: &str,
    ) -> Result<(), AppError> {
        const FAILURE: &str = "Error occurred when updating todo attachment";

        let attachment_url = self.attachment_store.public_url(attachment_id);

        self.owned_item(
            user_id,
            todo_id,
            "User is not authorized to update item",
            FAILURE,
        )
        .await?;

        self.todo_store
            .update_attachment_url(todo_id, &attachment_url)
            .await
            .map_err(|err| write_error(&err, FAILURE))?;

        tracing::info!(%attachment_url, "Attached upload to todo");
        Ok(())
    }

    /// Fetches `todo_id` and checks it belongs to `user_id`
    async fn owned_item(
        &self,
        user_id: &str,
        todo_id: &str,
        forbidden: &'static str,
        failure: &'static str,
    ) -> Result<TodoItem, AppError> {
        let item = self.todo_store.get_by_id(todo_id).await.map_err(|err| {
            tracing::error!(error = %err, "Failed to fetch todo");
            AppError::internal(failure)
        })?;

        let Some(item) = item else {
            return Err(AppError::not_found(ITEM_NOT_FOUND));
        };

        if item.user_id != user_id {
            return Err(AppError::forbidden(forbidden));
        }

        Ok(item)
    }
}

/// Classifies a failed write issued after the existence check passed
///
/// The item can still vanish in between (concurrent delete); that is reported
/// as not found rather than as a backend failure.
fn write_error(err: &TodoStorageError, failure: &'static str) -> AppError {
    if let TodoStorageError::TodoNotFound(_) = err {
        return AppError::not_found(ITEM_NOT_FOUND);
    }
    tracing::error!(error = %err, "Todo write failed");
    AppError::internal(failure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use backend_storage::memory::{InMemoryAttachmentStore, InMemoryTodoStore, Mutation};

    const BUCKET: &str = "todo-attachments";

    struct Fixture {
        todo_store: Arc<InMemoryTodoStore>,
        attachment_store: Arc<InMemoryAttachmentStore>,
        service: TodoService,
    }

    fn fixture() -> Fixture {
        let todo_store = Arc::new(InMemoryTodoStore::new());
        let attachment_store = Arc::new(InMemoryAttachmentStore::new(BUCKET));
        let service = TodoService::new(todo_store.clone(), attachment_store.clone());
        Fixture {
            todo_store,
            attachment_store,
            service,
        }
    }

    fn create_request(name: &str) -> CreateTodoRequest {
        CreateTodoRequest {
            name: name.to_string(),
            due_date: None,
        }
    }

    fn update_request() -> UpdateTodoRequest {
        UpdateTodoRequest {
            name: "buy milk 2%".to_string(),
            due_date: Some("2024-01-01".to_string()),
            done: true,
        }
    }

    async fn seeded(fixture: &Fixture, owner: &str) -> TodoItem {
        fixture
            .service
            .create_todo(owner, create_request("buy milk"))
            .await
            .unwrap()
    }

    fn writes_to(fixture: &Fixture, todo_id: &str) -> Vec<Mutation> {
        fixture
            .todo_store
            .mutations()
            .into_iter()
            .filter(|mutation| !matches!(mutation, Mutation::Insert(id) if id == todo_id))
            .collect()
    }

    #[tokio::test]
    async fn test_create_todo_builds_fresh_item() {
        let fixture = fixture();

        let first = fixture
            .service
            .create_todo(
                "u1",
                CreateTodoRequest {
                    name: "buy milk".to_string(),
                    due_date: Some("2024-02-01".to_string()),
                },
            )
            .await
            .unwrap();
        let second = seeded(&fixture, "u1").await;

        assert_eq!(first.user_id, "u1");
        assert_eq!(first.name, "buy milk");
        assert_eq!(first.due_date.as_deref(), Some("2024-02-01"));
        assert!(!first.done);
        assert_eq!(first.attachment_url, None);
        assert!(!first.todo_id.is_empty());
        assert_ne!(first.todo_id, second.todo_id);
        assert!(chrono::DateTime::parse_from_rfc3339(&first.created_at).is_ok());
        assert_eq!(fixture.todo_store.snapshot(&first.todo_id), Some(first));
    }

    #[tokio::test]
    async fn test_created_item_round_trips_through_list() {
        let fixture = fixture();
        let created = seeded(&fixture, "u1").await;

        let listed = fixture.service.list_todos("u1").await.unwrap();

        assert_eq!(listed, vec![created]);
        assert!(fixture.service.list_todos("u2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_failures_map_to_internal_errors() {
        let fixture = fixture();
        fixture.todo_store.set_unavailable(true);

        let err = fixture.service.list_todos("u1").await.unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Error occurred when getting user's todos");

        let err = fixture
            .service
            .create_todo("u1", create_request("x"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), 500);
        assert_eq!(err.message(), "Error occurred when creating user todo item");

        let err = fixture
            .service
            .update_todo("u1", "any", update_request())
            .await
            .unwrap_err();
        assert_eq!(err.code(), 500);
        assert_eq!(err.message(), "Error occurred when updating todo item");

        let err = fixture.service.delete_todo("u1", "any").await.unwrap_err();
        assert_eq!(err.code(), 500);
        assert_eq!(err.message(), "Error occurred when deleting todo item");

        let err = fixture.service.get_todo("u1", "any").await.unwrap_err();
        assert_eq!(err.code(), 500);
        assert_eq!(err.message(), "Error occurred when getting todo item");

        let err = fixture
            .service
            .attach_to_todo("u1", "any", "att-1")
            .await
            .unwrap_err();
        assert_eq!(err.code(), 500);
        assert_eq!(err.message(), "Error occurred when updating todo attachment");
    }

    #[tokio::test]
    async fn test_attachment_write_failure_is_internal_error() {
        let fixture = fixture();
        let item = seeded(&fixture, "u1").await;
        fixture.todo_store.set_read_only(true);

        let err = fixture
            .service
            .attach_to_todo("u1", &item.todo_id, "att-1")
            .await
            .unwrap_err();

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Error occurred when updating todo attachment");
        assert_eq!(
            fixture.todo_store.snapshot(&item.todo_id).unwrap().attachment_url,
            None
        );
    }

    #[tokio::test]
    async fn test_missing_item_is_not_found_without_writes() {
        let fixture = fixture();

        let update = fixture
            .service
            .update_todo("u1", "missing", update_request())
            .await
            .unwrap_err();
        let delete = fixture
            .service
            .delete_todo("u1", "missing")
            .await
            .unwrap_err();
        let attach = fixture
            .service
            .attach_to_todo("u1", "missing", "att-1")
            .await
            .unwrap_err();
        let get = fixture.service.get_todo("u1", "missing").await.unwrap_err();

        for err in [update, delete, attach, get] {
            assert_eq!(err.status(), StatusCode::NOT_FOUND);
            assert_eq!(err.message(), "Item not found");
        }
        assert!(fixture.todo_store.mutations().is_empty());
    }

    #[tokio::test]
    async fn test_other_users_item_is_forbidden_without_writes() {
        let fixture = fixture();
        let item = seeded(&fixture, "owner").await;

        let update = fixture
            .service
            .update_todo("intruder", &item.todo_id, update_request())
            .await
            .unwrap_err();
        assert_eq!(update.status(), StatusCode::FORBIDDEN);
        assert_eq!(update.message(), "User is not authorized to update item");

        let delete = fixture
            .service
            .delete_todo("intruder", &item.todo_id)
            .await
            .unwrap_err();
        assert_eq!(delete.status(), StatusCode::FORBIDDEN);
        assert_eq!(delete.message(), "User is not authorized to delete item");

        let attach = fixture
            .service
            .attach_to_todo("intruder", &item.todo_id, "att-1")
            .await
            .unwrap_err();
        assert_eq!(attach.status(), StatusCode::FORBIDDEN);

        let get = fixture
            .service
            .get_todo("intruder", &item.todo_id)
            .await
            .unwrap_err();
        assert_eq!(get.status(), StatusCode::FORBIDDEN);

        assert!(writes_to(&fixture, &item.todo_id).is_empty());
        assert_eq!(fixture.todo_store.snapshot(&item.todo_id), Some(item));
    }

    #[tokio::test]
    async fn test_update_todo_overwrites_mutable_fields() {
        let fixture = fixture();
        let item = seeded(&fixture, "u1").await;

        fixture
            .service
            .update_todo("u1", &item.todo_id, update_request())
            .await
            .unwrap();

        let updated = fixture.service.get_todo("u1", &item.todo_id).await.unwrap();
        assert_eq!(
            updated,
            TodoItem {
                name: "buy milk 2%".to_string(),
                due_date: Some("2024-01-01".to_string()),
                done: true,
                ..item
            }
        );
    }

    #[tokio::test]
    async fn test_delete_todo_removes_item() {
        let fixture = fixture();
        let item = seeded(&fixture, "u1").await;

        fixture
            .service
            .delete_todo("u1", &item.todo_id)
            .await
            .unwrap();

        assert!(fixture.service.list_todos("u1").await.unwrap().is_empty());
        assert_eq!(
            writes_to(&fixture, &item.todo_id),
            vec![Mutation::Delete(item.todo_id.clone())]
        );

        // The store delete is unconditional, but the use case checks existence first
        let again = fixture
            .service
            .delete_todo("u1", &item.todo_id)
            .await
            .unwrap_err();
        assert_eq!(again.status(), StatusCode::NOT_FOUND);
        assert_eq!(writes_to(&fixture, &item.todo_id).len(), 1);
    }

    #[tokio::test]
    async fn test_store_delete_is_idempotent() {
        let fixture = fixture();
        let item = seeded(&fixture, "u1").await;

        fixture.todo_store.delete(&item.todo_id).await.unwrap();
        fixture.todo_store.delete(&item.todo_id).await.unwrap();

        assert!(fixture.todo_store.snapshot(&item.todo_id).is_none());
    }

    #[test]
    fn test_vanished_item_during_update_is_not_found() {
        let err = write_error(
            &TodoStorageError::TodoNotFound("gone".to_string()),
            "Error occurred when updating todo item",
        );
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = write_error(
            &TodoStorageError::Unavailable("down".to_string()),
            "Error occurred when updating todo item",
        );
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_upload_url_then_attach() {
        let fixture = fixture();
        let item = seeded(&fixture, "u1").await;

        let upload_url = fixture
            .service
            .generate_attachment_upload_url("att-42")
            .await
            .unwrap();
        assert!(upload_url.contains("att-42"));
        assert!(writes_to(&fixture, &item.todo_id).is_empty());

        fixture
            .service
            .attach_to_todo("u1", &item.todo_id, "att-42")
            .await
            .unwrap();

        let attached = fixture.todo_store.snapshot(&item.todo_id).unwrap();
        assert_eq!(
            attached.attachment_url.as_deref(),
            Some("https://todo-attachments.s3.amazonaws.com/att-42")
        );
    }

    #[tokio::test]
    async fn test_upload_url_failure_is_internal_error() {
        let fixture = fixture();
        fixture.attachment_store.set_unavailable(true);

        let err = fixture
            .service
            .generate_attachment_upload_url("att-1")
            .await
            .unwrap_err();

        assert_eq!(err.code(), 500);
        assert_eq!(
            err.message(),
            "Error occurred when generating presigned Url to upload"
        );
    }
}
