use std::sync::Arc;

use axum::{extract::Path, http::StatusCode, Extension, Json};
use backend_storage::todo::TodoItem;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    middleware::AuthenticatedUser,
    todos::{CreateTodoRequest, TodoService, UpdateTodoRequest},
    types::{AppError, ValidatedJson},
};

/// Path parameters of single-item routes
#[derive(Debug, Deserialize, JsonSchema)]
pub struct TodoPath {
    /// ID of the todo item
    pub todo_id: String,
}

/// Response listing the caller's items
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct TodoListResponse {
    /// Items owned by the caller, in store order
    pub items: Vec<TodoItem>,
}

/// Response carrying a single item
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct TodoResponse {
    /// The item
    pub item: TodoItem,
}

/// Response carrying an attachment upload URL
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlResponse {
    /// Presigned PUT URL for the attachment
    pub upload_url: String,
}

/// List the caller's todo items
///
/// # Errors
///
/// - `401 UNAUTHORIZED` - Missing principal
/// - `500 INTERNAL_SERVER_ERROR` - Storage query fails
pub async fn list_todos(
    user: AuthenticatedUser,
    Extension(todo_service): Extension<Arc<TodoService>>,
) -> Result<Json<TodoListResponse>, AppError> {
    let items = todo_service.list_todos(&user.user_id).await?;

    Ok(Json(TodoListResponse { items }))
}

/// Create a todo item
///
/// Returns `201 CREATED` with the stored item.
///
/// # Errors
///
/// - `400 BAD_REQUEST` - Malformed body or empty name
/// - `401 UNAUTHORIZED` - Missing principal
/// - `500 INTERNAL_SERVER_ERROR` - Storage write fails
pub async fn create_todo(
    user: AuthenticatedUser,
    Extension(todo_service): Extension<Arc<TodoService>>,
    ValidatedJson(payload): ValidatedJson<CreateTodoRequest>,
) -> Result<(StatusCode, Json<TodoResponse>), AppError> {
    let item = todo_service.create_todo(&user.user_id, payload).await?;

    Ok((StatusCode::CREATED, Json(TodoResponse { item })))
}

/// Get one of the caller's todo items
///
/// # Errors
///
/// - `403 FORBIDDEN` - Item belongs to another user
/// - `404 NOT_FOUND` - No item with this ID
/// - `500 INTERNAL_SERVER_ERROR` - Storage read fails
pub async fn get_todo(
    user: AuthenticatedUser,
    Path(TodoPath { todo_id }): Path<TodoPath>,
    Extension(todo_service): Extension<Arc<TodoService>>,
) -> Result<Json<TodoResponse>, AppError> {
    let item = todo_service.get_todo(&user.user_id, &todo_id).await?;

    Ok(Json(TodoResponse { item }))
}

/// Update name, due date and done flag of a todo item
///
/// Returns `200 OK` with an empty body.
///
/// # Errors
///
/// - `400 BAD_REQUEST` - Malformed body or empty name
/// - `403 FORBIDDEN` - Item belongs to another user
/// - `404 NOT_FOUND` - No item with this ID
/// - `500 INTERNAL_SERVER_ERROR` - Storage call fails
pub async fn update_todo(
    user: AuthenticatedUser,
    Path(TodoPath { todo_id }): Path<TodoPath>,
    Extension(todo_service): Extension<Arc<TodoService>>,
    ValidatedJson(payload): ValidatedJson<UpdateTodoRequest>,
) -> Result<StatusCode, AppError> {
    todo_service
        .update_todo(&user.user_id, &todo_id, payload)
        .await?;

    Ok(StatusCode::OK)
}

/// Delete a todo item
///
/// Returns `204 NO_CONTENT`.
///
/// # Errors
///
/// - `403 FORBIDDEN` - Item belongs to another user
/// - `404 NOT_FOUND` - No item with this ID
/// - `500 INTERNAL_SERVER_ERROR` - Storage call fails
pub async fn delete_todo(
    user: AuthenticatedUser,
    Path(TodoPath { todo_id }): Path<TodoPath>,
    Extension(todo_service): Extension<Arc<TodoService>>,
) -> Result<StatusCode, AppError> {
    todo_service.delete_todo(&user.user_id, &todo_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Issue an attachment upload URL and record the attachment on the item
///
/// A fresh attachment ID is minted per call. The upload URL is generated
/// first; the item's `attachmentUrl` is then set to the attachment's public
/// URL. Uploading to the returned URL replaces nothing else on the item.
///
/// # Errors
///
/// - `403 FORBIDDEN` - Item belongs to another user
/// - `404 NOT_FOUND` - No item with this ID
/// - `500 INTERNAL_SERVER_ERROR` - Signing or storage call fails
pub async fn create_attachment_upload_url(
    user: AuthenticatedUser,
    Path(TodoPath { todo_id }): Path<TodoPath>,
    Extension(todo_service): Extension<Arc<TodoService>>,
) -> Result<Json<UploadUrlResponse>, AppError> {
    let attachment_id = Uuid::new_v4().to_string();

    let upload_url = todo_service
        .generate_attachment_upload_url(&attachment_id)
        .await?;

    todo_service
        .attach_to_todo(&user.user_id, &todo_id, &attachment_id)
        .await?;

    Ok(Json(UploadUrlResponse { upload_url }))
}
