//! Todo storage module for `DynamoDB` operations

mod error;

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_dynamodb::{error::SdkError, types::AttributeValue, Client as DynamoDbClient};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_dynamo::{from_item, from_items, to_item};
use strum::Display;

pub use error::{TodoStorageError, TodoStorageResult};

/// `DynamoDB` table for todo items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    /// Owner of the item (GSI partition key)
    pub user_id: String,
    /// Primary key - unique todo ID (UUID v4)
    pub todo_id: String,
    /// ISO-8601 creation timestamp
    pub created_at: String,
    /// Title of the item
    pub name: String,
    /// Optional due date
    pub due_date: Option<String>,
    /// Completion flag
    pub done: bool,
    /// Public URL of the uploaded attachment
    pub attachment_url: Option<String>,
}

/// Mutable fields of a todo item, written together by [`TodoStore::update_partial`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoUpdate {
    /// New title
    pub name: String,
    /// New due date; `None` removes the stored one
    pub due_date: Option<String>,
    /// New completion flag
    pub done: bool,
}

/// `DynamoDB` attribute names for the todo table
#[derive(Debug, Clone, Display)]
#[strum(serialize_all = "camelCase")]
pub enum TodoAttribute {
    /// Owner ID (used for GSI)
    UserId,
    /// Primary key
    TodoId,
    /// Creation timestamp
    CreatedAt,
    /// Title
    Name,
    /// Due date
    DueDate,
    /// Completion flag
    Done,
    /// Attachment URL
    AttachmentUrl,
}

/// Key-value store contract for todo items
///
/// All operations are single round trips; none of them retries.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Returns every item owned by `user_id`, in backend order
    ///
    /// # Errors
    ///
    /// Returns `TodoStorageError` if the backend query fails
    async fn list_by_owner(&self, user_id: &str) -> TodoStorageResult<Vec<TodoItem>>;

    /// Point lookup by primary key; `Ok(None)` when the ID does not exist
    ///
    /// # Errors
    ///
    /// Returns `TodoStorageError` if the backend read fails
    async fn get_by_id(&self, todo_id: &str) -> TodoStorageResult<Option<TodoItem>>;

    /// Unconditional upsert of a whole item
    ///
    /// # Errors
    ///
    /// Returns `TodoStorageError` if the backend write fails
    async fn insert(&self, item: &TodoItem) -> TodoStorageResult<()>;

    /// Overwrites name, due date and done flag of an existing item
    ///
    /// # Errors
    ///
    /// Returns `TodoStorageError::TodoNotFound` if the item does not exist,
    /// or another `TodoStorageError` if the backend write fails
    async fn update_partial(&self, todo_id: &str, update: &TodoUpdate) -> TodoStorageResult<()>;

    /// Unconditional delete; deleting a missing ID succeeds
    ///
    /// # Errors
    ///
    /// Returns `TodoStorageError` if the backend delete fails
    async fn delete(&self, todo_id: &str) -> TodoStorageResult<()>;

    /// Overwrites only the attachment URL of an existing item
    ///
    /// # Errors
    ///
    /// Returns `TodoStorageError::TodoNotFound` if the item does not exist,
    /// or another `TodoStorageError` if the backend write fails
    async fn update_attachment_url(
        &self,
        todo_id: &str,
        attachment_url: &str,
    ) -> TodoStorageResult<()>;
}

/// Storage client for todo operations
pub struct TodoStorage {
    dynamodb_client: Arc<DynamoDbClient>,
    table_name: String,
    user_index_name: String,
}

impl TodoStorage {
    /// Creates a new storage instance
    ///
    /// # Arguments
    ///
    /// * `dynamodb_client` - Pre-configured `DynamoDB` client
    /// * `table_name` - `DynamoDB` table name for todo items
    /// * `user_index_name` - Name of the GSI for owner queries
    #[must_use]
    pub const fn new(
        dynamodb_client: Arc<DynamoDbClient>,
        table_name: String,
        user_index_name: String,
    ) -> Self {
        Self {
            dynamodb_client,
            table_name,
            user_index_name,
        }
    }

    fn todo_key(todo_id: &str) -> (String, AttributeValue) {
        (
            TodoAttribute::TodoId.to_string(),
            AttributeValue::S(todo_id.to_string()),
        )
    }
}

#[async_trait]
impl TodoStore for TodoStorage {
    async fn list_by_owner(&self, user_id: &str) -> TodoStorageResult<Vec<TodoItem>> {
        let mut todos = Vec::new();
        let mut exclusive_start_key = None;

        loop {
            let response = self
                .dynamodb_client
                .query()
                .table_name(&self.table_name)
                .index_name(&self.user_index_name)
                .key_condition_expression("#user_id = :user_id")
                .expression_attribute_names("#user_id", TodoAttribute::UserId.to_string())
                .expression_attribute_values(":user_id", AttributeValue::S(user_id.to_string()))
                .set_exclusive_start_key(exclusive_start_key)
                .send()
                .await?;

            let items = response.items.unwrap_or_default();
            todos.extend(from_items::<_, TodoItem>(items)?);

            match response.last_evaluated_key {
                Some(key) if !key.is_empty() => exclusive_start_key = Some(key),
                _ => break,
            }
        }

        tracing::debug!(user_id, count = todos.len(), "Fetched todos for user");

        Ok(todos)
    }

    async fn get_by_id(&self, todo_id: &str) -> TodoStorageResult<Option<TodoItem>> {
        let (key, value) = Self::todo_key(todo_id);
        let response = self
            .dynamodb_client
            .get_item()
            .table_name(&self.table_name)
            .key(key, value)
            .send()
            .await?;

        response
            .item
            .map(|item| from_item(item).map_err(TodoStorageError::from))
            .transpose()
    }

    async fn insert(&self, item: &TodoItem) -> TodoStorageResult<()> {
        let attributes = to_item(item)?;

        self.dynamodb_client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(attributes))
            .send()
            .await?;

        tracing::debug!(todo_id = %item.todo_id, "Todo item written");

        Ok(())
    }

    async fn update_partial(&self, todo_id: &str, update: &TodoUpdate) -> TodoStorageResult<()> {
        let (key, value) = Self::todo_key(todo_id);
        let request = self
            .dynamodb_client
            .update_item()
            .table_name(&self.table_name)
            .key(key, value)
            .condition_expression("attribute_exists(#todo_id)")
            .expression_attribute_names("#todo_id", TodoAttribute::TodoId.to_string())
            .expression_attribute_names("#name", TodoAttribute::Name.to_string())
            .expression_attribute_names("#due_date", TodoAttribute::DueDate.to_string())
            .expression_attribute_names("#done", TodoAttribute::Done.to_string())
            .expression_attribute_values(":name", AttributeValue::S(update.name.clone()))
            .expression_attribute_values(":done", AttributeValue::Bool(update.done));

        let request = match &update.due_date {
            Some(due_date) => request
                .update_expression("SET #name = :name, #due_date = :due_date, #done = :done")
                .expression_attribute_values(":due_date", AttributeValue::S(due_date.clone())),
            None => request.update_expression("SET #name = :name, #done = :done REMOVE #due_date"),
        };

        request.send().await.map_err(|err| {
            if matches!(
                err,
                SdkError::ServiceError(ref svc) if svc.err().is_conditional_check_failed_exception()
            ) {
                TodoStorageError::TodoNotFound(todo_id.to_string())
            } else {
                err.into()
            }
        })?;

        Ok(())
    }

    async fn delete(&self, todo_id: &str) -> TodoStorageResult<()> {
        let (key, value) = Self::todo_key(todo_id);
        self.dynamodb_client
            .delete_item()
            .table_name(&self.table_name)
            .key(key, value)
            .send()
            .await?;

        Ok(())
    }

    async fn update_attachment_url(
        &self,
        todo_id: &str,
        attachment_url: &str,
    ) -> TodoStorageResult<()> {
        let (key, value) = Self::todo_key(todo_id);
        self.dynamodb_client
            .update_item()
            .table_name(&self.table_name)
            .key(key, value)
            .condition_expression("attribute_exists(#todo_id)")
            .update_expression("SET #attachment_url = :attachment_url")
            .expression_attribute_names("#todo_id", TodoAttribute::TodoId.to_string())
            .expression_attribute_names(
                "#attachment_url",
                TodoAttribute::AttachmentUrl.to_string(),
            )
            .expression_attribute_values(
                ":attachment_url",
                AttributeValue::S(attachment_url.to_string()),
            )
            .send()
            .await
            .map_err(|err| {
                if matches!(
                    err,
                    SdkError::ServiceError(ref svc) if svc.err().is_conditional_check_failed_exception()
                ) {
                    TodoStorageError::TodoNotFound(todo_id.to_string())
                } else {
                    err.into()
                }
            })?;

        Ok(())
    }
}
