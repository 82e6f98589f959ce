//! Error types for todo storage operations

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::{
    delete_item::DeleteItemError, get_item::GetItemError, put_item::PutItemError,
    query::QueryError, update_item::UpdateItemError,
};
use thiserror::Error;

/// Result type alias for todo storage operations
pub type TodoStorageResult<T> = Result<T, TodoStorageError>;

/// Storage error types for todo operations
#[derive(Debug, Error)]
pub enum TodoStorageError {
    /// Failed to insert todo item into `DynamoDB`
    #[error("Failed to insert todo item into DynamoDB: {0:?}")]
    DynamoDbPutError(#[from] SdkError<PutItemError>),

    /// Failed to get todo item from `DynamoDB`
    #[error("Failed to get todo item from DynamoDB: {0:?}")]
    DynamoDbGetError(#[from] SdkError<GetItemError>),

    /// Failed to query todo items from `DynamoDB`
    #[error("Failed to query todo items from DynamoDB: {0:?}")]
    DynamoDbQueryError(#[from] SdkError<QueryError>),

    /// Failed to update todo item in `DynamoDB`
    #[error("Failed to update todo item in DynamoDB: {0:?}")]
    DynamoDbUpdateError(#[from] SdkError<UpdateItemError>),

    /// Failed to delete todo item from `DynamoDB`
    #[error("Failed to delete todo item from DynamoDB: {0:?}")]
    DynamoDbDeleteError(#[from] SdkError<DeleteItemError>),

    /// An update targeted a todo item that does not exist
    #[error("Todo item not found: {0}")]
    TodoNotFound(String),

    /// Failed to parse todo item from `DynamoDB` item
    #[error("Failed to parse todo item: {0}")]
    SerializationError(String),

    /// The storage backend could not be reached
    #[error("Todo storage unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_dynamo::Error> for TodoStorageError {
    fn from(err: serde_dynamo::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
