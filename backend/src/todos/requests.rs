use backend_storage::todo::TodoUpdate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Payload for creating a todo item
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    /// Title of the item
    #[validate(length(min = 1, message = "Todo name must not be empty"))]
    pub name: String,

    /// Optional due date
    #[serde(default)]
    pub due_date: Option<String>,
}

/// Payload for updating a todo item
///
/// All three fields are written; an omitted `dueDate` clears the stored one.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoRequest {
    /// New title
    #[validate(length(min = 1, message = "Todo name must not be empty"))]
    pub name: String,

    /// New due date
    #[serde(default)]
    pub due_date: Option<String>,

    /// New completion flag
    pub done: bool,
}

impl From<UpdateTodoRequest> for TodoUpdate {
    fn from(request: UpdateTodoRequest) -> Self {
        Self {
            name: request.name,
            due_date: request.due_date,
            done: request.done,
        }
    }
}
