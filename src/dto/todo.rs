use crate::domain;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

/// DTO for a task returned on the API. Internal IDs stay private.
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug, PartialEq, Eq))]
pub struct TodoItem {
    #[schema(example = "sample task")]
    pub label: String,
    #[schema(example = false)]
    pub done: bool,
}

impl From<domain::todo::TodoTask> for TodoItem {
    fn from(value: domain::todo::TodoTask) -> Self {
        TodoItem {
            label: value.label,
            done: value.done,
        }
    }
}

/// DTO for one entry of a replacement task list
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct NewTodo {
    #[validate(length(max = 255))]
    #[schema(example = "Walk the dog")]
    pub label: String,
    #[schema(example = true)]
    pub done: bool,
}

impl From<NewTodo> for domain::todo::NewTask {
    fn from(value: NewTodo) -> Self {
        domain::todo::NewTask {
            label: value.label,
            done: value.done,
        }
    }
}

/// Validates every entry of a submitted task list, stopping at the first bad one
pub fn validate_todo_list(todos: &[NewTodo]) -> Result<(), ValidationErrors> {
    todos.iter().try_for_each(|todo| todo.validate())
}

/// The body a new user must be created with: a JSON array with nothing in it
#[derive(Debug, Deserialize)]
#[serde(try_from = "Vec<serde_json::Value>")]
pub struct EmptyTodoList;

impl TryFrom<Vec<serde_json::Value>> for EmptyTodoList {
    type Error = String;

    fn try_from(value: Vec<serde_json::Value>) -> Result<Self, Self::Error> {
        if value.is_empty() {
            Ok(EmptyTodoList)
        } else {
            Err(format!("expected an empty array, got {} element(s)", value.len()))
        }
    }
}
