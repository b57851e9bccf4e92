use crate::routing_utils::{ApiError, MessageBody};
use utoipa::OpenApi;

pub mod todo;
pub mod user;

pub use todo::*;
pub use user::*;

/// Captures OpenAPI schemas and canned responses defined in the DTO module
#[derive(OpenApi)]
#[openapi(components(schemas(TodoItem, NewTodo, MessageBody, ApiError)))]
pub struct OpenApiSchemas;
