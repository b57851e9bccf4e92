use crate::domain::todo::driving_ports::{TaskError, TaskPort};
use crate::domain::user::driving_ports::{CreateUserError, UserPort};
use crate::external_connections::{ExternalConnectivity, Transactable};
use crate::routing_utils;
use crate::routing_utils::{
    GenericErrorResponse, Json, JsonErrorResponse, MessageBody, MessageResponse,
    ValidationErrorResponse,
};
use crate::{AppState, SharedData, domain, dto, persistence};
use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::ErrorResponse;
use axum::routing::get;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::OpenApi;
use validator::Validate;

/// Message sent when a username doesn't match anybody
pub const USER_NOT_FOUND: &str = "user not found";
/// Message sent when creating a user whose name is taken
pub const USER_ALREADY_EXISTS: &str = "Usuario ya existe";
/// Message sent when a new user is created with anything but an empty array
pub const EMPTY_ARRAY_REQUIRED: &str = "Debes enviar un array vacío";

#[derive(OpenApi)]
#[openapi(paths(get_usernames, get_tasks_for_user, create_user, replace_tasks_for_user))]
/// Defines the OpenAPI documentation for the user API
pub struct UsersApi;
/// Constant used to group user endpoints in OpenAPI documentation
pub const USER_API_GROUP: &str = "Users";

/// Builds a router for all the user routes. Each path also answers with a trailing slash.
pub fn user_routes() -> Router<Arc<SharedData>> {
    let users = get(|State(app_state): AppState| async move {
        let mut ext_cxn = app_state.ext_cxn.clone();
        let user_service = domain::user::UserService {};

        get_usernames(&mut ext_cxn, &user_service).await
    })
    .fallback(routing_utils::method_not_allowed);

    let single_user = get(
        |State(app_state): AppState, Path(path): Path<dto::UsernamePath>| async move {
            let mut ext_cxn = app_state.ext_cxn.clone();
            let task_service = domain::todo::TaskService {};

            get_tasks_for_user(path, &mut ext_cxn, &task_service).await
        },
    )
    .post(
        |State(app_state): AppState,
         Path(path): Path<dto::UsernamePath>,
         body: Result<Json<dto::EmptyTodoList>, JsonErrorResponse>| async move {
            let user_service = domain::user::UserService {};

            create_user(path, body.map(|Json(list)| list), &app_state.ext_cxn, &user_service).await
        },
    )
    .put(
        |State(app_state): AppState,
         Path(path): Path<dto::UsernamePath>,
         body: Result<Json<Vec<dto::NewTodo>>, JsonErrorResponse>| async move {
            let task_service = domain::todo::TaskService {};

            replace_tasks_for_user(
                path,
                body.map(|Json(todos)| todos),
                &app_state.ext_cxn,
                &task_service,
            )
            .await
        },
    )
    .fallback(routing_utils::method_not_allowed);

    Router::new()
        .route("/user", users.clone())
        .route("/user/", users)
        .route("/user/:username", single_user.clone())
        .route("/user/:username/", single_user)
}

#[utoipa::path(
    get,
    path = "/user",
    tag = USER_API_GROUP,
    responses(
        (status = 200, description = "Every username in the system", body = Vec<String>),
        (status = 500, description = "Users could not be read", body = MessageBody),
    ),
)]
/// Retrieves the names of all the users in the system.
async fn get_usernames(
    ext_cxn: &mut impl ExternalConnectivity,
    user_service: &impl UserPort,
) -> Result<Json<Vec<String>>, ErrorResponse> {
    info!("Requested usernames");
    let user_reader = persistence::db_user_driven_ports::DbReadUsers;

    let usernames = user_service
        .get_usernames(&mut *ext_cxn, &user_reader)
        .await
        .map_err(GenericErrorResponse)?;

    Ok(Json(usernames))
}

#[utoipa::path(
    get,
    path = "/user/{username}",
    tag = USER_API_GROUP,
    params(("username" = String, Path, description = "Exact username to look up")),
    responses(
        (status = 200, description = "The user's tasks", body = Vec<dto::TodoItem>),
        (status = 404, description = "No such user", body = MessageBody),
        (status = 500, description = "Tasks could not be read", body = MessageBody),
    ),
)]
/// Retrieves the tasks owned by a user
async fn get_tasks_for_user(
    path: dto::UsernamePath,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
) -> Result<Json<Vec<dto::TodoItem>>, ErrorResponse> {
    info!("Get tasks for user {path}");
    let user_reader = persistence::db_user_driven_ports::DbReadUsers;
    let task_reader = persistence::db_todo_driven_ports::DbTaskReader;

    let tasks_result = task_service
        .tasks_for_user(&path.username, &mut *ext_cxn, &user_reader, &task_reader)
        .await;
    match tasks_result {
        Ok(tasks) => Ok(Json(tasks.into_iter().map(dto::TodoItem::from).collect())),
        Err(TaskError::UserDoesNotExist) => {
            Err(MessageResponse::new(StatusCode::NOT_FOUND, USER_NOT_FOUND).into())
        }
        Err(TaskError::PortError(err)) => {
            error!("Failed to get {path}'s tasks: {err}");
            Err(GenericErrorResponse(err).into())
        }
    }
}

#[utoipa::path(
    post,
    path = "/user/{username}",
    tag = USER_API_GROUP,
    params(("username" = String, Path, description = "Name for the new user, up to 80 characters")),
    request_body(content = Vec<dto::TodoItem>, description = "Must be an empty array"),
    responses(
        (status = 201, description = "User created with a starter task", body = Vec<dto::TodoItem>),
        (status = 400, description = "User already exists or the name is invalid", body = MessageBody),
        (status = 500, description = "Body wasn't an empty array or the user couldn't be saved", body = MessageBody),
    ),
)]
/// Creates a user, who starts out with a single "sample task"
async fn create_user(
    path: dto::UsernamePath,
    body: Result<dto::EmptyTodoList, JsonErrorResponse>,
    ext_cxn: &impl Transactable,
    user_service: &impl UserPort,
) -> Result<(StatusCode, Json<Vec<dto::TodoItem>>), ErrorResponse> {
    info!("Attempt to create user: {path}");
    if let Err(body_problem) = body {
        info!("Rejected body for new user {path}: {}", body_problem.parse_problem());
        return Err(
            MessageResponse::new(StatusCode::INTERNAL_SERVER_ERROR, EMPTY_ARRAY_REQUIRED).into(),
        );
    }
    path.validate().map_err(ValidationErrorResponse::from)?;

    let user_detect = persistence::db_user_driven_ports::DbDetectUser;
    let user_writer = persistence::db_user_driven_ports::DbWriteUsers;
    let task_writer = persistence::db_todo_driven_ports::DbTaskWriter;

    let creation_result = user_service
        .create_user(&path.username, ext_cxn, &user_detect, &user_writer, &task_writer)
        .await;
    match creation_result {
        Ok(_) => Ok((StatusCode::CREATED, Json(Vec::new()))),
        Err(CreateUserError::UserAlreadyExists) => {
            Err(MessageResponse::new(StatusCode::BAD_REQUEST, USER_ALREADY_EXISTS).into())
        }
        Err(CreateUserError::PortError(err)) => {
            error!("User create failure: {err}");
            Err(GenericErrorResponse(err).into())
        }
    }
}

#[utoipa::path(
    put,
    path = "/user/{username}",
    tag = USER_API_GROUP,
    params(("username" = String, Path, description = "Exact username whose tasks get replaced")),
    request_body(content = Vec<dto::NewTodo>, description = "The complete new task list"),
    responses(
        (status = 201, description = "Tasks replaced", body = MessageBody),
        (status = 400, description = "Body was malformed or a label was too long", body = MessageBody),
        (status = 404, description = "No such user", body = MessageBody),
        (status = 500, description = "Tasks could not be saved", body = MessageBody),
    ),
)]
/// Replaces every task a user has with the submitted list
async fn replace_tasks_for_user(
    path: dto::UsernamePath,
    body: Result<Vec<dto::NewTodo>, JsonErrorResponse>,
    ext_cxn: &impl Transactable,
    task_service: &impl TaskPort,
) -> Result<(StatusCode, Json<MessageBody>), ErrorResponse> {
    info!("Replacing tasks for user {path}");
    let submitted_todos = body?;
    dto::validate_todo_list(&submitted_todos).map_err(ValidationErrorResponse::from)?;

    let new_tasks: Vec<domain::todo::NewTask> = submitted_todos
        .into_iter()
        .map(domain::todo::NewTask::from)
        .collect();
    let user_reader = persistence::db_user_driven_ports::DbReadUsers;
    let task_writer = persistence::db_todo_driven_ports::DbTaskWriter;

    let replace_result = task_service
        .replace_tasks_for_user(&path.username, &new_tasks, ext_cxn, &user_reader, &task_writer)
        .await;
    match replace_result {
        Ok(saved_count) => Ok((
            StatusCode::CREATED,
            Json(MessageBody {
                msg: format!("Se guardaron {saved_count} tareas"),
            }),
        )),
        Err(TaskError::UserDoesNotExist) => {
            Err(MessageResponse::new(StatusCode::NOT_FOUND, USER_NOT_FOUND).into())
        }
        Err(TaskError::PortError(err)) => {
            error!("Failed to replace {path}'s tasks: {err}");
            Err(GenericErrorResponse(err).into())
        }
    }
}
