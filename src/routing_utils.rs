use axum::extract::rejection::JsonRejection;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum_macros::FromRequest;
use serde::Serialize;
use tracing::{error, info};
use utoipa::ToSchema;
use validator::ValidationErrors;

/// The body of every response the API sends that isn't a data payload
#[derive(Serialize, Debug, ToSchema)]
#[cfg_attr(test, derive(serde::Deserialize, PartialEq, Eq))]
pub struct MessageBody {
    #[schema(example = "user not found")]
    pub msg: String,
}

/// A status code paired with a message. Handlers use this for every outcome that
/// doesn't carry data.
#[derive(Debug)]
pub struct MessageResponse {
    status: StatusCode,
    msg: String,
}

impl MessageResponse {
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        MessageResponse {
            status,
            msg: msg.into(),
        }
    }
}

impl IntoResponse for MessageResponse {
    fn into_response(self) -> Response {
        (self.status, Json(MessageBody { msg: self.msg })).into_response()
    }
}

/// Response type that wraps unexpected failures and reports them as a 500
pub struct GenericErrorResponse(pub anyhow::Error);

impl IntoResponse for GenericErrorResponse {
    fn into_response(self) -> Response {
        error!("Request failed: {:#}", self.0);
        MessageResponse::new(StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()).into_response()
    }
}

/// Response type that wraps validation errors and reports them as a 400
pub struct ValidationErrorResponse(ValidationErrors);

impl IntoResponse for ValidationErrorResponse {
    fn into_response(self) -> Response {
        info!("Rejected invalid input: {}", self.0);
        MessageResponse::new(StatusCode::BAD_REQUEST, self.0.to_string()).into_response()
    }
}

impl From<ValidationErrors> for ValidationErrorResponse {
    fn from(value: ValidationErrors) -> Self {
        Self(value)
    }
}

/// Wrapper for [axum::Json] which customizes the error response to use our
/// data structure for API errors
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(JsonErrorResponse))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Response type representing JSON parse errors
#[derive(Debug)]
pub struct JsonErrorResponse {
    parse_problem: String,
}

impl JsonErrorResponse {
    pub fn parse_problem(&self) -> &str {
        &self.parse_problem
    }

    #[cfg(test)]
    pub fn new(parse_problem: impl Into<String>) -> Self {
        JsonErrorResponse {
            parse_problem: parse_problem.into(),
        }
    }
}

impl From<JsonRejection> for JsonErrorResponse {
    fn from(value: JsonRejection) -> Self {
        JsonErrorResponse {
            parse_problem: value.body_text(),
        }
    }
}

impl IntoResponse for JsonErrorResponse {
    fn into_response(self) -> Response {
        MessageResponse::new(StatusCode::BAD_REQUEST, self.parse_problem).into_response()
    }
}

/// Error for failures outside of a specific handler's logic, such as a request for a
/// route that doesn't exist. Rendered with its status code in the body.
#[derive(Serialize, Debug, ToSchema)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ApiError {
    pub msg: String,
    pub status_code: u16,
}

impl ApiError {
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        ApiError {
            msg: msg.into(),
            status_code: status.as_u16(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, axum::Json(self)).into_response()
    }
}

/// Fallback for requests that don't match any route
pub async fn route_not_found(method: Method, uri: Uri) -> ApiError {
    info!("No route for {method} {uri}");
    ApiError::new(StatusCode::NOT_FOUND, format!("No route for {method} {}", uri.path()))
}

/// Fallback for requests to a known path with a method it doesn't serve
pub async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
    info!("Method {method} not allowed for {uri}");
    ApiError::new(
        StatusCode::METHOD_NOT_ALLOWED,
        format!("Method {method} not allowed for {}", uri.path()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_util::deserialize_body;
    use anyhow::anyhow;
    use validator::Validate;

    #[tokio::test]
    async fn message_response_carries_status_and_msg() {
        let response = MessageResponse::new(StatusCode::NOT_FOUND, "user not found").into_response();
        assert_eq!(StatusCode::NOT_FOUND, response.status());

        let body: MessageBody = deserialize_body(response.into_body()).await;
        assert_eq!("user not found", body.msg);
    }

    #[tokio::test]
    async fn generic_errors_are_500s() {
        let response = GenericErrorResponse(anyhow!("Saving the new user")).into_response();
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());

        let body: MessageBody = deserialize_body(response.into_body()).await;
        assert_eq!("Saving the new user", body.msg);
    }

    #[derive(Validate)]
    struct ShortThing {
        #[validate(length(max = 3))]
        name: String,
    }

    #[tokio::test]
    async fn validation_errors_are_400s() {
        let errors = ShortThing {
            name: "too long".to_owned(),
        }
        .validate()
        .expect_err("validation should fail");
        let response = ValidationErrorResponse::from(errors).into_response();
        assert_eq!(StatusCode::BAD_REQUEST, response.status());

        let body: MessageBody = deserialize_body(response.into_body()).await;
        assert!(body.msg.contains("name"), "unexpected message: {}", body.msg);
    }

    #[tokio::test]
    async fn unknown_routes_report_status_in_body() {
        let response = route_not_found(Method::GET, Uri::from_static("/nowhere"))
            .await
            .into_response();
        assert_eq!(StatusCode::NOT_FOUND, response.status());

        let body: ApiError = deserialize_body(response.into_body()).await;
        assert_eq!(404, body.status_code);
        assert_eq!("No route for GET /nowhere", body.msg);
    }

    #[tokio::test]
    async fn unsupported_methods_report_405_in_body() {
        let response = method_not_allowed(Method::DELETE, Uri::from_static("/user/evan"))
            .await
            .into_response();
        assert_eq!(StatusCode::METHOD_NOT_ALLOWED, response.status());

        let body: ApiError = deserialize_body(response.into_body()).await;
        assert_eq!(405, body.status_code);
        assert_eq!("Method DELETE not allowed for /user/evan", body.msg);
    }
}
