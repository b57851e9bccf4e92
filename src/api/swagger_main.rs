use crate::dto;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(info(
    title = "User Todo API",
    description = "Users and their to-do lists, replaced wholesale"
))]
struct TodoApi;

/// Assembles the full OpenAPI document. Merges in OpenAPI definitions from other locations
/// in the app, such as the [dto] package and submodules of [api][crate::api]
pub fn openapi_doc() -> utoipa::openapi::OpenApi {
    let mut api_docs = TodoApi::openapi();
    api_docs.merge(dto::OpenApiSchemas::openapi());
    api_docs.merge(super::user::UsersApi::openapi());

    api_docs
}

/// Constructs the route on the API that renders the swagger UI and returns the OpenAPI schema.
pub fn build_documentation() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi_doc())
}
