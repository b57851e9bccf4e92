use crate::SharedData;
use crate::routing_utils::Json;
use axum::Router;
use axum::routing::get;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Lists the paths the API serves
#[derive(Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct RouteIndex {
    pub endpoints: Vec<String>,
}

/// Builds the index of documented routes, served from the API root
pub fn sitemap_routes() -> Router<Arc<SharedData>> {
    Router::new().route(
        "/",
        get(|| async { route_index() }).fallback(crate::routing_utils::method_not_allowed),
    )
}

fn route_index() -> Json<RouteIndex> {
    info!("Requested route index");
    let doc = super::swagger_main::openapi_doc();

    Json(RouteIndex {
        endpoints: doc.paths.paths.into_keys().collect(),
    })
}
