use axum::Router;
use axum::extract::State;
use std::sync::Arc;

pub mod api;
pub mod app_env;
pub mod db;
pub mod domain;
pub mod dto;
pub mod external_connections;
pub mod logging;
pub mod persistence;
pub mod routing_utils;

/// Data every request handler has access to
pub struct SharedData {
    pub ext_cxn: persistence::ExternalConnectivity,
}

pub type AppState = State<Arc<SharedData>>;

/// Assembles every route the service exposes, plus request tracing and the fallbacks for
/// unknown paths and unsupported methods
pub fn build_app(shared_data: SharedData) -> Router {
    let router = Router::new()
        .merge(api::user::user_routes())
        .merge(api::sitemap::sitemap_routes())
        .merge(api::swagger_main::build_documentation())
        .fallback(routing_utils::route_not_found)
        .with_state(Arc::new(shared_data));

    logging::attach_tracing_http(router)
}
