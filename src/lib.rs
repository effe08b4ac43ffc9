use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod models;
pub mod policy;
pub mod storage;

use config::UploadConfig;

/// Builds the HTTP routes around an already resolved upload config
pub fn app(config: UploadConfig) -> Router {
    let body_limit = config.body_limit();
    let app_state = Arc::new(config);

    Router::new()
        .route("/files/upload", post(handlers::upload))
        .route("/files/config", get(handlers::get_config))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", handlers::ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
