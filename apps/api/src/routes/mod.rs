pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::optimizer::handlers;
use crate::state::AppState;
use crate::web::handlers as web;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // HTML form
        .route("/", get(web::handle_index))
        .route("/optimize", post(web::handle_optimize_form))
        // JSON API
        .route("/api/v1/optimize", post(handlers::handle_optimize))
        .route("/api/v1/models", post(handlers::handle_list_models))
        .route("/api/v1/render/txt", post(handlers::handle_render_txt))
        .route("/api/v1/render/pdf", post(handlers::handle_render_pdf))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
