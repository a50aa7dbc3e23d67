pub mod health;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower_http::services::ServeDir;

use crate::candidates::handlers;
use crate::state::AppState;

/// Headroom above the resume size limit for the other multipart fields.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + FORM_OVERHEAD_BYTES;
    let uploads = ServeDir::new(&state.config.upload_dir);

    Router::new()
        .route("/", get(health::index_handler))
        .route("/health", get(health::health_handler))
        // Candidates API
        .route(
            "/api/candidates",
            get(handlers::handle_list_candidates).post(handlers::handle_create_candidate),
        )
        .route(
            "/api/candidates/",
            get(handlers::handle_list_candidates).post(handlers::handle_create_candidate),
        )
        .route(
            "/api/candidates/:id",
            get(handlers::handle_get_candidate)
                .put(handlers::handle_update_candidate)
                .delete(handlers::handle_delete_candidate),
        )
        // Uploaded resumes
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
