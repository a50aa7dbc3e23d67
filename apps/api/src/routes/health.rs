use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "candidates-api"
    }))
}

/// GET /
/// Describes the service and its endpoints.
pub async fn index_handler(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    Ok(Json(json!({
        "message": "Resume Management API",
        "version": env!("CARGO_PKG_VERSION"),
        "storage": "In-Memory (No Database)",
        "candidates": state.store.len()?,
        "endpoints": {
            "POST /api/candidates": "Upload new candidate with resume",
            "GET /api/candidates": "List candidates with filters",
            "GET /api/candidates/{id}": "Get candidate by ID",
            "PUT /api/candidates/{id}": "Update candidate",
            "DELETE /api/candidates/{id}": "Delete candidate",
            "GET /uploads/{file}": "Download an uploaded resume",
            "GET /health": "Health check"
        }
    })))
}
