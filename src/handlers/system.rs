use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;

/// GET / - service banner
pub async fn root_get() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "data": {
            "name": "Inventory API",
            "version": version,
            "endpoints": {
                "auth": "POST /register, POST /login (public)",
                "products": "GET /products[/:id] (public), POST/PUT/DELETE (bearer)",
                "categories": "GET /categories (public), POST/DELETE (bearer)",
                "customers": "GET /customers (public), POST (bearer)",
                "health": "GET /health (public)"
            }
        }
    }))
}

/// GET /health - 200 when the store answers, 503 otherwise
pub async fn health_get(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.catalog.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            ApiError::service_unavailable("Database unavailable").into_response()
        }
    }
}
