pub mod health;
pub mod tasks;

use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

/// Fallback for unmatched routes.
pub async fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "error": "Endpoint not found",
        })),
    )
}
