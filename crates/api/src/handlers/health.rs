use axum::Json;
use serde_json::json;

#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service is live")),
    tag = "Health"
)]
pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
