use axum::{response::IntoResponse, Json};

#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
    (status = 200, description = "The server is up and answering requests.")
    )
)]
pub async fn health_checker_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "message": "lyceum is up and running",
    }))
}
