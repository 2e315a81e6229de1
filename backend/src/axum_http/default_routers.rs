use application::errors::codes;
use axum::{Json, http::StatusCode, response::IntoResponse};

use super::error_responses::ErrorResponse;

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            code: codes::INVALID_ARGUMENT,
            message: "Not found".to_string(),
        }),
    )
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
