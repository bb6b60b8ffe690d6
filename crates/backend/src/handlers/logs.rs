use axum::Json;
use contracts::shared::logger::{CreateLogRequest, LogEntry};

use crate::shared::logger::repository;

/// GET /api/logs
pub async fn list_all() -> Result<Json<Vec<LogEntry>>, axum::http::StatusCode> {
    match repository::get_all_logs().await {
        Ok(v) => Ok(Json(v)),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// POST /api/logs
pub async fn create(Json(req): Json<CreateLogRequest>) -> axum::http::StatusCode {
    match repository::log_event(&req.source, &req.category, &req.message).await {
        Ok(_) => axum::http::StatusCode::OK,
        Err(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// DELETE /api/logs
pub async fn clear_all() -> axum::http::StatusCode {
    match repository::clear_all_logs().await {
        Ok(_) => axum::http::StatusCode::OK,
        Err(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
    }
}
