use axum::{extract::Path, Json};
use serde_json::json;

use crate::domain::a002_warehouse;

/// GET /api/warehouse
pub async fn list_all() -> Result<
    Json<Vec<contracts::domain::a002_warehouse::aggregate::Warehouse>>,
    axum::http::StatusCode,
> {
    match a002_warehouse::service::list_all().await {
        Ok(v) => Ok(Json(v)),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// GET /api/warehouse/:id
pub async fn get_by_id(
    Path(id): Path<String>,
) -> Result<Json<contracts::domain::a002_warehouse::aggregate::Warehouse>, axum::http::StatusCode>
{
    let uuid = match uuid::Uuid::parse_str(&id) {
        Ok(uuid) => uuid,
        Err(_) => return Err(axum::http::StatusCode::BAD_REQUEST),
    };
    match a002_warehouse::service::get_by_id(uuid).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(axum::http::StatusCode::NOT_FOUND),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// POST /api/warehouse
pub async fn upsert(
    Json(dto): Json<contracts::domain::a002_warehouse::aggregate::WarehouseDto>,
) -> Result<Json<serde_json::Value>, axum::http::StatusCode> {
    let result = if dto.id.is_some() {
        a002_warehouse::service::update(dto)
            .await
            .map(|_| uuid::Uuid::nil().to_string())
    } else {
        a002_warehouse::service::create(dto)
            .await
            .map(|id| id.to_string())
    };

    match result {
        Ok(id) => Ok(Json(json!({"id": id}))),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// DELETE /api/warehouse/:id
pub async fn delete(Path(id): Path<String>) -> Result<(), axum::http::StatusCode> {
    let uuid = match uuid::Uuid::parse_str(&id) {
        Ok(uuid) => uuid,
        Err(_) => return Err(axum::http::StatusCode::BAD_REQUEST),
    };
    match a002_warehouse::service::delete(uuid).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(axum::http::StatusCode::NOT_FOUND),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}
