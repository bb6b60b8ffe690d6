use axum::{extract::Path, Json};
use serde::Deserialize;
use serde_json::json;

use crate::domain::a003_supplier;

/// GET /api/supplier
pub async fn list_all() -> Result<
    Json<Vec<contracts::domain::a003_supplier::aggregate::Supplier>>,
    axum::http::StatusCode,
> {
    match a003_supplier::service::list_all().await {
        Ok(v) => Ok(Json(v)),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// GET /api/supplier/:id
pub async fn get_by_id(
    Path(id): Path<String>,
) -> Result<Json<contracts::domain::a003_supplier::aggregate::Supplier>, axum::http::StatusCode> {
    let uuid = match uuid::Uuid::parse_str(&id) {
        Ok(uuid) => uuid,
        Err(_) => return Err(axum::http::StatusCode::BAD_REQUEST),
    };
    match a003_supplier::service::get_by_id(uuid).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(axum::http::StatusCode::NOT_FOUND),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// POST /api/supplier
pub async fn upsert(
    Json(dto): Json<contracts::domain::a003_supplier::aggregate::SupplierDto>,
) -> Result<Json<serde_json::Value>, axum::http::StatusCode> {
    let result = if dto.id.is_some() {
        a003_supplier::service::update(dto)
            .await
            .map(|_| uuid::Uuid::nil().to_string())
    } else {
        a003_supplier::service::create(dto)
            .await
            .map(|id| id.to_string())
    };

    match result {
        Ok(id) => Ok(Json(json!({"id": id}))),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// DELETE /api/supplier/:id
pub async fn delete(Path(id): Path<String>) -> Result<(), axum::http::StatusCode> {
    let uuid = match uuid::Uuid::parse_str(&id) {
        Ok(uuid) => uuid,
        Err(_) => return Err(axum::http::StatusCode::BAD_REQUEST),
    };
    match a003_supplier::service::delete(uuid).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(axum::http::StatusCode::NOT_FOUND),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}

#[derive(Debug, Deserialize)]
pub struct BlockRequest {
    pub reason: String,
}

/// POST /api/supplier/:id/block
pub async fn block(
    Path(id): Path<String>,
    Json(body): Json<BlockRequest>,
) -> axum::http::StatusCode {
    let uuid = match uuid::Uuid::parse_str(&id) {
        Ok(uuid) => uuid,
        Err(_) => return axum::http::StatusCode::BAD_REQUEST,
    };
    match a003_supplier::service::block(uuid, body.reason).await {
        Ok(_) => axum::http::StatusCode::OK,
        Err(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// POST /api/supplier/:id/unblock
pub async fn unblock(Path(id): Path<String>) -> axum::http::StatusCode {
    let uuid = match uuid::Uuid::parse_str(&id) {
        Ok(uuid) => uuid,
        Err(_) => return axum::http::StatusCode::BAD_REQUEST,
    };
    match a003_supplier::service::unblock(uuid).await {
        Ok(_) => axum::http::StatusCode::OK,
        Err(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
    }
}
