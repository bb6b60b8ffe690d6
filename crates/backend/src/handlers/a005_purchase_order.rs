use axum::extract::Query;
use axum::{extract::Path, Json};
use serde::Deserialize;
use serde_json::json;

use crate::domain::a005_purchase_order;
use crate::domain::a005_purchase_order::service::PurchaseOrderDto;
use contracts::domain::a005_purchase_order::aggregate::{OrderState, PurchaseOrder};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub organization_id: Option<String>,
}

/// GET /api/purchase-order?organization_id=...
pub async fn list_all(
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<PurchaseOrder>>, axum::http::StatusCode> {
    match a005_purchase_order::service::list_all(params.organization_id.as_deref()).await {
        Ok(v) => Ok(Json(v)),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// GET /api/purchase-order/:id
pub async fn get_by_id(
    Path(id): Path<String>,
) -> Result<Json<PurchaseOrder>, axum::http::StatusCode> {
    let uuid = match uuid::Uuid::parse_str(&id) {
        Ok(uuid) => uuid,
        Err(_) => return Err(axum::http::StatusCode::BAD_REQUEST),
    };
    match a005_purchase_order::service::get_by_id(uuid).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(axum::http::StatusCode::NOT_FOUND),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// POST /api/purchase-order
pub async fn upsert(
    Json(dto): Json<PurchaseOrderDto>,
) -> Result<Json<serde_json::Value>, axum::http::StatusCode> {
    let result = if dto.id.is_some() {
        a005_purchase_order::service::update(dto)
            .await
            .map(|_| uuid::Uuid::nil().to_string())
    } else {
        a005_purchase_order::service::create(dto)
            .await
            .map(|id| id.to_string())
    };

    match result {
        Ok(id) => Ok(Json(json!({"id": id}))),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}

#[derive(Debug, Deserialize)]
pub struct SetStateRequest {
    pub state: OrderState,
}

/// POST /api/purchase-order/:id/state
pub async fn set_state(
    Path(id): Path<String>,
    Json(body): Json<SetStateRequest>,
) -> axum::http::StatusCode {
    let uuid = match uuid::Uuid::parse_str(&id) {
        Ok(uuid) => uuid,
        Err(_) => return axum::http::StatusCode::BAD_REQUEST,
    };
    match a005_purchase_order::service::set_state(uuid, body.state).await {
        Ok(true) => axum::http::StatusCode::OK,
        Ok(false) => axum::http::StatusCode::NOT_FOUND,
        Err(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// DELETE /api/purchase-order/:id
pub async fn delete(Path(id): Path<String>) -> Result<(), axum::http::StatusCode> {
    let uuid = match uuid::Uuid::parse_str(&id) {
        Ok(uuid) => uuid,
        Err(_) => return Err(axum::http::StatusCode::BAD_REQUEST),
    };
    match a005_purchase_order::service::delete(uuid).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(axum::http::StatusCode::NOT_FOUND),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}
