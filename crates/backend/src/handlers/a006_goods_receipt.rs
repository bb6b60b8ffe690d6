use axum::extract::Query;
use axum::http::StatusCode;
use axum::{extract::Path, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::a006_goods_receipt::create::CreateReceiptError;
use crate::domain::a006_goods_receipt::service;
use crate::domain::a006_goods_receipt::service::ReceiptListRow;
use contracts::domain::a006_goods_receipt::aggregate::GoodsReceipt;
use contracts::domain::a006_goods_receipt::create::{CreateReceiptRequest, CreatedReceipt};

/// POST /api/goods-receipt
///
/// Тело ошибки типизировано: отказ гейта несёт стабильный код,
/// нарушение политики — список правил, исчерпание повторов — отдельный
/// вид ошибки. Текст не предназначен для разбора клиентом.
pub async fn create(
    Json(request): Json<CreateReceiptRequest>,
) -> Result<Json<CreatedReceipt>, (StatusCode, Json<Value>)> {
    match service::create(request).await {
        Ok(created) => Ok(Json(created)),
        Err(err) => Err(error_response(err)),
    }
}

fn error_response(err: CreateReceiptError) -> (StatusCode, Json<Value>) {
    match err {
        CreateReceiptError::Validation(message) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "validation", "message": message})),
        ),
        CreateReceiptError::GateRejected { code, reason } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "gate_rejected",
                "code": code.as_str(),
                "reason": reason,
            })),
        ),
        CreateReceiptError::PolicyViolation {
            violations,
            warnings,
        } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "policy_violation",
                "violations": violations,
                "warnings": warnings,
            })),
        ),
        CreateReceiptError::NumberSpaceExhausted { prefix } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "number_space_exhausted", "series": prefix})),
        ),
        CreateReceiptError::RetryExhausted { attempts } => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"error": "retry_exhausted", "attempts": attempts})),
        ),
        CreateReceiptError::Storage(e) => {
            tracing::error!("goods receipt creation failed: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "storage"})),
            )
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub organization_id: Option<String>,
}

/// GET /api/goods-receipt?organization_id=...
pub async fn list_all(
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<ReceiptListRow>>, StatusCode> {
    match service::list(params.organization_id.as_deref()).await {
        Ok(v) => Ok(Json(v)),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// GET /api/goods-receipt/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<GoodsReceipt>, StatusCode> {
    let uuid = match uuid::Uuid::parse_str(&id) {
        Ok(uuid) => uuid,
        Err(_) => return Err(StatusCode::BAD_REQUEST),
    };
    match service::get_by_id(uuid).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// POST /api/goods-receipt/:id/post
pub async fn post_document(Path(id): Path<String>) -> StatusCode {
    let uuid = match uuid::Uuid::parse_str(&id) {
        Ok(uuid) => uuid,
        Err(_) => return StatusCode::BAD_REQUEST,
    };
    match service::post_document(uuid).await {
        Ok(true) => StatusCode::OK,
        Ok(false) => StatusCode::NOT_FOUND,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// POST /api/goods-receipt/:id/unpost
pub async fn unpost_document(Path(id): Path<String>) -> StatusCode {
    let uuid = match uuid::Uuid::parse_str(&id) {
        Ok(uuid) => uuid,
        Err(_) => return StatusCode::BAD_REQUEST,
    };
    match service::unpost_document(uuid).await {
        Ok(true) => StatusCode::OK,
        Ok(false) => StatusCode::NOT_FOUND,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// GET /api/goods-receipt/:id/audit
pub async fn audit_trail(
    Path(id): Path<String>,
) -> Result<Json<Vec<contracts::shared::audit::AuditEntry>>, StatusCode> {
    let uuid = match uuid::Uuid::parse_str(&id) {
        Ok(uuid) => uuid,
        Err(_) => return Err(StatusCode::BAD_REQUEST),
    };
    match service::audit_trail(uuid).await {
        Ok(v) => Ok(Json(v)),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}
