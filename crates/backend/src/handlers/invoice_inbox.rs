use axum::{extract::Path, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::shared::data::raw_storage;

/// DTO входящего счёта из внешней ERP
#[derive(Debug, Deserialize)]
pub struct InboundInvoiceDto {
    pub source_system: String,
    pub invoice_no: String,
    pub supplier_key: String,
    pub raw_json: String,
}

/// POST /api/invoice-inbox
///
/// Регистрирует сырой входящий счёт; возвращённый ref передаётся в
/// source_invoice_ref запроса на создание приёмки (путь invoice_sync).
pub async fn register(
    Json(dto): Json<InboundInvoiceDto>,
) -> Result<Json<serde_json::Value>, axum::http::StatusCode> {
    match raw_storage::save_raw_invoice(
        &dto.source_system,
        &dto.invoice_no,
        &dto.supplier_key,
        &dto.raw_json,
        Utc::now(),
    )
    .await
    {
        Ok(ref_id) => Ok(Json(json!({"ref": ref_id}))),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// GET /api/invoice-inbox/:ref
pub async fn get_by_ref(
    Path(ref_id): Path<String>,
) -> Result<Json<raw_storage::Model>, axum::http::StatusCode> {
    match raw_storage::get_by_ref(&ref_id).await {
        Ok(Some(model)) => Ok(Json(model)),
        Ok(None) => Err(axum::http::StatusCode::NOT_FOUND),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}
