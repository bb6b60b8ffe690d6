use axum::{extract::Path, Json};

use crate::domain::a007_receipt_policy;
use contracts::domain::a007_receipt_policy::aggregate::{ReceiptPolicy, ReceiptPolicyDto};

/// GET /api/receipt-policy/:organization_id
pub async fn get_for_organization(
    Path(organization_id): Path<String>,
) -> Result<Json<ReceiptPolicy>, axum::http::StatusCode> {
    match a007_receipt_policy::service::get_for_organization(&organization_id).await {
        Ok(v) => Ok(Json(v)),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// PUT /api/receipt-policy/:organization_id
pub async fn save(
    Path(organization_id): Path<String>,
    Json(dto): Json<ReceiptPolicyDto>,
) -> Result<Json<ReceiptPolicy>, axum::http::StatusCode> {
    match a007_receipt_policy::service::save(&organization_id, dto).await {
        Ok(v) => Ok(Json(v)),
        Err(_) => Err(axum::http::StatusCode::BAD_REQUEST),
    }
}
