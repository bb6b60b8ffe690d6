use axum::extract::Query;
use axum::{extract::Path, Json};
use serde::Deserialize;
use serde_json::json;

use crate::domain::a004_nomenclature;

/// GET /api/nomenclature
pub async fn list_all() -> Result<
    Json<Vec<contracts::domain::a004_nomenclature::aggregate::Nomenclature>>,
    axum::http::StatusCode,
> {
    match a004_nomenclature::service::list_all().await {
        Ok(v) => Ok(Json(v)),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// GET /api/nomenclature/:id
pub async fn get_by_id(
    Path(id): Path<String>,
) -> Result<
    Json<contracts::domain::a004_nomenclature::aggregate::Nomenclature>,
    axum::http::StatusCode,
> {
    let uuid = match uuid::Uuid::parse_str(&id) {
        Ok(uuid) => uuid,
        Err(_) => return Err(axum::http::StatusCode::BAD_REQUEST),
    };
    match a004_nomenclature::service::get_by_id(uuid).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(axum::http::StatusCode::NOT_FOUND),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// POST /api/nomenclature
pub async fn upsert(
    Json(dto): Json<contracts::domain::a004_nomenclature::aggregate::NomenclatureDto>,
) -> Result<Json<serde_json::Value>, axum::http::StatusCode> {
    let result = if dto.id.is_some() {
        a004_nomenclature::service::update(dto)
            .await
            .map(|_| uuid::Uuid::nil().to_string())
    } else {
        a004_nomenclature::service::create(dto)
            .await
            .map(|id| id.to_string())
    };

    match result {
        Ok(id) => Ok(Json(json!({"id": id}))),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// DELETE /api/nomenclature/:id
pub async fn delete(Path(id): Path<String>) -> Result<(), axum::http::StatusCode> {
    let uuid = match uuid::Uuid::parse_str(&id) {
        Ok(uuid) => uuid,
        Err(_) => return Err(axum::http::StatusCode::BAD_REQUEST),
    };
    match a004_nomenclature::service::delete(uuid).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(axum::http::StatusCode::NOT_FOUND),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub article: String,
}

/// GET /api/nomenclature/search?article=...
pub async fn search_by_article(
    Query(params): Query<SearchParams>,
) -> Result<
    Json<Vec<contracts::domain::a004_nomenclature::aggregate::Nomenclature>>,
    axum::http::StatusCode,
> {
    match a004_nomenclature::service::search_by_article(&params.article).await {
        Ok(v) => Ok(Json(v)),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}
