use anyhow::Result;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::{EntityTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::db::get_connection;

/// Модель для хранения сырых входящих счетов из внешней ERP.
///
/// Записи этого хранилища служат источником вторичного пути создания
/// приходных накладных (trigger = invoice_sync). После успешного
/// создания документа запись подтверждается best-effort: сбой
/// подтверждения не откатывает созданный документ.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoice_raw_storage")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub source_system: String,
    pub invoice_no: String,
    pub supplier_key: String,
    pub raw_json: String,
    pub fetched_at: String,
    pub processed: bool,
    pub processed_at: Option<String>,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

/// Сохранить сырой входящий счёт
/// Возвращает уникальный ref (id записи) для использования в source_invoice_ref
pub async fn save_raw_invoice(
    source_system: &str,
    invoice_no: &str,
    supplier_key: &str,
    raw_json: &str,
    fetched_at: chrono::DateTime<Utc>,
) -> Result<String> {
    let id = Uuid::new_v4().to_string();

    let active = ActiveModel {
        id: Set(id.clone()),
        source_system: Set(source_system.to_string()),
        invoice_no: Set(invoice_no.to_string()),
        supplier_key: Set(supplier_key.to_string()),
        raw_json: Set(raw_json.to_string()),
        fetched_at: Set(fetched_at.to_rfc3339()),
        processed: Set(false),
        processed_at: Set(None),
        created_at: Set(Utc::now().to_rfc3339()),
    };

    active.insert(conn()).await?;

    tracing::debug!(
        "Saved raw invoice: source={}, invoice_no={}, id={}",
        source_system,
        invoice_no,
        id
    );

    Ok(id)
}

/// Получить запись по ref
pub async fn get_by_ref(ref_id: &str) -> Result<Option<Model>> {
    let result = Entity::find_by_id(ref_id.to_string()).one(conn()).await?;
    Ok(result)
}

/// Подтвердить обработку входящего счёта (цель best-effort подтверждения
/// после фиксации документа). Возвращает false, если запись не найдена.
pub async fn mark_processed(ref_id: &str) -> Result<bool> {
    let existing = Entity::find_by_id(ref_id.to_string()).one(conn()).await?;
    let Some(model) = existing else {
        return Ok(false);
    };

    let mut active: ActiveModel = model.into();
    active.processed = Set(true);
    active.processed_at = Set(Some(Utc::now().to_rfc3339()));
    active.update(conn()).await?;
    Ok(true)
}
