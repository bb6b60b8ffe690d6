use chrono::Utc;
use contracts::domain::a003_supplier::aggregate::{Supplier, SupplierId};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Set};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a003_supplier")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub inn: String,
    pub kpp: String,
    pub is_blocked: bool,
    pub block_reason: Option<String>,
    pub is_deleted: bool,
    pub is_posted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Supplier {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            is_posted: m.is_posted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());

        Supplier {
            base: BaseAggregate::with_metadata(
                SupplierId::new(uuid),
                m.code,
                m.description,
                m.comment,
                metadata,
            ),
            inn: m.inn,
            kpp: m.kpp,
            is_blocked: m.is_blocked,
            block_reason: m.block_reason,
        }
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

fn to_active_model(aggregate: &Supplier) -> ActiveModel {
    ActiveModel {
        id: Set(aggregate.base.id.value().to_string()),
        code: Set(aggregate.base.code.clone()),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        inn: Set(aggregate.inn.clone()),
        kpp: Set(aggregate.kpp.clone()),
        is_blocked: Set(aggregate.is_blocked),
        block_reason: Set(aggregate.block_reason.clone()),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        is_posted: Set(aggregate.base.metadata.is_posted),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    }
}

pub async fn list_all() -> anyhow::Result<Vec<Supplier>> {
    let mut items: Vec<Supplier> = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    items.sort_by(|a, b| {
        a.base
            .description
            .to_lowercase()
            .cmp(&b.base.description.to_lowercase())
    });
    Ok(items)
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Supplier>> {
    let result = Entity::find_by_id(id.to_string()).one(conn()).await?;
    Ok(result.map(Into::into))
}

/// Найти поставщика по строковому ключу (для проверки допуска)
pub async fn find_by_key(supplier_key: &str) -> anyhow::Result<Option<Supplier>> {
    let result = Entity::find_by_id(supplier_key.to_string())
        .filter(Column::IsDeleted.eq(false))
        .one(conn())
        .await?;
    Ok(result.map(Into::into))
}

pub async fn insert(aggregate: &Supplier) -> anyhow::Result<Uuid> {
    let uuid = aggregate.base.id.value();
    to_active_model(aggregate).insert(conn()).await?;
    Ok(uuid)
}

pub async fn update(aggregate: &Supplier) -> anyhow::Result<()> {
    let mut active = to_active_model(aggregate);
    active.created_at = sea_orm::ActiveValue::NotSet;
    active.version = Set(aggregate.base.metadata.version + 1);
    Entity::update(active).exec(conn()).await?;
    Ok(())
}

/// Мягкое удаление. Возвращает false, если запись не найдена.
pub async fn soft_delete(id: Uuid) -> anyhow::Result<bool> {
    let existing = Entity::find_by_id(id.to_string()).one(conn()).await?;
    let Some(model) = existing else {
        return Ok(false);
    };

    let mut active: ActiveModel = model.into();
    active.is_deleted = Set(true);
    active.updated_at = Set(Some(Utc::now()));
    active.update(conn()).await?;
    Ok(true)
}
