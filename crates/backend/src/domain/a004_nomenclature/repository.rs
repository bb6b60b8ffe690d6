use chrono::Utc;
use contracts::domain::a004_nomenclature::aggregate::{Nomenclature, NomenclatureId};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Set};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a004_nomenclature")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub article: String,
    pub unit: String,
    pub is_folder: bool,
    pub parent_id: Option<String>,
    pub default_internal_code: String,
    pub default_supplier_code: String,
    pub is_deleted: bool,
    pub is_posted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Nomenclature {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            is_posted: m.is_posted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());

        Nomenclature {
            base: BaseAggregate::with_metadata(
                NomenclatureId::new(uuid),
                m.code,
                m.description,
                m.comment,
                metadata,
            ),
            article: m.article,
            unit: m.unit,
            is_folder: m.is_folder,
            parent_id: m.parent_id,
            default_internal_code: m.default_internal_code,
            default_supplier_code: m.default_supplier_code,
        }
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

fn to_active_model(aggregate: &Nomenclature) -> ActiveModel {
    ActiveModel {
        id: Set(aggregate.base.id.value().to_string()),
        code: Set(aggregate.base.code.clone()),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        article: Set(aggregate.article.clone()),
        unit: Set(aggregate.unit.clone()),
        is_folder: Set(aggregate.is_folder),
        parent_id: Set(aggregate.parent_id.clone()),
        default_internal_code: Set(aggregate.default_internal_code.clone()),
        default_supplier_code: Set(aggregate.default_supplier_code.clone()),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        is_posted: Set(aggregate.base.metadata.is_posted),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    }
}

pub async fn list_all() -> anyhow::Result<Vec<Nomenclature>> {
    let mut items: Vec<Nomenclature> = Entity::find()
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

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Nomenclature>> {
    let result = Entity::find_by_id(id.to_string()).one(conn()).await?;
    Ok(result.map(Into::into))
}

/// Найти позицию каталога по строковому ключу (для дозаполнения кодов
/// строк документов). Папки справочника не участвуют.
pub async fn find_by_key(nomenclature_key: &str) -> anyhow::Result<Option<Nomenclature>> {
    let result = Entity::find_by_id(nomenclature_key.to_string())
        .filter(Column::IsDeleted.eq(false))
        .filter(Column::IsFolder.eq(false))
        .one(conn())
        .await?;
    Ok(result.map(Into::into))
}

/// Поиск по артикулу без учёта регистра
pub async fn find_by_article_ignore_case(article: &str) -> anyhow::Result<Vec<Nomenclature>> {
    let items: Vec<Nomenclature> = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .all(conn())
        .await?
        .into_iter()
        .map(Nomenclature::from)
        .filter(|n| n.article.eq_ignore_ascii_case(article))
        .collect();
    Ok(items)
}

pub async fn insert(aggregate: &Nomenclature) -> anyhow::Result<Uuid> {
    let uuid = aggregate.base.id.value();
    to_active_model(aggregate).insert(conn()).await?;
    Ok(uuid)
}

pub async fn update(aggregate: &Nomenclature) -> anyhow::Result<()> {
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
