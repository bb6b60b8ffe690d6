use chrono::Utc;
use contracts::domain::a005_purchase_order::aggregate::{
    OrderState, PurchaseOrder, PurchaseOrderId,
};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a005_purchase_order")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub document_no: String,
    pub document_date: String,
    pub organization_id: String,
    pub supplier_key: String,
    pub state: String,
    pub lines_json: Option<String>,
    pub is_deleted: bool,
    pub is_posted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for PurchaseOrder {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            is_posted: m.is_posted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());

        PurchaseOrder {
            base: BaseAggregate::with_metadata(
                PurchaseOrderId::new(uuid),
                m.code,
                m.description,
                m.comment,
                metadata,
            ),
            document_no: m.document_no,
            document_date: m.document_date,
            organization_id: m.organization_id,
            supplier_key: m.supplier_key,
            state: OrderState::from_str(&m.state).unwrap_or(OrderState::Draft),
            lines_json: m.lines_json,
        }
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

fn to_active_model(aggregate: &PurchaseOrder) -> ActiveModel {
    ActiveModel {
        id: Set(aggregate.base.id.value().to_string()),
        code: Set(aggregate.base.code.clone()),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        document_no: Set(aggregate.document_no.clone()),
        document_date: Set(aggregate.document_date.clone()),
        organization_id: Set(aggregate.organization_id.clone()),
        supplier_key: Set(aggregate.supplier_key.clone()),
        state: Set(aggregate.state.as_str().to_string()),
        lines_json: Set(aggregate.lines_json.clone()),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        is_posted: Set(aggregate.base.metadata.is_posted),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    }
}

pub async fn list_all(organization_id: Option<&str>) -> anyhow::Result<Vec<PurchaseOrder>> {
    let mut query = Entity::find().filter(Column::IsDeleted.eq(false));
    if let Some(org) = organization_id {
        query = query.filter(Column::OrganizationId.eq(org));
    }
    let items: Vec<PurchaseOrder> = query
        .order_by_desc(Column::DocumentDate)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<PurchaseOrder>> {
    let result = Entity::find_by_id(id.to_string()).one(conn()).await?;
    Ok(result.map(Into::into))
}

/// Найти заказ организации по строковому id (проверка документа-основания)
pub async fn find_for_organization(
    organization_id: &str,
    order_id: &str,
) -> anyhow::Result<Option<PurchaseOrder>> {
    let result = Entity::find_by_id(order_id.to_string())
        .filter(Column::OrganizationId.eq(organization_id))
        .filter(Column::IsDeleted.eq(false))
        .one(conn())
        .await?;
    Ok(result.map(Into::into))
}

pub async fn insert(aggregate: &PurchaseOrder) -> anyhow::Result<Uuid> {
    let uuid = aggregate.base.id.value();
    to_active_model(aggregate).insert(conn()).await?;
    Ok(uuid)
}

pub async fn update(aggregate: &PurchaseOrder) -> anyhow::Result<()> {
    let mut active = to_active_model(aggregate);
    active.created_at = sea_orm::ActiveValue::NotSet;
    active.version = Set(aggregate.base.metadata.version + 1);
    Entity::update(active).exec(conn()).await?;
    Ok(())
}

/// Перевести заказ в новое состояние
pub async fn set_state(id: Uuid, state: OrderState) -> anyhow::Result<bool> {
    let existing = Entity::find_by_id(id.to_string()).one(conn()).await?;
    let Some(model) = existing else {
        return Ok(false);
    };

    let mut active: ActiveModel = model.into();
    active.state = Set(state.as_str().to_string());
    active.updated_at = Set(Some(Utc::now()));
    active.update(conn()).await?;
    Ok(true)
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
