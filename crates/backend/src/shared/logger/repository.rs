use chrono::Utc;
use contracts::shared::audit::{AuditEntry, AuditLink};
use contracts::shared::logger::LogEntry;
use sea_orm::{QueryOrder, Set};

use crate::shared::data::db::get_connection;
use sea_orm::DatabaseConnection;

pub mod log_entity {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "system_log")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub timestamp: String,
        pub source: String,
        pub category: String,
        pub message: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod audit_entity {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "system_audit")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub timestamp: String,
        pub entity_kind: String,
        pub entity_id: String,
        pub organization_id: String,
        pub principal: String,
        pub status: String,
        pub links_json: String,
        pub message: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

impl From<log_entity::Model> for LogEntry {
    fn from(m: log_entity::Model) -> Self {
        LogEntry {
            id: m.id,
            timestamp: m.timestamp,
            source: m.source,
            category: m.category,
            message: m.message,
        }
    }
}

impl From<audit_entity::Model> for AuditEntry {
    fn from(m: audit_entity::Model) -> Self {
        let links: Vec<AuditLink> = serde_json::from_str(&m.links_json).unwrap_or_default();
        AuditEntry {
            id: m.id,
            timestamp: m.timestamp,
            entity_kind: m.entity_kind,
            entity_id: m.entity_id,
            organization_id: m.organization_id,
            principal: m.principal,
            status: m.status,
            links,
            message: m.message,
        }
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

fn now_stamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

/// Добавить запись в лог (внутренняя функция)
pub fn log_event_internal(source: &str, category: &str, message: &str) {
    let source = source.to_string();
    let category = category.to_string();
    let message = message.to_string();

    tokio::spawn(async move {
        if let Err(e) = log_event(&source, &category, &message).await {
            eprintln!("Failed to log event: {}", e);
        }
    });
}

/// Добавить запись в лог
pub async fn log_event(source: &str, category: &str, message: &str) -> anyhow::Result<()> {
    use sea_orm::ActiveModelTrait;

    let active = log_entity::ActiveModel {
        id: sea_orm::ActiveValue::NotSet,
        timestamp: Set(now_stamp()),
        source: Set(source.to_string()),
        category: Set(category.to_string()),
        message: Set(message.to_string()),
    };

    active.insert(conn()).await?;
    Ok(())
}

/// Добавить запись аудита (внутренняя функция, fire-and-forget)
#[allow(clippy::too_many_arguments)]
pub fn audit_event_internal(
    entity_kind: &str,
    entity_id: &str,
    organization_id: &str,
    principal: &str,
    status: &str,
    links: Vec<AuditLink>,
    message: &str,
) {
    let entity_kind = entity_kind.to_string();
    let entity_id = entity_id.to_string();
    let organization_id = organization_id.to_string();
    let principal = principal.to_string();
    let status = status.to_string();
    let message = message.to_string();

    tokio::spawn(async move {
        if let Err(e) = audit_event(
            &entity_kind,
            &entity_id,
            &organization_id,
            &principal,
            &status,
            &links,
            &message,
        )
        .await
        {
            eprintln!("Failed to write audit event: {}", e);
        }
    });
}

/// Добавить запись аудита
pub async fn audit_event(
    entity_kind: &str,
    entity_id: &str,
    organization_id: &str,
    principal: &str,
    status: &str,
    links: &[AuditLink],
    message: &str,
) -> anyhow::Result<()> {
    use sea_orm::ActiveModelTrait;

    let active = audit_entity::ActiveModel {
        id: sea_orm::ActiveValue::NotSet,
        timestamp: Set(now_stamp()),
        entity_kind: Set(entity_kind.to_string()),
        entity_id: Set(entity_id.to_string()),
        organization_id: Set(organization_id.to_string()),
        principal: Set(principal.to_string()),
        status: Set(status.to_string()),
        links_json: Set(serde_json::to_string(links).unwrap_or_else(|_| "[]".into())),
        message: Set(message.to_string()),
    };

    active.insert(conn()).await?;
    Ok(())
}

/// Получить все записи лога (сортировка по времени, новые сверху)
pub async fn get_all_logs() -> anyhow::Result<Vec<LogEntry>> {
    use sea_orm::EntityTrait;

    let logs: Vec<LogEntry> = log_entity::Entity::find()
        .order_by_desc(log_entity::Column::Id)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(logs)
}

/// Очистить лог
pub async fn clear_all_logs() -> anyhow::Result<()> {
    use sea_orm::EntityTrait;

    log_entity::Entity::delete_many().exec(conn()).await?;
    Ok(())
}

/// Записи аудита по сущности (новые сверху)
pub async fn get_audit_for_entity(
    entity_kind: &str,
    entity_id: &str,
) -> anyhow::Result<Vec<AuditEntry>> {
    use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

    let entries: Vec<AuditEntry> = audit_entity::Entity::find()
        .filter(audit_entity::Column::EntityKind.eq(entity_kind))
        .filter(audit_entity::Column::EntityId.eq(entity_id))
        .order_by_desc(audit_entity::Column::Id)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(entries)
}
