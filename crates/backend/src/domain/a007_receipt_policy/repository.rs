use chrono::Utc;
use contracts::domain::a007_receipt_policy::aggregate::ReceiptPolicy;
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;
use sea_orm::{EntityTrait, Set};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a007_receipt_policy")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub organization_id: String,
    pub fast_track_total_ceiling: f64,
    pub fast_track_line_ceiling: f64,
    pub fast_track_warn_threshold: f64,
    pub fast_track_grace_days: i64,
    pub updated_at: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ReceiptPolicy {
    fn from(m: Model) -> Self {
        ReceiptPolicy {
            organization_id: m.organization_id,
            fast_track_total_ceiling: m.fast_track_total_ceiling,
            fast_track_line_ceiling: m.fast_track_line_ceiling,
            fast_track_warn_threshold: m.fast_track_warn_threshold,
            fast_track_grace_days: m.fast_track_grace_days,
        }
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

/// Политика организации; при отсутствии строки — значения по умолчанию
pub async fn get_or_default(organization_id: &str) -> anyhow::Result<ReceiptPolicy> {
    let result = Entity::find_by_id(organization_id.to_string())
        .one(conn())
        .await?;
    Ok(result
        .map(Into::into)
        .unwrap_or_else(|| ReceiptPolicy::default_for(organization_id)))
}

/// Записать политику организации (insert или update)
pub async fn upsert(policy: &ReceiptPolicy) -> anyhow::Result<()> {
    let existing = Entity::find_by_id(policy.organization_id.clone())
        .one(conn())
        .await?;

    let active = ActiveModel {
        organization_id: Set(policy.organization_id.clone()),
        fast_track_total_ceiling: Set(policy.fast_track_total_ceiling),
        fast_track_line_ceiling: Set(policy.fast_track_line_ceiling),
        fast_track_warn_threshold: Set(policy.fast_track_warn_threshold),
        fast_track_grace_days: Set(policy.fast_track_grace_days),
        updated_at: Set(Some(Utc::now().to_rfc3339())),
    };

    if existing.is_some() {
        Entity::update(active).exec(conn()).await?;
    } else {
        Entity::insert(active).exec(conn()).await?;
    }
    Ok(())
}
