use chrono::Utc;
use contracts::domain::a006_goods_receipt::aggregate::{
    GoodsReceipt, GoodsReceiptId, GoodsReceiptLine, ReceiptKind, ReceiptStatus,
};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use uuid::Uuid;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::shared::data::db::get_connection;

/// Шапка документа
pub mod receipt_entity {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "a006_goods_receipt")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub code: String,
        pub description: String,
        pub comment: Option<String>,
        pub document_no: String,
        pub document_date: String,
        pub organization_id: String,
        pub warehouse_id: String,
        pub supplier_key: String,
        pub kind: String,
        pub status: String,
        pub order_ref: Option<String>,
        pub urgent: bool,
        pub fast_track: bool,
        pub total_amount: f64,
        pub regularization_required: bool,
        pub regularization_deadline: Option<String>,
        pub reason: Option<String>,
        pub created_by: String,
        pub is_deleted: bool,
        pub is_posted: bool,
        pub created_at: Option<chrono::DateTime<chrono::Utc>>,
        pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
        pub version: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Строка табличной части; живёт только вместе с шапкой
pub mod line_entity {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "a006_goods_receipt_line")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub receipt_id: String,
        pub line_no: i32,
        pub nomenclature_key: String,
        pub qty_expected: f64,
        pub qty_received: f64,
        pub qty_accepted: f64,
        pub qty_rejected: f64,
        pub unit_price: f64,
        pub amount: f64,
        pub internal_code: Option<String>,
        pub supplier_code: Option<String>,
        pub lot: Option<String>,
        pub expiry_date: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

fn line_from_model(m: line_entity::Model) -> GoodsReceiptLine {
    GoodsReceiptLine {
        line_no: m.line_no,
        nomenclature_key: m.nomenclature_key,
        qty_expected: m.qty_expected,
        qty_received: m.qty_received,
        qty_accepted: m.qty_accepted,
        qty_rejected: m.qty_rejected,
        unit_price: m.unit_price,
        amount: m.amount,
        internal_code: m.internal_code,
        supplier_code: m.supplier_code,
        lot: m.lot,
        expiry_date: m.expiry_date,
    }
}

fn assemble(m: receipt_entity::Model, mut lines: Vec<line_entity::Model>) -> GoodsReceipt {
    let metadata = EntityMetadata {
        created_at: m.created_at.unwrap_or_else(Utc::now),
        updated_at: m.updated_at.unwrap_or_else(Utc::now),
        is_deleted: m.is_deleted,
        is_posted: m.is_posted,
        version: m.version,
    };
    let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());

    lines.sort_by_key(|l| l.line_no);

    GoodsReceipt {
        base: BaseAggregate::with_metadata(
            GoodsReceiptId::new(uuid),
            m.code,
            m.description,
            m.comment,
            metadata,
        ),
        document_no: m.document_no,
        document_date: m.document_date,
        organization_id: m.organization_id,
        warehouse_id: m.warehouse_id,
        supplier_key: m.supplier_key,
        kind: ReceiptKind::from_str(&m.kind).unwrap_or(ReceiptKind::Purchase),
        status: ReceiptStatus::from_str(&m.status).unwrap_or(ReceiptStatus::Draft),
        order_ref: m.order_ref,
        urgent: m.urgent,
        fast_track: m.fast_track,
        total_amount: m.total_amount,
        regularization_required: m.regularization_required,
        regularization_deadline: m.regularization_deadline,
        reason: m.reason,
        created_by: m.created_by,
        lines: lines.into_iter().map(line_from_model).collect(),
    }
}

fn header_active_model(receipt: &GoodsReceipt) -> receipt_entity::ActiveModel {
    receipt_entity::ActiveModel {
        id: Set(receipt.base.id.value().to_string()),
        code: Set(receipt.base.code.clone()),
        description: Set(receipt.base.description.clone()),
        comment: Set(receipt.base.comment.clone()),
        document_no: Set(receipt.document_no.clone()),
        document_date: Set(receipt.document_date.clone()),
        organization_id: Set(receipt.organization_id.clone()),
        warehouse_id: Set(receipt.warehouse_id.clone()),
        supplier_key: Set(receipt.supplier_key.clone()),
        kind: Set(receipt.kind.as_str().to_string()),
        status: Set(receipt.status.as_str().to_string()),
        order_ref: Set(receipt.order_ref.clone()),
        urgent: Set(receipt.urgent),
        fast_track: Set(receipt.fast_track),
        total_amount: Set(receipt.total_amount),
        regularization_required: Set(receipt.regularization_required),
        regularization_deadline: Set(receipt.regularization_deadline.clone()),
        reason: Set(receipt.reason.clone()),
        created_by: Set(receipt.created_by.clone()),
        is_deleted: Set(receipt.base.metadata.is_deleted),
        is_posted: Set(receipt.base.metadata.is_posted),
        created_at: Set(Some(receipt.base.metadata.created_at)),
        updated_at: Set(Some(receipt.base.metadata.updated_at)),
        version: Set(receipt.base.metadata.version),
    }
}

fn line_active_model(receipt_id: &str, line: &GoodsReceiptLine) -> line_entity::ActiveModel {
    line_entity::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        receipt_id: Set(receipt_id.to_string()),
        line_no: Set(line.line_no),
        nomenclature_key: Set(line.nomenclature_key.clone()),
        qty_expected: Set(line.qty_expected),
        qty_received: Set(line.qty_received),
        qty_accepted: Set(line.qty_accepted),
        qty_rejected: Set(line.qty_rejected),
        unit_price: Set(line.unit_price),
        amount: Set(line.amount),
        internal_code: Set(line.internal_code.clone()),
        supplier_code: Set(line.supplier_code.clone()),
        lot: Set(line.lot.clone()),
        expiry_date: Set(line.expiry_date.clone()),
    }
}

/// Сканирование номеров серии: все номера организации с данным префиксом.
///
/// Работает и на соединении, и внутри транзакции: внутри транзакции
/// видит как минимум зафиксированные документы конкурентов; документы
/// незавершённых транзакций может не увидеть — эту гонку разрешает
/// уникальный индекс и повтор попытки, а не уровень изоляции.
pub async fn scan_document_numbers<C: ConnectionTrait>(
    db: &C,
    organization_id: &str,
    prefix: &str,
) -> anyhow::Result<Vec<String>> {
    let numbers: Vec<String> = receipt_entity::Entity::find()
        .select_only()
        .column(receipt_entity::Column::DocumentNo)
        .filter(receipt_entity::Column::OrganizationId.eq(organization_id))
        .filter(receipt_entity::Column::DocumentNo.starts_with(prefix))
        .into_tuple()
        .all(db)
        .await?;
    Ok(numbers)
}

/// Вставить шапку и все строки одним вызовом на переданном соединении
/// (внутри транзакции — атомарно). Возвращает `DbErr`, чтобы вызывающий
/// мог отличить нарушение уникальности номера от прочих ошибок.
pub async fn insert_with_lines<C: ConnectionTrait>(
    db: &C,
    receipt: &GoodsReceipt,
) -> Result<(), DbErr> {
    let receipt_id = receipt.base.id.value().to_string();

    receipt_entity::Entity::insert(header_active_model(receipt))
        .exec(db)
        .await?;

    for line in &receipt.lines {
        line_entity::Entity::insert(line_active_model(&receipt_id, line))
            .exec(db)
            .await?;
    }

    Ok(())
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<GoodsReceipt>> {
    let header = receipt_entity::Entity::find_by_id(id.to_string())
        .one(conn())
        .await?;
    let Some(header) = header else {
        return Ok(None);
    };

    let lines = line_entity::Entity::find()
        .filter(line_entity::Column::ReceiptId.eq(header.id.clone()))
        .all(conn())
        .await?;

    Ok(Some(assemble(header, lines)))
}

/// Упрощённая строка для списка документов
#[derive(Debug, Clone, serde::Serialize)]
pub struct ReceiptListRow {
    pub id: String,
    pub document_no: String,
    pub document_date: String,
    pub supplier_key: String,
    pub warehouse_id: String,
    pub status: String,
    pub total_amount: f64,
    pub urgent: bool,
    pub fast_track: bool,
    pub is_posted: bool,
}

pub async fn list_all(organization_id: Option<&str>) -> anyhow::Result<Vec<ReceiptListRow>> {
    let mut query = receipt_entity::Entity::find()
        .filter(receipt_entity::Column::IsDeleted.eq(false));
    if let Some(org) = organization_id {
        query = query.filter(receipt_entity::Column::OrganizationId.eq(org));
    }

    let rows = query
        .order_by_desc(receipt_entity::Column::DocumentDate)
        .order_by_desc(receipt_entity::Column::DocumentNo)
        .all(conn())
        .await?;

    Ok(rows
        .into_iter()
        .map(|m| ReceiptListRow {
            id: m.id,
            document_no: m.document_no,
            document_date: m.document_date,
            supplier_key: m.supplier_key,
            warehouse_id: m.warehouse_id,
            status: m.status,
            total_amount: m.total_amount,
            urgent: m.urgent,
            fast_track: m.fast_track,
            is_posted: m.is_posted,
        })
        .collect())
}

/// Провести/отменить проведение документа
pub async fn set_posted(id: Uuid, posted: bool) -> anyhow::Result<bool> {
    let existing = receipt_entity::Entity::find_by_id(id.to_string())
        .one(conn())
        .await?;
    let Some(model) = existing else {
        return Ok(false);
    };

    let mut active: receipt_entity::ActiveModel = model.into();
    active.is_posted = Set(posted);
    active.status = Set(if posted {
        ReceiptStatus::Posted.as_str().to_string()
    } else {
        ReceiptStatus::Draft.as_str().to_string()
    });
    active.updated_at = Set(Some(Utc::now()));
    active.update(conn()).await?;
    Ok(true)
}
