use super::repository;
use contracts::domain::a005_purchase_order::aggregate::{
    OrderState, PurchaseOrder, PurchaseOrderLine,
};
use serde::Deserialize;
use uuid::Uuid;

/// DTO для создания/обновления заказа поставщику
#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseOrderDto {
    pub id: Option<String>,
    pub document_no: String,
    pub document_date: String,
    pub organization_id: String,
    pub supplier_key: String,
    pub state: OrderState,
    #[serde(default)]
    pub lines: Vec<PurchaseOrderLine>,
}

/// Создание нового заказа
pub async fn create(dto: PurchaseOrderDto) -> anyhow::Result<Uuid> {
    let mut aggregate = PurchaseOrder::new_for_insert(
        dto.document_no,
        dto.document_date,
        dto.organization_id,
        dto.supplier_key,
        dto.state,
        dto.lines,
    );
    aggregate.base.touch();
    repository::insert(&aggregate).await
}

/// Обновление существующего заказа
pub async fn update(dto: PurchaseOrderDto) -> anyhow::Result<()> {
    let id = dto
        .id
        .as_ref()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| anyhow::anyhow!("Invalid ID"))?;

    let mut aggregate = repository::get_by_id(id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Not found"))?;

    aggregate.document_no = dto.document_no;
    aggregate.document_date = dto.document_date;
    aggregate.supplier_key = dto.supplier_key;
    aggregate.state = dto.state;
    aggregate.lines_json = if dto.lines.is_empty() {
        None
    } else {
        serde_json::to_string(&dto.lines).ok()
    };
    aggregate.base.touch();

    repository::update(&aggregate).await
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<PurchaseOrder>> {
    repository::get_by_id(id).await
}

pub async fn list_all(organization_id: Option<&str>) -> anyhow::Result<Vec<PurchaseOrder>> {
    repository::list_all(organization_id).await
}

/// Перевести заказ в новое состояние
pub async fn set_state(id: Uuid, state: OrderState) -> anyhow::Result<bool> {
    let changed = repository::set_state(id, state).await?;
    if changed {
        tracing::info!("Purchase order {} moved to state {}", id, state);
    }
    Ok(changed)
}

/// Мягкое удаление заказа
pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    repository::soft_delete(id).await
}
