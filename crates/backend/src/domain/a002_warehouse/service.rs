use super::repository;
use contracts::domain::a002_warehouse::aggregate::{Warehouse, WarehouseDto};
use uuid::Uuid;

/// Создание нового склада
pub async fn create(dto: WarehouseDto) -> anyhow::Result<Uuid> {
    let code = dto
        .code
        .clone()
        .unwrap_or_else(|| format!("WH-{}", Uuid::new_v4()));
    let mut aggregate = Warehouse::new_for_insert(
        code,
        dto.description.clone(),
        dto.organization_id.clone(),
        dto.address.clone(),
        dto.comment.clone(),
    );
    aggregate.is_active = dto.is_active;

    aggregate
        .validate()
        .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;

    aggregate.before_write();

    repository::insert(&aggregate).await
}

/// Обновление существующего склада
pub async fn update(dto: WarehouseDto) -> anyhow::Result<()> {
    let id = dto
        .id
        .as_ref()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| anyhow::anyhow!("Invalid ID"))?;

    let mut aggregate = repository::get_by_id(id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Not found"))?;

    aggregate.update(&dto);

    aggregate
        .validate()
        .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;

    aggregate.before_write();

    repository::update(&aggregate).await
}

/// Мягкое удаление склада
pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    repository::soft_delete(id).await
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Warehouse>> {
    repository::get_by_id(id).await
}

pub async fn list_all() -> anyhow::Result<Vec<Warehouse>> {
    repository::list_all().await
}
