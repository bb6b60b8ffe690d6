use super::repository;
use contracts::domain::a003_supplier::aggregate::{Supplier, SupplierDto};
use uuid::Uuid;

/// Создание нового поставщика
pub async fn create(dto: SupplierDto) -> anyhow::Result<Uuid> {
    let code = dto
        .code
        .clone()
        .unwrap_or_else(|| format!("SUP-{}", Uuid::new_v4()));
    let mut aggregate = Supplier::new_for_insert(
        code,
        dto.description.clone(),
        dto.inn.clone(),
        dto.kpp.clone(),
        dto.comment.clone(),
    );
    aggregate.is_blocked = dto.is_blocked;
    aggregate.block_reason = dto.block_reason.clone();

    aggregate
        .validate()
        .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;

    aggregate.before_write();

    repository::insert(&aggregate).await
}

/// Обновление существующего поставщика
pub async fn update(dto: SupplierDto) -> anyhow::Result<()> {
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

/// Мягкое удаление поставщика
pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    repository::soft_delete(id).await
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Supplier>> {
    repository::get_by_id(id).await
}

pub async fn list_all() -> anyhow::Result<Vec<Supplier>> {
    repository::list_all().await
}

/// Заблокировать поставщика с указанием причины
pub async fn block(id: Uuid, reason: String) -> anyhow::Result<()> {
    let mut aggregate = repository::get_by_id(id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Not found"))?;

    aggregate.is_blocked = true;
    aggregate.block_reason = Some(reason);
    aggregate.before_write();

    repository::update(&aggregate).await?;
    tracing::info!("Supplier {} blocked", id);
    Ok(())
}

/// Снять блокировку поставщика
pub async fn unblock(id: Uuid) -> anyhow::Result<()> {
    let mut aggregate = repository::get_by_id(id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Not found"))?;

    aggregate.is_blocked = false;
    aggregate.block_reason = None;
    aggregate.before_write();

    repository::update(&aggregate).await?;
    tracing::info!("Supplier {} unblocked", id);
    Ok(())
}
