use super::repository;
use contracts::domain::a007_receipt_policy::aggregate::{ReceiptPolicy, ReceiptPolicyDto};

/// Политика приёмки организации (значения по умолчанию, если не настроена)
pub async fn get_for_organization(organization_id: &str) -> anyhow::Result<ReceiptPolicy> {
    repository::get_or_default(organization_id).await
}

/// Сохранить политику организации
pub async fn save(organization_id: &str, dto: ReceiptPolicyDto) -> anyhow::Result<ReceiptPolicy> {
    if dto.fast_track_total_ceiling <= 0.0 || dto.fast_track_line_ceiling <= 0.0 {
        anyhow::bail!("Policy ceilings must be positive");
    }
    if dto.fast_track_grace_days <= 0 {
        anyhow::bail!("Grace period must be positive");
    }

    let policy = ReceiptPolicy {
        organization_id: organization_id.to_string(),
        fast_track_total_ceiling: dto.fast_track_total_ceiling,
        fast_track_line_ceiling: dto.fast_track_line_ceiling,
        fast_track_warn_threshold: dto.fast_track_warn_threshold,
        fast_track_grace_days: dto.fast_track_grace_days,
    };
    repository::upsert(&policy).await?;
    tracing::info!("Receipt policy updated for organization {}", organization_id);
    Ok(policy)
}
