use super::create::{self, CreateReceiptError, SqlReceiptStore};
use super::repository;
use contracts::domain::a005_purchase_order::aggregate::PurchaseOrder;
use contracts::domain::a006_goods_receipt::aggregate::GoodsReceipt;
use contracts::domain::a006_goods_receipt::create::{CreateReceiptRequest, CreatedReceipt};
use contracts::domain::common::AggregateRoot;
use contracts::shared::audit::AuditLink;
use uuid::Uuid;

use crate::shared::logger;

pub use repository::ReceiptListRow;

/// Создать приходную накладную: гейты, производные поля, нумерация
/// с повторами — см. модуль `create`. После успеха пишется аудит.
pub async fn create(request: CreateReceiptRequest) -> Result<CreatedReceipt, CreateReceiptError> {
    let retry = crate::shared::config::global().creation.retry_policy();
    let store = SqlReceiptStore;

    let created = create::create_receipt(&store, &retry, &request).await?;

    let receipt = &created.receipt;
    let mut links = Vec::new();
    if let Some(order_ref) = &receipt.order_ref {
        links.push(AuditLink {
            entity_kind: PurchaseOrder::full_name(),
            entity_id: order_ref.clone(),
        });
    }
    if let Some(source_ref) = &request.source_invoice_ref {
        links.push(AuditLink {
            entity_kind: "invoice_raw_storage".into(),
            entity_id: source_ref.clone(),
        });
    }

    let message = if created.warnings.is_empty() {
        format!("Создан документ {}", receipt.document_no)
    } else {
        format!(
            "Создан документ {} с предупреждениями: {}",
            receipt.document_no,
            created.warnings.join("; ")
        )
    };
    logger::audit(
        &GoodsReceipt::full_name(),
        &receipt.to_string_id(),
        &receipt.organization_id,
        &receipt.created_by,
        receipt.status.as_str(),
        links,
        &message,
    );
    logger::log("creation", &message);

    Ok(created)
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<GoodsReceipt>> {
    repository::get_by_id(id).await
}

pub async fn list(organization_id: Option<&str>) -> anyhow::Result<Vec<ReceiptListRow>> {
    repository::list_all(organization_id).await
}

/// Провести документ
pub async fn post_document(id: Uuid) -> anyhow::Result<bool> {
    let changed = repository::set_posted(id, true).await?;
    if changed {
        tracing::info!("Posted goods receipt: {}", id);
    }
    Ok(changed)
}

/// Отменить проведение документа
pub async fn unpost_document(id: Uuid) -> anyhow::Result<bool> {
    let changed = repository::set_posted(id, false).await?;
    if changed {
        tracing::info!("Unposted goods receipt: {}", id);
    }
    Ok(changed)
}

/// Записи аудита по документу
pub async fn audit_trail(
    id: Uuid,
) -> anyhow::Result<Vec<contracts::shared::audit::AuditEntry>> {
    logger::repository::get_audit_for_entity(&GoodsReceipt::full_name(), &id.to_string()).await
}
