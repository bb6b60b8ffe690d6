use async_trait::async_trait;
use contracts::domain::a002_warehouse::aggregate::Warehouse;
use contracts::domain::a003_supplier::aggregate::Supplier;
use contracts::domain::a004_nomenclature::aggregate::Nomenclature;
use contracts::domain::a005_purchase_order::aggregate::PurchaseOrder;
use contracts::domain::a006_goods_receipt::aggregate::GoodsReceipt;
use contracts::domain::a007_receipt_policy::aggregate::ReceiptPolicy;
use sea_orm::{SqlErr, TransactionTrait};

use super::error::CreateReceiptError;
use crate::domain::{
    a002_warehouse, a003_supplier, a004_nomenclature, a005_purchase_order, a006_goods_receipt,
    a007_receipt_policy,
};
use crate::shared::data::db::get_connection;
use crate::shared::data::raw_storage;
use crate::shared::numbering;

/// Исход одной атомарной попытки вставки
#[derive(Debug)]
pub enum InsertAttempt {
    /// Транзакция зафиксирована, документ получил номер
    Committed(GoodsReceipt),
    /// Вставка отклонена уникальным индексом номера; попытку можно
    /// повторить с большим смещением
    NumberConflict,
}

/// Хранилище движка создания: справочные чтения, политика, атомарная
/// нумерованная вставка и best-effort подтверждение источника.
///
/// Абстракция позволяет прогонять движок в тестах против хранилища
/// в памяти с тем же контрактом уникальности номера.
#[async_trait]
pub trait ReceiptStore: Send + Sync {
    async fn find_warehouse(
        &self,
        organization_id: &str,
        warehouse_id: &str,
    ) -> anyhow::Result<Option<Warehouse>>;

    async fn find_supplier(&self, supplier_key: &str) -> anyhow::Result<Option<Supplier>>;

    async fn find_order(
        &self,
        organization_id: &str,
        order_id: &str,
    ) -> anyhow::Result<Option<PurchaseOrder>>;

    async fn find_nomenclature(
        &self,
        nomenclature_key: &str,
    ) -> anyhow::Result<Option<Nomenclature>>;

    async fn policy(&self, organization_id: &str) -> anyhow::Result<ReceiptPolicy>;

    /// База последовательности вне транзакции (хвост серии на текущий
    /// момент; подсказка, не гарантия)
    async fn highest_sequence(&self, organization_id: &str, prefix: &str)
        -> anyhow::Result<u32>;

    /// Одна атомарная попытка: скан серии внутри транзакции, номер со
    /// смещением `offset`, вставка шапки и всех строк, commit.
    /// Частично записанный документ снаружи транзакции не наблюдаем.
    async fn try_insert(
        &self,
        draft: &GoodsReceipt,
        prefix: &str,
        offset: u32,
    ) -> Result<InsertAttempt, CreateReceiptError>;

    /// Подтвердить запись-источник во внешнем хранилище.
    /// Сбой не влияет на судьбу уже зафиксированного документа.
    async fn acknowledge_source(&self, source_ref: &str) -> anyhow::Result<()>;
}

/// Продакшн-реализация поверх sea-orm / SQLite
pub struct SqlReceiptStore;

#[async_trait]
impl ReceiptStore for SqlReceiptStore {
    async fn find_warehouse(
        &self,
        organization_id: &str,
        warehouse_id: &str,
    ) -> anyhow::Result<Option<Warehouse>> {
        a002_warehouse::repository::find_for_organization(organization_id, warehouse_id).await
    }

    async fn find_supplier(&self, supplier_key: &str) -> anyhow::Result<Option<Supplier>> {
        a003_supplier::repository::find_by_key(supplier_key).await
    }

    async fn find_order(
        &self,
        organization_id: &str,
        order_id: &str,
    ) -> anyhow::Result<Option<PurchaseOrder>> {
        a005_purchase_order::repository::find_for_organization(organization_id, order_id).await
    }

    async fn find_nomenclature(
        &self,
        nomenclature_key: &str,
    ) -> anyhow::Result<Option<Nomenclature>> {
        a004_nomenclature::repository::find_by_key(nomenclature_key).await
    }

    async fn policy(&self, organization_id: &str) -> anyhow::Result<ReceiptPolicy> {
        a007_receipt_policy::repository::get_or_default(organization_id).await
    }

    async fn highest_sequence(
        &self,
        organization_id: &str,
        prefix: &str,
    ) -> anyhow::Result<u32> {
        let numbers = a006_goods_receipt::repository::scan_document_numbers(
            get_connection(),
            organization_id,
            prefix,
        )
        .await?;
        Ok(numbering::highest_sequence(
            numbers.iter().map(String::as_str),
            prefix,
        ))
    }

    async fn try_insert(
        &self,
        draft: &GoodsReceipt,
        prefix: &str,
        offset: u32,
    ) -> Result<InsertAttempt, CreateReceiptError> {
        let db = get_connection();
        let txn = db
            .begin()
            .await
            .map_err(|e| CreateReceiptError::Storage(e.into()))?;

        // Скан внутри границы транзакции: видит зафиксированные
        // документы конкурентов, завершившихся к этому моменту
        let numbers = a006_goods_receipt::repository::scan_document_numbers(
            &txn,
            &draft.organization_id,
            prefix,
        )
        .await
        .map_err(CreateReceiptError::Storage)?;
        let baseline = numbering::highest_sequence(numbers.iter().map(String::as_str), prefix);

        let Some(document_no) = numbering::format_document_no(prefix, baseline, offset) else {
            txn.rollback().await.ok();
            return Err(CreateReceiptError::NumberSpaceExhausted {
                prefix: prefix.to_string(),
            });
        };

        let mut receipt = draft.clone();
        receipt.document_no = document_no.clone();
        receipt.base.code = document_no.clone();
        receipt.base.description = format!("{} от {}", document_no, receipt.document_date);

        match a006_goods_receipt::repository::insert_with_lines(&txn, &receipt).await {
            Ok(()) => {
                txn.commit()
                    .await
                    .map_err(|e| CreateReceiptError::Storage(e.into()))?;
                Ok(InsertAttempt::Committed(receipt))
            }
            Err(err) => {
                let unique_violation =
                    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)));
                txn.rollback().await.ok();
                if unique_violation {
                    Ok(InsertAttempt::NumberConflict)
                } else {
                    Err(CreateReceiptError::Storage(err.into()))
                }
            }
        }
    }

    async fn acknowledge_source(&self, source_ref: &str) -> anyhow::Result<()> {
        let found = raw_storage::mark_processed(source_ref).await?;
        if !found {
            anyhow::bail!("source invoice record {} not found", source_ref);
        }
        Ok(())
    }
}
