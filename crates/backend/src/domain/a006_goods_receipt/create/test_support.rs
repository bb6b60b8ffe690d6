//! Хранилище в памяти для тестов движка создания: тот же контракт
//! уникальности номера, что и у БД, плюс счётчики вставок для проверки
//! короткого замыкания цепочки гейтов.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use contracts::domain::a002_warehouse::aggregate::Warehouse;
use contracts::domain::a003_supplier::aggregate::Supplier;
use contracts::domain::a004_nomenclature::aggregate::Nomenclature;
use contracts::domain::a005_purchase_order::aggregate::{
    OrderState, PurchaseOrder, PurchaseOrderLine,
};
use contracts::domain::a006_goods_receipt::aggregate::{GoodsReceipt, ReceiptKind};
use contracts::domain::a006_goods_receipt::create::{
    CreateReceiptRequest, CreationTrigger, ReceiptLineInput,
};
use contracts::domain::a007_receipt_policy::aggregate::ReceiptPolicy;

use super::error::CreateReceiptError;
use super::store::{InsertAttempt, ReceiptStore};
use crate::shared::numbering;

pub struct InMemoryStore {
    pub warehouses: Vec<Warehouse>,
    pub suppliers: Vec<Supplier>,
    pub orders: Vec<PurchaseOrder>,
    pub items: Vec<Nomenclature>,
    pub policy: ReceiptPolicy,

    /// Занятые номера; единственный арбитр уникальности, как и в БД
    pub numbers: Mutex<HashSet<String>>,
    pub committed: Mutex<Vec<GoodsReceipt>>,

    pub insert_attempts: AtomicUsize,
    pub line_inserts: AtomicUsize,

    pub acks: Mutex<Vec<String>>,
    pub fail_ack: bool,

    /// Сколько ближайших попыток вставки насильно проигрывают гонку
    /// (usize::MAX — все)
    pub forced_conflicts: AtomicUsize,
}

#[async_trait]
impl ReceiptStore for InMemoryStore {
    async fn find_warehouse(
        &self,
        organization_id: &str,
        warehouse_id: &str,
    ) -> anyhow::Result<Option<Warehouse>> {
        Ok(self
            .warehouses
            .iter()
            .find(|w| {
                w.organization_id == organization_id
                    && w.to_string_id() == warehouse_id
                    && !w.base.metadata.is_deleted
            })
            .cloned())
    }

    async fn find_supplier(&self, supplier_key: &str) -> anyhow::Result<Option<Supplier>> {
        Ok(self
            .suppliers
            .iter()
            .find(|s| s.to_string_id() == supplier_key && !s.base.metadata.is_deleted)
            .cloned())
    }

    async fn find_order(
        &self,
        organization_id: &str,
        order_id: &str,
    ) -> anyhow::Result<Option<PurchaseOrder>> {
        Ok(self
            .orders
            .iter()
            .find(|o| {
                o.organization_id == organization_id
                    && o.to_string_id() == order_id
                    && !o.base.metadata.is_deleted
            })
            .cloned())
    }

    async fn find_nomenclature(
        &self,
        nomenclature_key: &str,
    ) -> anyhow::Result<Option<Nomenclature>> {
        Ok(self
            .items
            .iter()
            .find(|n| n.to_string_id() == nomenclature_key && !n.is_folder)
            .cloned())
    }

    async fn policy(&self, _organization_id: &str) -> anyhow::Result<ReceiptPolicy> {
        Ok(self.policy.clone())
    }

    async fn highest_sequence(
        &self,
        _organization_id: &str,
        prefix: &str,
    ) -> anyhow::Result<u32> {
        let numbers = self.numbers.lock().unwrap();
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
        self.insert_attempts.fetch_add(1, Ordering::SeqCst);

        let forced = self.forced_conflicts.load(Ordering::SeqCst);
        if forced > 0 {
            if forced != usize::MAX {
                self.forced_conflicts.fetch_sub(1, Ordering::SeqCst);
            }
            return Ok(InsertAttempt::NumberConflict);
        }

        let baseline = {
            let numbers = self.numbers.lock().unwrap();
            numbering::highest_sequence(numbers.iter().map(String::as_str), prefix)
        };

        // Окно между сканом и вставкой: конкурирующие задачи могут
        // увидеть одинаковую базу, как и параллельные транзакции в БД
        tokio::task::yield_now().await;

        let Some(document_no) = numbering::format_document_no(prefix, baseline, offset) else {
            return Err(CreateReceiptError::NumberSpaceExhausted {
                prefix: prefix.to_string(),
            });
        };

        {
            let mut numbers = self.numbers.lock().unwrap();
            if !numbers.insert(document_no.clone()) {
                return Ok(InsertAttempt::NumberConflict);
            }
        }

        let mut receipt = draft.clone();
        receipt.document_no = document_no.clone();
        receipt.base.code = document_no.clone();
        receipt.base.description = format!("{} от {}", document_no, receipt.document_date);

        self.line_inserts
            .fetch_add(receipt.lines.len(), Ordering::SeqCst);
        self.committed.lock().unwrap().push(receipt.clone());

        Ok(InsertAttempt::Committed(receipt))
    }

    async fn acknowledge_source(&self, source_ref: &str) -> anyhow::Result<()> {
        if self.fail_ack {
            anyhow::bail!("external store unavailable");
        }
        self.acks.lock().unwrap().push(source_ref.to_string());
        Ok(())
    }
}

pub struct Fixture {
    pub store: InMemoryStore,
    pub organization_id: String,
    pub warehouse_id: String,
    pub supplier_key: String,
    pub item_key: String,
}

impl Fixture {
    /// Засеять существующие номера серии
    pub fn seed_numbers(&self, numbers: &[&str]) {
        let mut set = self.store.numbers.lock().unwrap();
        for n in numbers {
            set.insert((*n).to_string());
        }
    }

    /// Добавить заказ поставщику; возвращает его id
    pub fn add_order(&mut self, state: OrderState, supplier_key: Option<String>) -> String {
        let supplier = supplier_key.unwrap_or_else(|| self.supplier_key.clone());
        let order = PurchaseOrder::new_for_insert(
            "ORD-2026-00012".into(),
            "2026-03-01".into(),
            self.organization_id.clone(),
            supplier,
            state,
            vec![PurchaseOrderLine {
                nomenclature_key: self.item_key.clone(),
                quantity: 5.0,
                unit_price: 100.0,
                internal_code: Some("ORD-INT".into()),
                supplier_code: Some("ORD-SUP".into()),
            }],
        );
        let id = order.to_string_id();
        self.store.orders.push(order);
        id
    }
}

/// Организация со складом, поставщиком и позицией каталога
pub fn fixture() -> Fixture {
    let organization_id = uuid::Uuid::new_v4().to_string();

    let warehouse = Warehouse::new_for_insert(
        "WH-001".into(),
        "Основной склад".into(),
        organization_id.clone(),
        "г. Тверь, ул. Складская, 1".into(),
        None,
    );
    let supplier = Supplier::new_for_insert(
        "SUP-001".into(),
        "ООО \"Поставщик\"".into(),
        "7701234567".into(),
        "770101001".into(),
        None,
    );
    let mut item = Nomenclature::new_for_insert(
        "NOM-001".into(),
        "Болт М8".into(),
        "BM8-40".into(),
        "шт".into(),
        None,
    );
    item.default_internal_code = "CAT-INT".into();
    item.default_supplier_code = "CAT-SUP".into();

    let warehouse_id = warehouse.to_string_id();
    let supplier_key = supplier.to_string_id();
    let item_key = item.to_string_id();

    Fixture {
        store: InMemoryStore {
            warehouses: vec![warehouse],
            suppliers: vec![supplier],
            orders: Vec::new(),
            items: vec![item],
            policy: ReceiptPolicy::default_for(&organization_id),
            numbers: Mutex::new(HashSet::new()),
            committed: Mutex::new(Vec::new()),
            insert_attempts: AtomicUsize::new(0),
            line_inserts: AtomicUsize::new(0),
            acks: Mutex::new(Vec::new()),
            fail_ack: false,
            forced_conflicts: AtomicUsize::new(0),
        },
        organization_id,
        warehouse_id,
        supplier_key,
        item_key,
    }
}

/// Типовой запрос на приёмку: одна строка, 5 шт по 100
pub fn request_for(fx: &Fixture) -> CreateReceiptRequest {
    CreateReceiptRequest {
        organization_id: fx.organization_id.clone(),
        principal: "storekeeper-1".into(),
        kind: ReceiptKind::Purchase,
        order_ref: None,
        supplier_key: fx.supplier_key.clone(),
        warehouse_id: fx.warehouse_id.clone(),
        document_date: Some("2026-03-15".into()),
        urgent: false,
        fast_track: false,
        trigger: CreationTrigger::Direct,
        source_invoice_ref: None,
        reason: None,
        lines: vec![ReceiptLineInput {
            nomenclature_key: fx.item_key.clone(),
            qty_expected: 5.0,
            qty_received: 5.0,
            qty_accepted: 5.0,
            qty_rejected: 0.0,
            unit_price: 100.0,
            internal_code: None,
            supplier_code: None,
            lot: None,
            expiry_date: None,
        }],
    }
}
