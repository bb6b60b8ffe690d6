//! Цепочка бизнес-проверок перед созданием документа.
//!
//! Гейты выполняются строго по порядку, до открытия транзакции и без
//! каких-либо записей. Первый отказ завершает цепочку. Гейт может
//! пропустить запрос, отклонить его с машиночитаемым кодом или
//! добавить неблокирующее предупреждение и продолжить.

use async_trait::async_trait;
use contracts::domain::a002_warehouse::aggregate::Warehouse;
use contracts::domain::a003_supplier::aggregate::Supplier;
use contracts::domain::a005_purchase_order::aggregate::{OrderState, PurchaseOrder};
use contracts::domain::a006_goods_receipt::create::{CreateReceiptRequest, CreationTrigger};
use contracts::domain::a006_goods_receipt::aggregate::ReceiptKind;
use contracts::domain::a007_receipt_policy::aggregate::ReceiptPolicy;

use super::calc;
use super::error::{CreateReceiptError, RejectCode};
use super::store::ReceiptStore;
use crate::shared::format::format_amount;

/// Контекст, накапливаемый гейтами: найденные сущности и предупреждения
#[derive(Default)]
pub struct GateContext {
    pub warehouse: Option<Warehouse>,
    pub supplier: Option<Supplier>,
    pub order: Option<PurchaseOrder>,
    pub policy: Option<ReceiptPolicy>,
    pub warnings: Vec<String>,
}

/// Исход одной проверки
pub enum GateOutcome {
    Pass,
    /// Неблокирующее предупреждение; попадает в документ и аудит
    WarnAndContinue(String),
    /// Терминальный отказ со стабильным кодом
    Reject { code: RejectCode, reason: String },
    /// Нарушение политики: список нарушенных правил
    PolicyViolation { violations: Vec<String> },
}

#[async_trait]
pub trait CreationGate: Send + Sync {
    fn name(&self) -> &'static str;

    /// Применим ли гейт к запросу; неприменимый пропускается целиком
    fn applies(&self, request: &CreateReceiptRequest) -> bool {
        let _ = request;
        true
    }

    async fn check(
        &self,
        store: &dyn ReceiptStore,
        request: &CreateReceiptRequest,
        ctx: &mut GateContext,
    ) -> anyhow::Result<GateOutcome>;
}

/// Штатный порядок проверок
pub fn default_gates() -> Vec<Box<dyn CreationGate>> {
    vec![
        Box::new(WarehouseGate),
        Box::new(SupplierEligibilityGate),
        Box::new(OrderReferenceGate),
        Box::new(SupplierConsistencyGate),
        Box::new(FastTrackPolicyGate),
    ]
}

/// Прогнать цепочку; первый отказ останавливает выполнение
pub async fn run_gates(
    store: &dyn ReceiptStore,
    request: &CreateReceiptRequest,
    gates: &[Box<dyn CreationGate>],
    ctx: &mut GateContext,
) -> Result<(), CreateReceiptError> {
    for gate in gates {
        if !gate.applies(request) {
            tracing::debug!("gate {} skipped", gate.name());
            continue;
        }
        match gate
            .check(store, request, ctx)
            .await
            .map_err(CreateReceiptError::Storage)?
        {
            GateOutcome::Pass => {}
            GateOutcome::WarnAndContinue(warning) => {
                tracing::warn!("gate {}: {}", gate.name(), warning);
                ctx.warnings.push(warning);
            }
            GateOutcome::Reject { code, reason } => {
                tracing::info!("gate {} rejected creation: {} ({})", gate.name(), reason, code);
                return Err(CreateReceiptError::GateRejected { code, reason });
            }
            GateOutcome::PolicyViolation { violations } => {
                tracing::info!(
                    "gate {} rejected creation: {} policy rule(s) violated",
                    gate.name(),
                    violations.len()
                );
                return Err(CreateReceiptError::PolicyViolation {
                    violations,
                    warnings: ctx.warnings.clone(),
                });
            }
        }
    }
    Ok(())
}

// ============================================================================
// Гейт 1: склад существует и активен для организации
// ============================================================================

pub struct WarehouseGate;

#[async_trait]
impl CreationGate for WarehouseGate {
    fn name(&self) -> &'static str {
        "warehouse"
    }

    async fn check(
        &self,
        store: &dyn ReceiptStore,
        request: &CreateReceiptRequest,
        ctx: &mut GateContext,
    ) -> anyhow::Result<GateOutcome> {
        let warehouse = store
            .find_warehouse(&request.organization_id, &request.warehouse_id)
            .await?;

        let Some(warehouse) = warehouse else {
            return Ok(GateOutcome::Reject {
                code: RejectCode::WarehouseUnavailable,
                reason: format!(
                    "warehouse {} not found for organization",
                    request.warehouse_id
                ),
            });
        };
        if !warehouse.is_active {
            return Ok(GateOutcome::Reject {
                code: RejectCode::WarehouseUnavailable,
                reason: format!("warehouse {} is inactive", warehouse.base.description),
            });
        }

        ctx.warehouse = Some(warehouse);
        Ok(GateOutcome::Pass)
    }
}

// ============================================================================
// Гейт 2: допуск поставщика. Для внутреннего перемещения риска
// контрагента нет — гейт не применяется.
// ============================================================================

pub struct SupplierEligibilityGate;

#[async_trait]
impl CreationGate for SupplierEligibilityGate {
    fn name(&self) -> &'static str {
        "supplier_eligibility"
    }

    fn applies(&self, request: &CreateReceiptRequest) -> bool {
        request.kind != ReceiptKind::InternalTransfer
    }

    async fn check(
        &self,
        store: &dyn ReceiptStore,
        request: &CreateReceiptRequest,
        ctx: &mut GateContext,
    ) -> anyhow::Result<GateOutcome> {
        let supplier = store.find_supplier(&request.supplier_key).await?;

        let Some(supplier) = supplier else {
            return Ok(GateOutcome::Reject {
                code: RejectCode::SupplierNotFound,
                reason: format!("supplier {} not found", request.supplier_key),
            });
        };
        if supplier.is_blocked {
            let reason = supplier
                .block_reason
                .clone()
                .unwrap_or_else(|| "supplier is blocked".to_string());
            return Ok(GateOutcome::Reject {
                code: RejectCode::SupplierBlocked,
                reason,
            });
        }

        ctx.supplier = Some(supplier);
        Ok(GateOutcome::Pass)
    }
}

// ============================================================================
// Гейт 3: документ-основание. На основном пути ссылка обязана быть
// валидной; на вторичном (дозагрузка из счёта) список допустимых
// состояний шире, а невалидная ссылка понижается до предупреждения —
// документ создаётся без обогащения из заказа.
// ============================================================================

pub struct OrderReferenceGate;

/// Состояния заказа, допускающие приёмку на основном пути
const ORDER_STATES_DIRECT: &[OrderState] =
    &[OrderState::Approved, OrderState::PartiallyReceived];

/// Расширенный список для вторичного пути
const ORDER_STATES_INVOICE_SYNC: &[OrderState] = &[
    OrderState::Approved,
    OrderState::PartiallyReceived,
    OrderState::Received,
    OrderState::Closed,
];

#[async_trait]
impl CreationGate for OrderReferenceGate {
    fn name(&self) -> &'static str {
        "order_reference"
    }

    fn applies(&self, request: &CreateReceiptRequest) -> bool {
        request.order_ref.is_some()
    }

    async fn check(
        &self,
        store: &dyn ReceiptStore,
        request: &CreateReceiptRequest,
        ctx: &mut GateContext,
    ) -> anyhow::Result<GateOutcome> {
        let order_id = request.order_ref.as_deref().unwrap_or_default();
        let lenient = request.trigger == CreationTrigger::InvoiceSync;
        let allowed = if lenient {
            ORDER_STATES_INVOICE_SYNC
        } else {
            ORDER_STATES_DIRECT
        };

        let order = store
            .find_order(&request.organization_id, order_id)
            .await?;

        let Some(order) = order else {
            if lenient {
                return Ok(GateOutcome::WarnAndContinue(format!(
                    "referenced order {} not found; creating without enrichment",
                    order_id
                )));
            }
            return Ok(GateOutcome::Reject {
                code: RejectCode::OrderNotFound,
                reason: format!("referenced order {} not found", order_id),
            });
        };

        if !allowed.contains(&order.state) {
            if lenient {
                return Ok(GateOutcome::WarnAndContinue(format!(
                    "referenced order {} is in state '{}'; creating without enrichment",
                    order.document_no, order.state
                )));
            }
            return Ok(GateOutcome::Reject {
                code: RejectCode::OrderStateInvalid,
                reason: format!(
                    "referenced order {} is in state '{}'",
                    order.document_no, order.state
                ),
            });
        }

        ctx.order = Some(order);
        Ok(GateOutcome::Pass)
    }
}

// ============================================================================
// Гейт 4: поставщик найденного заказа совпадает с поставщиком запроса
// ============================================================================

pub struct SupplierConsistencyGate;

#[async_trait]
impl CreationGate for SupplierConsistencyGate {
    fn name(&self) -> &'static str {
        "supplier_consistency"
    }

    async fn check(
        &self,
        _store: &dyn ReceiptStore,
        request: &CreateReceiptRequest,
        ctx: &mut GateContext,
    ) -> anyhow::Result<GateOutcome> {
        if let Some(order) = &ctx.order {
            if order.supplier_key != request.supplier_key {
                return Ok(GateOutcome::Reject {
                    code: RejectCode::SupplierMismatch,
                    reason: format!(
                        "order {} belongs to supplier {}, request names {}",
                        order.document_no, order.supplier_key, request.supplier_key
                    ),
                });
            }
        }
        Ok(GateOutcome::Pass)
    }
}

// ============================================================================
// Гейт 5: политика ускоренного пути. Применяется, когда нет
// документа-основания и запрошена срочная/ускоренная приёмка.
// ============================================================================

pub struct FastTrackPolicyGate;

#[async_trait]
impl CreationGate for FastTrackPolicyGate {
    fn name(&self) -> &'static str {
        "fast_track_policy"
    }

    fn applies(&self, request: &CreateReceiptRequest) -> bool {
        calc::is_fast_track_path(request)
    }

    async fn check(
        &self,
        store: &dyn ReceiptStore,
        request: &CreateReceiptRequest,
        ctx: &mut GateContext,
    ) -> anyhow::Result<GateOutcome> {
        let policy = store.policy(&request.organization_id).await?;

        let mut violations = Vec::new();
        let mut total = 0.0;
        for (idx, line) in request.lines.iter().enumerate() {
            let amount = calc::line_amount(line.qty_accepted, line.unit_price);
            total += amount;
            if amount > policy.fast_track_line_ceiling {
                violations.push(format!(
                    "line {}: amount {} exceeds per-line ceiling {}",
                    idx + 1,
                    format_amount(amount),
                    format_amount(policy.fast_track_line_ceiling)
                ));
            }
        }
        if total > policy.fast_track_total_ceiling {
            violations.push(format!(
                "total amount {} exceeds fast-track ceiling {}",
                format_amount(total),
                format_amount(policy.fast_track_total_ceiling)
            ));
        }

        let warn = violations.is_empty() && total > policy.fast_track_warn_threshold;
        let threshold = policy.fast_track_warn_threshold;
        ctx.policy = Some(policy);

        if !violations.is_empty() {
            return Ok(GateOutcome::PolicyViolation { violations });
        }
        if warn {
            return Ok(GateOutcome::WarnAndContinue(format!(
                "fast-track total {} exceeds warning threshold {}",
                format_amount(total),
                format_amount(threshold)
            )));
        }
        Ok(GateOutcome::Pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a006_goods_receipt::create::test_support::{fixture, request_for};
    use contracts::domain::a005_purchase_order::aggregate::OrderState;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_warehouse_gate_rejects_unknown_warehouse() {
        let fx = fixture();
        let mut request = request_for(&fx);
        request.warehouse_id = "no-such-warehouse".into();

        let mut ctx = GateContext::default();
        let err = run_gates(&fx.store, &request, &default_gates(), &mut ctx)
            .await
            .unwrap_err();
        match err {
            CreateReceiptError::GateRejected { code, .. } => {
                assert_eq!(code, RejectCode::WarehouseUnavailable);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_warehouse_gate_rejects_inactive_warehouse() {
        let mut fx = fixture();
        fx.store.warehouses[0].is_active = false;
        let request = request_for(&fx);

        let mut ctx = GateContext::default();
        let err = run_gates(&fx.store, &request, &default_gates(), &mut ctx)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CreateReceiptError::GateRejected {
                code: RejectCode::WarehouseUnavailable,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_supplier_gate_rejects_blocked_supplier() {
        let mut fx = fixture();
        fx.store.suppliers[0].is_blocked = true;
        fx.store.suppliers[0].block_reason = Some("задолженность по претензиям".into());
        let request = request_for(&fx);

        let mut ctx = GateContext::default();
        let err = run_gates(&fx.store, &request, &default_gates(), &mut ctx)
            .await
            .unwrap_err();
        match err {
            CreateReceiptError::GateRejected { code, reason } => {
                assert_eq!(code, RejectCode::SupplierBlocked);
                assert!(reason.contains("задолженность"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_supplier_gate_skipped_for_internal_transfer() {
        let mut fx = fixture();
        fx.store.suppliers[0].is_blocked = true;
        fx.store.suppliers[0].block_reason = Some("blocked".into());
        let mut request = request_for(&fx);
        request.kind = ReceiptKind::InternalTransfer;

        let mut ctx = GateContext::default();
        run_gates(&fx.store, &request, &default_gates(), &mut ctx)
            .await
            .expect("internal transfer must not check supplier eligibility");
    }

    #[tokio::test]
    async fn test_order_gate_rejects_wrong_state_on_direct_path() {
        let mut fx = fixture();
        let order_id = fx.add_order(OrderState::Draft, None);
        let mut request = request_for(&fx);
        request.order_ref = Some(order_id);

        let mut ctx = GateContext::default();
        let err = run_gates(&fx.store, &request, &default_gates(), &mut ctx)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CreateReceiptError::GateRejected {
                code: RejectCode::OrderStateInvalid,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_order_gate_widens_whitelist_on_invoice_sync() {
        let mut fx = fixture();
        // received не входит в основной список, но допустим на вторичном пути
        let order_id = fx.add_order(OrderState::Received, None);
        let mut request = request_for(&fx);
        request.order_ref = Some(order_id);
        request.trigger = CreationTrigger::InvoiceSync;

        let mut ctx = GateContext::default();
        run_gates(&fx.store, &request, &default_gates(), &mut ctx)
            .await
            .unwrap();
        assert!(ctx.order.is_some());
        assert!(ctx.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_order_gate_downgrades_to_warning_on_invoice_sync() {
        let fx = fixture();
        let mut request = request_for(&fx);
        request.order_ref = Some("missing-order".into());
        request.trigger = CreationTrigger::InvoiceSync;

        let mut ctx = GateContext::default();
        run_gates(&fx.store, &request, &default_gates(), &mut ctx)
            .await
            .unwrap();
        assert!(ctx.order.is_none());
        assert_eq!(ctx.warnings.len(), 1);
        assert!(ctx.warnings[0].contains("without enrichment"));
    }

    #[tokio::test]
    async fn test_supplier_consistency_gate_rejects_mismatch() {
        let mut fx = fixture();
        let order_id = fx.add_order(OrderState::Approved, Some("другой-поставщик".into()));
        let mut request = request_for(&fx);
        request.order_ref = Some(order_id);

        let mut ctx = GateContext::default();
        let err = run_gates(&fx.store, &request, &default_gates(), &mut ctx)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CreateReceiptError::GateRejected {
                code: RejectCode::SupplierMismatch,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_policy_gate_warns_between_threshold_and_ceiling() {
        let fx = fixture();
        let mut request = request_for(&fx);
        request.fast_track = true;
        // три строки по 3000: итог 9000 — выше порога предупреждения
        // (8000), ниже потолка (10000); построчный потолок не задет
        let line = request.lines[0].clone();
        request.lines = vec![line.clone(), line.clone(), line];
        for l in &mut request.lines {
            l.qty_received = 3.0;
            l.qty_accepted = 3.0;
            l.unit_price = 1000.0;
        }

        let mut ctx = GateContext::default();
        run_gates(&fx.store, &request, &default_gates(), &mut ctx)
            .await
            .unwrap();
        assert_eq!(ctx.warnings.len(), 1);
        assert!(ctx.warnings[0].contains("warning threshold"));
    }

    struct AlwaysRejectGate;

    #[async_trait]
    impl CreationGate for AlwaysRejectGate {
        fn name(&self) -> &'static str {
            "always_reject"
        }

        async fn check(
            &self,
            _store: &dyn ReceiptStore,
            _request: &CreateReceiptRequest,
            _ctx: &mut GateContext,
        ) -> anyhow::Result<GateOutcome> {
            Ok(GateOutcome::Reject {
                code: RejectCode::SupplierBlocked,
                reason: "rejected by test gate".into(),
            })
        }
    }

    #[tokio::test]
    async fn test_chain_short_circuits_after_first_reject() {
        let fx = fixture();
        let request = request_for(&fx);

        /// Гейт-счётчик: фиксирует, дошло ли до него выполнение цепочки
        struct CountingGate(std::sync::Arc<AtomicUsize>);

        #[async_trait]
        impl CreationGate for CountingGate {
            fn name(&self) -> &'static str {
                "counting"
            }

            async fn check(
                &self,
                _store: &dyn ReceiptStore,
                _request: &CreateReceiptRequest,
                _ctx: &mut GateContext,
            ) -> anyhow::Result<GateOutcome> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Ok(GateOutcome::Pass)
            }
        }

        let counter = std::sync::Arc::new(AtomicUsize::new(0));
        let gates: Vec<Box<dyn CreationGate>> = vec![
            Box::new(AlwaysRejectGate),
            Box::new(CountingGate(counter.clone())),
        ];

        let mut ctx = GateContext::default();
        let err = run_gates(&fx.store, &request, &gates, &mut ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, CreateReceiptError::GateRejected { .. }));
        assert_eq!(
            counter.load(Ordering::SeqCst),
            0,
            "no gate after the rejecting one may run"
        );
    }
}
