//! Оркестратор создания: валидация → гейты → расчёт → ограниченные
//! попытки атомарной вставки → best-effort подтверждение источника.

use chrono::{Datelike, NaiveDate};
use contracts::domain::a006_goods_receipt::aggregate::{
    GoodsReceipt, GoodsReceiptId, GoodsReceiptLine, ReceiptStatus,
};
use contracts::domain::a006_goods_receipt::create::{CreateReceiptRequest, CreatedReceipt};
use contracts::domain::common::BaseAggregate;

use super::calc;
use super::error::CreateReceiptError;
use super::gates::{default_gates, run_gates, GateContext};
use super::store::{InsertAttempt, ReceiptStore};
use super::RECEIPT_SERIES_PREFIX;
use crate::shared::numbering;
use crate::shared::retry::RetryPolicy;

/// Создать приходную накладную.
///
/// Конфликт номера — единственная причина повтора; каждая следующая
/// попытка целится в больший номер (смещение равно номеру попытки)
/// независимо от результата скана. Исчерпание попыток — отдельная
/// фатальная ошибка, не смешиваемая с ошибками хранилища.
pub async fn create_receipt(
    store: &dyn ReceiptStore,
    retry: &RetryPolicy,
    request: &CreateReceiptRequest,
) -> Result<CreatedReceipt, CreateReceiptError> {
    validate_request(request)?;
    let document_date = resolve_document_date(request)?;

    // Бизнес-проверки — до открытия транзакции, без записей
    let mut ctx = GateContext::default();
    let gates = default_gates();
    run_gates(store, request, &gates, &mut ctx).await?;

    // Производные поля
    let fast_track_path = calc::is_fast_track_path(request);
    let policy = match ctx.policy.take() {
        Some(p) => p,
        None => store.policy(&request.organization_id).await?,
    };
    let lines = calc::enrich_lines(store, request, ctx.order.as_ref()).await?;
    let total = calc::total_amount(&lines);
    let (regularization_required, deadline) =
        calc::regularization(&policy, fast_track_path, request.urgent, document_date);

    let draft = build_draft(
        request,
        &ctx,
        document_date,
        lines,
        total,
        fast_track_path,
        regularization_required,
        deadline,
    );
    let prefix = numbering::series_prefix(RECEIPT_SERIES_PREFIX, document_date.year());

    for attempt in 0..retry.max_attempts {
        let delay = retry.delay_before(attempt);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match store.try_insert(&draft, &prefix, attempt).await? {
            InsertAttempt::Committed(receipt) => {
                let mut warnings = ctx.warnings.clone();

                // Подтверждение источника — best-effort: сбой логируется
                // и попадает в предупреждения, документ уже зафиксирован
                if let Some(source_ref) = request.source_invoice_ref.as_deref() {
                    if let Err(e) = store.acknowledge_source(source_ref).await {
                        tracing::warn!(
                            "acknowledgment of source invoice {} failed: {}",
                            source_ref,
                            e
                        );
                        warnings
                            .push(format!("source invoice {} was not acknowledged: {}", source_ref, e));
                    }
                }

                tracing::info!(
                    "Created goods receipt {} for organization {} (attempt {})",
                    receipt.document_no,
                    receipt.organization_id,
                    attempt + 1
                );
                return Ok(CreatedReceipt { receipt, warnings });
            }
            InsertAttempt::NumberConflict => {
                tracing::debug!(
                    "document number conflict on attempt {}, retrying with larger offset",
                    attempt + 1
                );
            }
        }
    }

    Err(CreateReceiptError::RetryExhausted {
        attempts: retry.max_attempts,
    })
}

fn validate_request(request: &CreateReceiptRequest) -> Result<(), CreateReceiptError> {
    fn blank(s: &str) -> bool {
        s.trim().is_empty()
    }

    if blank(&request.organization_id) {
        return Err(CreateReceiptError::Validation("organization_id is required".into()));
    }
    if blank(&request.principal) {
        return Err(CreateReceiptError::Validation("principal is required".into()));
    }
    if blank(&request.warehouse_id) {
        return Err(CreateReceiptError::Validation("warehouse_id is required".into()));
    }
    if blank(&request.supplier_key) {
        return Err(CreateReceiptError::Validation("supplier_key is required".into()));
    }
    if request.lines.is_empty() {
        return Err(CreateReceiptError::Validation(
            "at least one line is required".into(),
        ));
    }

    for (idx, line) in request.lines.iter().enumerate() {
        let line_no = idx + 1;
        if blank(&line.nomenclature_key) {
            return Err(CreateReceiptError::Validation(format!(
                "line {}: nomenclature_key is required",
                line_no
            )));
        }
        let quantities = [
            line.qty_expected,
            line.qty_received,
            line.qty_accepted,
            line.qty_rejected,
        ];
        if quantities.iter().any(|q| !q.is_finite() || *q < 0.0) {
            return Err(CreateReceiptError::Validation(format!(
                "line {}: quantities must be non-negative",
                line_no
            )));
        }
        if !line.unit_price.is_finite() || line.unit_price < 0.0 {
            return Err(CreateReceiptError::Validation(format!(
                "line {}: unit_price must be non-negative",
                line_no
            )));
        }
        if line.qty_accepted + line.qty_rejected > line.qty_received {
            return Err(CreateReceiptError::Validation(format!(
                "line {}: accepted + rejected exceeds received quantity",
                line_no
            )));
        }
    }

    Ok(())
}

fn resolve_document_date(request: &CreateReceiptRequest) -> Result<NaiveDate, CreateReceiptError> {
    match request.document_date.as_deref() {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
            CreateReceiptError::Validation(format!("document_date '{}' is not YYYY-MM-DD", s))
        }),
        None => Ok(chrono::Utc::now().date_naive()),
    }
}

/// Черновик документа: всё, кроме номера. Номер, код и описание
/// назначает хранилище внутри транзакции вставки.
#[allow(clippy::too_many_arguments)]
fn build_draft(
    request: &CreateReceiptRequest,
    ctx: &GateContext,
    document_date: NaiveDate,
    lines: Vec<GoodsReceiptLine>,
    total: f64,
    fast_track_path: bool,
    regularization_required: bool,
    deadline: Option<NaiveDate>,
) -> GoodsReceipt {
    let mut base = BaseAggregate::new(GoodsReceiptId::new_v4(), String::new(), String::new());
    // Предупреждения гейтов сохраняются в документе
    if !ctx.warnings.is_empty() {
        base.comment = Some(ctx.warnings.join("; "));
    }

    GoodsReceipt {
        base,
        document_no: String::new(),
        document_date: document_date.format("%Y-%m-%d").to_string(),
        organization_id: request.organization_id.clone(),
        warehouse_id: request.warehouse_id.clone(),
        supplier_key: request.supplier_key.clone(),
        kind: request.kind,
        status: ReceiptStatus::Draft,
        // Сохраняется только проверенная ссылка: на вторичном пути
        // невалидное основание понижено до предупреждения и не хранится
        order_ref: ctx.order.as_ref().map(|o| o.to_string_id()),
        urgent: request.urgent,
        fast_track: fast_track_path,
        total_amount: total,
        regularization_required,
        regularization_deadline: deadline.map(|d| d.format("%Y-%m-%d").to_string()),
        reason: request.reason.clone(),
        created_by: request.principal.clone(),
        lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a006_goods_receipt::create::error::RejectCode;
    use crate::domain::a006_goods_receipt::create::test_support::{fixture, request_for};
    use contracts::domain::a005_purchase_order::aggregate::OrderState;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 5,
            base_delay_ms: 1,
            jitter_ms: 2,
        }
    }

    #[tokio::test]
    async fn test_next_number_skips_manual_subseries() {
        let fx = fixture();
        // хвост серии 00003 плюс ручная подсерия, которую скан игнорирует
        fx.seed_numbers(&[
            "REC-2026-00001",
            "REC-2026-00002",
            "REC-2026-00003",
            "REC-2026-QP-001",
        ]);
        let request = request_for(&fx);

        let created = create_receipt(&fx.store, &fast_retry(), &request)
            .await
            .unwrap();
        assert_eq!(created.receipt.document_no, "REC-2026-00004");
        assert_eq!(created.receipt.status, ReceiptStatus::Draft);
        assert!(created.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_first_number_in_empty_series() {
        let fx = fixture();
        let request = request_for(&fx);

        let created = create_receipt(&fx.store, &fast_retry(), &request)
            .await
            .unwrap();
        assert_eq!(created.receipt.document_no, "REC-2026-00001");
    }

    #[tokio::test]
    async fn test_retry_after_conflict_targets_larger_number() {
        let fx = fixture();
        fx.seed_numbers(&["REC-2026-00001", "REC-2026-00002", "REC-2026-00003"]);
        // первая попытка проигрывает гонку конкуренту
        fx.store.forced_conflicts.store(1, Ordering::SeqCst);
        let request = request_for(&fx);

        let created = create_receipt(&fx.store, &fast_retry(), &request)
            .await
            .unwrap();
        // вторая попытка со смещением 1 целится дальше хвоста серии
        assert_eq!(created.receipt.document_no, "REC-2026-00005");
        assert_eq!(fx.store.insert_attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_creations_get_unique_numbers() {
        let fx = fixture();
        let request = request_for(&fx);
        let store = Arc::new(fx.store);
        let retry = fast_retry();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            let retry = retry.clone();
            let request = request.clone();
            handles.push(tokio::spawn(async move {
                create_receipt(store.as_ref(), &retry, &request).await
            }));
        }

        // Каждый вызов либо получает уникальный номер, либо явно
        // исчерпывает повторы; молчаливых дубликатов не бывает
        let mut numbers = std::collections::HashSet::new();
        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(created) => {
                    successes += 1;
                    assert!(
                        numbers.insert(created.receipt.document_no.clone()),
                        "duplicate number {} handed out",
                        created.receipt.document_no
                    );
                }
                Err(CreateReceiptError::RetryExhausted { .. }) => {}
                Err(other) => panic!("unexpected error: {:?}", other),
            }
        }
        assert!(successes > 0);
        assert_eq!(store.committed.lock().unwrap().len(), successes);
        assert_eq!(numbers.len(), successes);
    }

    #[tokio::test]
    async fn test_scan_baseline_never_decreases_after_commit() {
        let fx = fixture();
        let request = request_for(&fx);
        let retry = fast_retry();

        for _ in 0..3 {
            let created = create_receipt(&fx.store, &retry, &request).await.unwrap();
            let assigned = crate::shared::numbering::parse_sequence(
                &created.receipt.document_no,
                "REC-2026-",
            )
            .unwrap();
            let baseline = fx
                .store
                .highest_sequence(&request.organization_id, "REC-2026-")
                .await
                .unwrap();
            assert!(baseline >= assigned);
        }
    }

    #[tokio::test]
    async fn test_policy_ceiling_rejects_before_any_write() {
        let fx = fixture();
        let mut request = request_for(&fx);
        request.fast_track = true;
        request.order_ref = None;
        // три строки по 5000: итог 15000 против потолка 10000
        let line = request.lines[0].clone();
        request.lines = vec![line.clone(), line.clone(), line];
        for l in &mut request.lines {
            l.qty_accepted = 5.0;
            l.qty_received = 5.0;
            l.unit_price = 1000.0;
        }

        let err = create_receipt(&fx.store, &fast_retry(), &request)
            .await
            .unwrap_err();
        match err {
            CreateReceiptError::PolicyViolation { violations, .. } => {
                assert_eq!(violations.len(), 1);
                assert!(violations[0].contains("fast-track ceiling"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        // ни транзакции, ни строк: цепочка оборвалась до хранилища
        assert_eq!(fx.store.insert_attempts.load(Ordering::SeqCst), 0);
        assert_eq!(fx.store.line_inserts.load(Ordering::SeqCst), 0);
        assert!(fx.store.committed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_gate_rejection_opens_no_transaction() {
        let mut fx = fixture();
        fx.store.suppliers[0].is_blocked = true;
        fx.store.suppliers[0].block_reason = Some("claims pending".into());
        let request = request_for(&fx);

        let err = create_receipt(&fx.store, &fast_retry(), &request)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CreateReceiptError::GateRejected {
                code: RejectCode::SupplierBlocked,
                ..
            }
        ));
        assert_eq!(fx.store.insert_attempts.load(Ordering::SeqCst), 0);
        assert_eq!(fx.store.line_inserts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invoice_sync_with_invalid_order_creates_without_enrichment() {
        let mut fx = fixture();
        let order_id = fx.add_order(OrderState::Draft, None);
        let mut request = request_for(&fx);
        request.order_ref = Some(order_id);
        request.trigger = contracts::domain::a006_goods_receipt::create::CreationTrigger::InvoiceSync;
        request.lines[0].internal_code = None;

        let created = create_receipt(&fx.store, &fast_retry(), &request)
            .await
            .unwrap();
        // предупреждение записано, ссылка на невалидный заказ не хранится
        assert_eq!(created.warnings.len(), 1);
        assert!(created.receipt.order_ref.is_none());
        // код пришёл из каталога, а не из заказа
        assert_eq!(
            created.receipt.lines[0].internal_code.as_deref(),
            Some("CAT-INT")
        );
        assert_eq!(created.receipt.base.comment.as_deref(), Some(created.warnings[0].as_str()));
    }

    #[tokio::test]
    async fn test_enrichment_prefers_order_line_over_catalog() {
        let mut fx = fixture();
        let order_id = fx.add_order(OrderState::Approved, None);
        let mut request = request_for(&fx);
        request.order_ref = Some(order_id.clone());
        request.lines[0].internal_code = None;
        request.lines[0].supplier_code = None;

        let created = create_receipt(&fx.store, &fast_retry(), &request)
            .await
            .unwrap();
        assert_eq!(created.receipt.order_ref.as_deref(), Some(order_id.as_str()));
        assert_eq!(
            created.receipt.lines[0].internal_code.as_deref(),
            Some("ORD-INT")
        );
        assert_eq!(
            created.receipt.lines[0].supplier_code.as_deref(),
            Some("ORD-SUP")
        );
    }

    #[tokio::test]
    async fn test_request_code_wins_over_order_and_catalog() {
        let mut fx = fixture();
        let order_id = fx.add_order(OrderState::Approved, None);
        let mut request = request_for(&fx);
        request.order_ref = Some(order_id);
        request.lines[0].internal_code = Some("REQ-INT".into());

        let created = create_receipt(&fx.store, &fast_retry(), &request)
            .await
            .unwrap();
        assert_eq!(
            created.receipt.lines[0].internal_code.as_deref(),
            Some("REQ-INT")
        );
    }

    #[tokio::test]
    async fn test_exhaustion_is_distinct_and_leaves_no_partials() {
        let fx = fixture();
        // каждая попытка проигрывает вставку
        fx.store
            .forced_conflicts
            .store(usize::MAX, Ordering::SeqCst);
        let request = request_for(&fx);

        let err = create_receipt(&fx.store, &fast_retry(), &request)
            .await
            .unwrap_err();
        match err {
            CreateReceiptError::RetryExhausted { attempts } => assert_eq!(attempts, 5),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(fx.store.insert_attempts.load(Ordering::SeqCst), 5);
        // ни одна из пяти попыток не оставила частичной записи
        assert!(fx.store.committed.lock().unwrap().is_empty());
        assert_eq!(fx.store.line_inserts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_ack_failure_does_not_fail_creation() {
        let mut fx = fixture();
        fx.store.fail_ack = true;
        let mut request = request_for(&fx);
        request.trigger = contracts::domain::a006_goods_receipt::create::CreationTrigger::InvoiceSync;
        request.source_invoice_ref = Some("inv-42".into());

        let created = create_receipt(&fx.store, &fast_retry(), &request)
            .await
            .unwrap();
        assert_eq!(created.receipt.document_no, "REC-2026-00001");
        assert_eq!(created.warnings.len(), 1);
        assert!(created.warnings[0].contains("inv-42"));
        assert_eq!(fx.store.committed.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ack_success_marks_source_record() {
        let fx = fixture();
        let mut request = request_for(&fx);
        request.source_invoice_ref = Some("inv-7".into());

        let created = create_receipt(&fx.store, &fast_retry(), &request)
            .await
            .unwrap();
        assert!(created.warnings.is_empty());
        assert_eq!(fx.store.acks.lock().unwrap().as_slice(), ["inv-7"]);
    }

    #[tokio::test]
    async fn test_fast_track_sets_policy_deadline_and_flag() {
        let fx = fixture();
        let mut request = request_for(&fx);
        request.fast_track = true;

        let created = create_receipt(&fx.store, &fast_retry(), &request)
            .await
            .unwrap();
        assert!(created.receipt.fast_track);
        assert!(created.receipt.regularization_required);
        // 2026-03-15 + 10 дней по политике
        assert_eq!(
            created.receipt.regularization_deadline.as_deref(),
            Some("2026-03-25")
        );
    }

    #[tokio::test]
    async fn test_urgent_with_order_sets_fixed_deadline_without_flag() {
        let mut fx = fixture();
        let order_id = fx.add_order(OrderState::Approved, None);
        let mut request = request_for(&fx);
        request.order_ref = Some(order_id);
        request.urgent = true;

        let created = create_receipt(&fx.store, &fast_retry(), &request)
            .await
            .unwrap();
        assert!(!created.receipt.fast_track);
        assert!(!created.receipt.regularization_required);
        // 2026-03-15 + фиксированные 30 дней
        assert_eq!(
            created.receipt.regularization_deadline.as_deref(),
            Some("2026-04-14")
        );
    }

    #[tokio::test]
    async fn test_totals_computed_from_accepted_quantities() {
        let fx = fixture();
        let mut request = request_for(&fx);
        request.lines[0].qty_received = 10.0;
        request.lines[0].qty_accepted = 8.0;
        request.lines[0].qty_rejected = 2.0;
        request.lines[0].unit_price = 25.0;

        let created = create_receipt(&fx.store, &fast_retry(), &request)
            .await
            .unwrap();
        assert_eq!(created.receipt.total_amount, 200.0);
        assert_eq!(created.receipt.lines[0].amount, 200.0);
    }

    #[tokio::test]
    async fn test_validation_rejects_empty_lines() {
        let fx = fixture();
        let mut request = request_for(&fx);
        request.lines.clear();

        let err = create_receipt(&fx.store, &fast_retry(), &request)
            .await
            .unwrap_err();
        assert!(matches!(err, CreateReceiptError::Validation(_)));
        assert_eq!(fx.store.insert_attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_validation_rejects_inconsistent_quantities() {
        let fx = fixture();
        let mut request = request_for(&fx);
        request.lines[0].qty_received = 5.0;
        request.lines[0].qty_accepted = 5.0;
        request.lines[0].qty_rejected = 1.0;

        let err = create_receipt(&fx.store, &fast_retry(), &request)
            .await
            .unwrap_err();
        assert!(matches!(err, CreateReceiptError::Validation(_)));
    }

    #[tokio::test]
    async fn test_number_space_exhaustion_is_fatal() {
        let fx = fixture();
        fx.seed_numbers(&["REC-2026-99999"]);
        let request = request_for(&fx);

        let err = create_receipt(&fx.store, &fast_retry(), &request)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CreateReceiptError::NumberSpaceExhausted { .. }
        ));
        // исчерпание разрядности не маскируется под исчерпание повторов
        assert_eq!(fx.store.insert_attempts.load(Ordering::SeqCst), 1);
    }
}
