//! Производные поля документа: суммы строк и итог, срок регуляризации,
//! дозаполнение кодов строк по явной цепочке приоритетов.

use chrono::NaiveDate;
use contracts::domain::a005_purchase_order::aggregate::PurchaseOrder;
use contracts::domain::a006_goods_receipt::aggregate::GoodsReceiptLine;
use contracts::domain::a006_goods_receipt::create::CreateReceiptRequest;
use contracts::domain::a007_receipt_policy::aggregate::ReceiptPolicy;

use super::store::ReceiptStore;

/// Фиксированный срок регуляризации для срочной приёмки вне
/// ускоренного пути, дней
pub const URGENT_REGULARIZATION_DAYS: i64 = 30;

/// Ускоренный путь: нет документа-основания, запрошена срочная или
/// ускоренная приёмка. Подпадает под потолки политики организации.
pub fn is_fast_track_path(request: &CreateReceiptRequest) -> bool {
    request.order_ref.is_none() && (request.fast_track || request.urgent)
}

/// Сумма строки: принятое количество × цена
pub fn line_amount(qty_accepted: f64, unit_price: f64) -> f64 {
    qty_accepted * unit_price
}

/// Итог по строкам. Чистая свёртка: повторный вызов на тех же строках
/// даёт тот же результат.
pub fn total_amount(lines: &[GoodsReceiptLine]) -> f64 {
    lines.iter().map(|l| l.amount).sum()
}

/// Явная цепочка приоритетов: первое непустое значение побеждает.
/// Пустые и пробельные строки кандидатами не считаются.
pub fn first_non_empty(candidates: &[Option<&str>]) -> Option<String> {
    candidates
        .iter()
        .flatten()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// Срок регуляризации: (флаг «подлежит регуляризации», срок).
///
/// Ускоренный путь — срок и флаг из политики организации; срочная
/// приёмка вне ускоренного пути — фиксированный срок без классификации.
pub fn regularization(
    policy: &ReceiptPolicy,
    fast_track_path: bool,
    urgent: bool,
    document_date: NaiveDate,
) -> (bool, Option<NaiveDate>) {
    if fast_track_path {
        let deadline = document_date + chrono::Duration::days(policy.fast_track_grace_days);
        return (true, Some(deadline));
    }
    if urgent {
        let deadline = document_date + chrono::Duration::days(URGENT_REGULARIZATION_DAYS);
        return (false, Some(deadline));
    }
    (false, None)
}

/// Построить строки документа из входных строк запроса.
///
/// Недостающие коды дозаполняются по приоритету: значение из запроса →
/// значение из совпавшей строки документа-основания → значение по
/// умолчанию из каталога по ссылке номенклатуры.
pub async fn enrich_lines(
    store: &dyn ReceiptStore,
    request: &CreateReceiptRequest,
    order: Option<&PurchaseOrder>,
) -> anyhow::Result<Vec<GoodsReceiptLine>> {
    let mut lines = Vec::with_capacity(request.lines.len());

    for (idx, input) in request.lines.iter().enumerate() {
        let order_line = order.and_then(|o| o.find_line(&input.nomenclature_key));
        let catalog = store.find_nomenclature(&input.nomenclature_key).await?;

        let internal_code = first_non_empty(&[
            input.internal_code.as_deref(),
            order_line.as_ref().and_then(|l| l.internal_code.as_deref()),
            catalog.as_ref().map(|n| n.default_internal_code.as_str()),
        ]);
        let supplier_code = first_non_empty(&[
            input.supplier_code.as_deref(),
            order_line.as_ref().and_then(|l| l.supplier_code.as_deref()),
            catalog.as_ref().map(|n| n.default_supplier_code.as_str()),
        ]);

        lines.push(GoodsReceiptLine {
            line_no: (idx + 1) as i32,
            nomenclature_key: input.nomenclature_key.clone(),
            qty_expected: input.qty_expected,
            qty_received: input.qty_received,
            qty_accepted: input.qty_accepted,
            qty_rejected: input.qty_rejected,
            unit_price: input.unit_price,
            amount: line_amount(input.qty_accepted, input.unit_price),
            internal_code,
            supplier_code,
            lot: input.lot.clone(),
            expiry_date: input.expiry_date.clone(),
        });
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(amount_qty: f64, price: f64) -> GoodsReceiptLine {
        GoodsReceiptLine {
            line_no: 1,
            nomenclature_key: "item".into(),
            qty_expected: amount_qty,
            qty_received: amount_qty,
            qty_accepted: amount_qty,
            qty_rejected: 0.0,
            unit_price: price,
            amount: line_amount(amount_qty, price),
            internal_code: None,
            supplier_code: None,
            lot: None,
            expiry_date: None,
        }
    }

    #[test]
    fn test_total_amount_is_idempotent() {
        let lines = vec![line(5.0, 100.0), line(2.5, 40.0), line(1.0, 0.99)];
        let first = total_amount(&lines);
        let second = total_amount(&lines);
        assert_eq!(first, second);
        assert_eq!(first, 5.0 * 100.0 + 2.5 * 40.0 + 0.99);
    }

    #[test]
    fn test_first_non_empty_precedence() {
        assert_eq!(
            first_non_empty(&[Some("req"), Some("order"), Some("catalog")]),
            Some("req".to_string())
        );
        assert_eq!(
            first_non_empty(&[None, Some("order"), Some("catalog")]),
            Some("order".to_string())
        );
        assert_eq!(
            first_non_empty(&[None, None, Some("catalog")]),
            Some("catalog".to_string())
        );
        assert_eq!(first_non_empty(&[None, None, None]), None);
    }

    #[test]
    fn test_first_non_empty_skips_blank_values() {
        // пустая строка из запроса не должна затенять значение заказа
        assert_eq!(
            first_non_empty(&[Some(""), Some("order"), None]),
            Some("order".to_string())
        );
        assert_eq!(
            first_non_empty(&[Some("   "), Some(""), Some("catalog")]),
            Some("catalog".to_string())
        );
    }

    #[test]
    fn test_regularization_fast_track_uses_policy() {
        let policy = ReceiptPolicy::default_for("org");
        let date = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        let (required, deadline) = regularization(&policy, true, false, date);
        assert!(required);
        assert_eq!(
            deadline,
            Some(date + chrono::Duration::days(policy.fast_track_grace_days))
        );
    }

    #[test]
    fn test_regularization_urgent_only_uses_fixed_offset() {
        let policy = ReceiptPolicy::default_for("org");
        let date = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        let (required, deadline) = regularization(&policy, false, true, date);
        assert!(!required, "urgent without fast-track carries no status flag");
        assert_eq!(
            deadline,
            Some(date + chrono::Duration::days(URGENT_REGULARIZATION_DAYS))
        );
    }

    #[test]
    fn test_regularization_fast_track_wins_over_urgent() {
        let policy = ReceiptPolicy::default_for("org");
        let date = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        let (required, deadline) = regularization(&policy, true, true, date);
        assert!(required);
        assert_eq!(
            deadline,
            Some(date + chrono::Duration::days(policy.fast_track_grace_days))
        );
    }

    #[test]
    fn test_regularization_absent_on_normal_path() {
        let policy = ReceiptPolicy::default_for("org");
        let date = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        assert_eq!(regularization(&policy, false, false, date), (false, None));
    }
}
