use crate::domain::common::{AggregateId, AggregateRoot, BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ID Type
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GoodsReceiptId(pub Uuid);

impl GoodsReceiptId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }

    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for GoodsReceiptId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(GoodsReceiptId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Перечисления
// ============================================================================

/// Вид приходной накладной
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptKind {
    /// Закупка у поставщика
    Purchase,
    /// Внутреннее перемещение (без риска контрагента)
    InternalTransfer,
}

impl ReceiptKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReceiptKind::Purchase => "purchase",
            ReceiptKind::InternalTransfer => "internal_transfer",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "purchase" => Some(ReceiptKind::Purchase),
            "internal_transfer" => Some(ReceiptKind::InternalTransfer),
            _ => None,
        }
    }
}

/// Статус документа приёмки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStatus {
    /// Начальный статус каждого созданного документа
    Draft,
    Posted,
}

impl ReceiptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReceiptStatus::Draft => "draft",
            ReceiptStatus::Posted => "posted",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(ReceiptStatus::Draft),
            "posted" => Some(ReceiptStatus::Posted),
            _ => None,
        }
    }
}

// ============================================================================
// Строка документа
// ============================================================================

/// Строка табличной части «Товары» приходной накладной.
/// Хранится отдельной таблицей и существует только вместе с шапкой.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoodsReceiptLine {
    /// Порядковый номер строки в документе (с 1)
    pub line_no: i32,

    /// Ссылка на номенклатуру (a004)
    pub nomenclature_key: String,

    /// Ожидалось по заказу
    pub qty_expected: f64,

    /// Фактически поступило
    pub qty_received: f64,

    /// Принято на склад
    pub qty_accepted: f64,

    /// Отклонено (брак, расхождения)
    pub qty_rejected: f64,

    /// Цена за единицу
    pub unit_price: f64,

    /// Сумма строки: принятое количество × цена
    pub amount: f64,

    /// Код учёта (внутренний)
    #[serde(default)]
    pub internal_code: Option<String>,

    /// Код товара в системе поставщика
    #[serde(default)]
    pub supplier_code: Option<String>,

    /// Партия
    #[serde(default)]
    pub lot: Option<String>,

    /// Срок годности (YYYY-MM-DD)
    #[serde(default)]
    pub expiry_date: Option<String>,
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Документ Приходная накладная (агрегат a006).
///
/// Номер документа (`document_no`) выдаётся движком создания: он уникален
/// в пределах (организация, год) и защищён уникальным индексом в БД.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoodsReceipt {
    #[serde(flatten)]
    pub base: BaseAggregate<GoodsReceiptId>,

    /// Номер документа (напр. "REC-2026-00004")
    pub document_no: String,

    /// Дата документа (YYYY-MM-DD)
    pub document_date: String,

    /// Организация-владелец (серия номеров ведётся в её пределах)
    pub organization_id: String,

    /// Склад приёмки (ссылка на a002)
    pub warehouse_id: String,

    /// Поставщик (ссылка на a003)
    pub supplier_key: String,

    /// Вид накладной
    pub kind: ReceiptKind,

    /// Статус документа
    pub status: ReceiptStatus,

    /// Документ-основание (ссылка на a005), если приёмка по заказу
    pub order_ref: Option<String>,

    /// Срочная приёмка
    pub urgent: bool,

    /// Ускоренный путь (без документа-основания, под лимиты политики)
    pub fast_track: bool,

    /// Итоговая сумма по принятым строкам
    pub total_amount: f64,

    /// Документ подлежит регуляризации (ускоренный путь)
    pub regularization_required: bool,

    /// Срок регуляризации (YYYY-MM-DD), если назначен
    pub regularization_deadline: Option<String>,

    /// Причина исключительного пути (срочность/ускоренная приёмка)
    pub reason: Option<String>,

    /// Кто создал документ
    pub created_by: String,

    /// Табличная часть «Товары»
    pub lines: Vec<GoodsReceiptLine>,
}

impl GoodsReceipt {
    pub fn to_string_id(&self) -> String {
        self.base.id.as_string()
    }

    /// Сумма по строкам (пересчёт без побочных эффектов)
    pub fn lines_total(&self) -> f64 {
        self.lines.iter().map(|l| l.amount).sum()
    }
}

impl AggregateRoot for GoodsReceipt {
    type Id = GoodsReceiptId;

    fn id(&self) -> Self::Id {
        self.base.id
    }

    fn code(&self) -> &str {
        &self.base.code
    }

    fn description(&self) -> &str {
        &self.base.description
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.base.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.base.metadata
    }

    fn aggregate_index() -> &'static str {
        "a006"
    }

    fn collection_name() -> &'static str {
        "goods_receipt"
    }
}
