use serde::{Deserialize, Serialize};

use super::aggregate::{GoodsReceipt, ReceiptKind};

/// Путь, которым пришёл запрос на создание документа.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreationTrigger {
    /// Основной путь: прямой запрос через API
    Direct,
    /// Вторичный путь: дозагрузка из входящего счёта поставщика.
    /// Требования к документу-основанию здесь мягче: невалидная ссылка
    /// понижается до предупреждения, документ создаётся без обогащения.
    InvoiceSync,
}

impl CreationTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            CreationTrigger::Direct => "direct",
            CreationTrigger::InvoiceSync => "invoice_sync",
        }
    }
}

impl Default for CreationTrigger {
    fn default() -> Self {
        CreationTrigger::Direct
    }
}

/// Входная строка документа приёмки
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptLineInput {
    pub nomenclature_key: String,

    #[serde(default)]
    pub qty_expected: f64,
    pub qty_received: f64,
    pub qty_accepted: f64,
    #[serde(default)]
    pub qty_rejected: f64,

    pub unit_price: f64,

    /// Код учёта, если задан явно в запросе
    #[serde(default)]
    pub internal_code: Option<String>,

    /// Код поставщика, если задан явно в запросе
    #[serde(default)]
    pub supplier_code: Option<String>,

    #[serde(default)]
    pub lot: Option<String>,

    #[serde(default)]
    pub expiry_date: Option<String>,
}

/// Запрос на создание приходной накладной
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReceiptRequest {
    pub organization_id: String,

    /// Кто создаёт документ
    pub principal: String,

    pub kind: ReceiptKind,

    /// Документ-основание (заказ поставщику), если есть
    #[serde(default)]
    pub order_ref: Option<String>,

    pub supplier_key: String,
    pub warehouse_id: String,

    /// Дата документа (YYYY-MM-DD); по умолчанию — сегодня
    #[serde(default)]
    pub document_date: Option<String>,

    #[serde(default)]
    pub urgent: bool,

    /// Явный запрос ускоренного пути
    #[serde(default)]
    pub fast_track: bool,

    #[serde(default)]
    pub trigger: CreationTrigger,

    /// Ссылка на запись входящего счёта во внешнем хранилище
    /// (подтверждается best-effort после фиксации документа)
    #[serde(default)]
    pub source_invoice_ref: Option<String>,

    /// Причина исключительного пути
    #[serde(default)]
    pub reason: Option<String>,

    pub lines: Vec<ReceiptLineInput>,
}

/// Результат успешного создания: сохранённый документ плюс
/// неблокирующие предупреждения, накопленные по пути.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedReceipt {
    pub receipt: GoodsReceipt,
    pub warnings: Vec<String>,
}
