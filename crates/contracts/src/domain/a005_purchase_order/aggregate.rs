use crate::domain::common::{AggregateId, AggregateRoot, BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ID Type
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PurchaseOrderId(pub Uuid);

impl PurchaseOrderId {
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

impl AggregateId for PurchaseOrderId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(PurchaseOrderId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Состояние заказа
// ============================================================================

/// Состояние жизненного цикла заказа поставщику
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    Draft,
    Approved,
    PartiallyReceived,
    Received,
    Closed,
    Cancelled,
}

impl OrderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::Draft => "draft",
            OrderState::Approved => "approved",
            OrderState::PartiallyReceived => "partially_received",
            OrderState::Received => "received",
            OrderState::Closed => "closed",
            OrderState::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(OrderState::Draft),
            "approved" => Some(OrderState::Approved),
            "partially_received" => Some(OrderState::PartiallyReceived),
            "received" => Some(OrderState::Received),
            "closed" => Some(OrderState::Closed),
            "cancelled" => Some(OrderState::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Строка заказа
// ============================================================================

/// Строка табличной части «Товары» заказа поставщику
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PurchaseOrderLine {
    /// Ссылка на номенклатуру (a004)
    pub nomenclature_key: String,

    /// Заказанное количество
    pub quantity: f64,

    /// Цена
    pub unit_price: f64,

    /// Код учёта (внутренний), если согласован в заказе
    #[serde(default)]
    pub internal_code: Option<String>,

    /// Код товара в системе поставщика, если согласован в заказе
    #[serde(default)]
    pub supplier_code: Option<String>,
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Документ Заказ поставщику (агрегат a005). Служит документом-основанием
/// для приходных накладных: из его строк дозаполняются коды строк приёмки.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrder {
    #[serde(flatten)]
    pub base: BaseAggregate<PurchaseOrderId>,

    /// Номер документа (напр. "ORD-2026-00012")
    pub document_no: String,

    /// Дата документа (YYYY-MM-DD)
    pub document_date: String,

    /// Организация-владелец
    pub organization_id: String,

    /// Поставщик (ссылка на a003)
    pub supplier_key: String,

    /// Состояние жизненного цикла
    pub state: OrderState,

    /// JSON-массив строк табличной части
    pub lines_json: Option<String>,
}

impl PurchaseOrder {
    pub fn new_for_insert(
        document_no: String,
        document_date: String,
        organization_id: String,
        supplier_key: String,
        state: OrderState,
        lines: Vec<PurchaseOrderLine>,
    ) -> Self {
        let lines_json = if lines.is_empty() {
            None
        } else {
            serde_json::to_string(&lines).ok()
        };

        let description = format!("{} от {}", document_no, document_date);
        let base = BaseAggregate::new(
            PurchaseOrderId::new_v4(),
            document_no.clone(),
            description,
        );

        Self {
            base,
            document_no,
            document_date,
            organization_id,
            supplier_key,
            state,
            lines_json,
        }
    }

    pub fn to_string_id(&self) -> String {
        self.base.id.as_string()
    }

    /// Десериализовать lines_json в вектор строк
    pub fn parse_lines(&self) -> Vec<PurchaseOrderLine> {
        self.lines_json
            .as_deref()
            .and_then(|s| serde_json::from_str(s).ok())
            .unwrap_or_default()
    }

    /// Найти строку заказа по номенклатуре
    pub fn find_line(&self, nomenclature_key: &str) -> Option<PurchaseOrderLine> {
        self.parse_lines()
            .into_iter()
            .find(|l| l.nomenclature_key == nomenclature_key)
    }
}

impl AggregateRoot for PurchaseOrder {
    type Id = PurchaseOrderId;

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
        "a005"
    }

    fn collection_name() -> &'static str {
        "purchase_order"
    }
}
