use crate::domain::common::{AggregateId, AggregateRoot, BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ID Type
// ============================================================================

/// Уникальный идентификатор поставщика
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SupplierId(pub Uuid);

impl SupplierId {
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

impl AggregateId for SupplierId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(SupplierId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Поставщик (контрагент). Заблокированный поставщик не проходит
/// проверку допуска при создании документов закупки.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    #[serde(flatten)]
    pub base: BaseAggregate<SupplierId>,

    pub inn: String,
    pub kpp: String,

    /// Блокировка работы с поставщиком
    #[serde(rename = "isBlocked", default)]
    pub is_blocked: bool,

    /// Причина блокировки (заполняется при is_blocked = true)
    #[serde(rename = "blockReason")]
    pub block_reason: Option<String>,
}

impl Supplier {
    pub fn new_for_insert(
        code: String,
        description: String,
        inn: String,
        kpp: String,
        comment: Option<String>,
    ) -> Self {
        let mut base = BaseAggregate::new(SupplierId::new_v4(), code, description);
        base.comment = comment;

        Self {
            base,
            inn,
            kpp,
            is_blocked: false,
            block_reason: None,
        }
    }

    pub fn to_string_id(&self) -> String {
        self.base.id.as_string()
    }

    pub fn update(&mut self, dto: &SupplierDto) {
        self.base.code = dto.code.clone().unwrap_or_default();
        self.base.description = dto.description.clone();
        self.base.comment = dto.comment.clone();
        self.inn = dto.inn.clone();
        self.kpp = dto.kpp.clone();
        self.is_blocked = dto.is_blocked;
        self.block_reason = dto.block_reason.clone();
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.base.description.trim().is_empty() {
            return Err("Описание не может быть пустым".into());
        }
        if self.is_blocked && self.block_reason.as_deref().unwrap_or("").trim().is_empty() {
            return Err("Не указана причина блокировки".into());
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.base.touch();
    }
}

impl AggregateRoot for Supplier {
    type Id = SupplierId;

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
        "a003"
    }

    fn collection_name() -> &'static str {
        "supplier"
    }
}

// ============================================================================
// DTO
// ============================================================================

/// DTO для создания/обновления поставщика
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierDto {
    pub id: Option<String>,
    pub code: Option<String>,
    pub description: String,
    pub inn: String,
    pub kpp: String,
    #[serde(rename = "isBlocked", default)]
    pub is_blocked: bool,
    #[serde(rename = "blockReason")]
    pub block_reason: Option<String>,
    pub comment: Option<String>,
}
