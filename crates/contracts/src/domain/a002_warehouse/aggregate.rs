use crate::domain::common::{AggregateId, AggregateRoot, BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ID Type
// ============================================================================

/// Уникальный идентификатор склада
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WarehouseId(pub Uuid);

impl WarehouseId {
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

impl AggregateId for WarehouseId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(WarehouseId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Склад — место приёмки товаров. Приёмка возможна только на активный
/// склад своей организации.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warehouse {
    #[serde(flatten)]
    pub base: BaseAggregate<WarehouseId>,

    /// Организация-владелец склада
    #[serde(rename = "organizationId")]
    pub organization_id: String,

    pub address: String,

    /// Неактивный склад не принимает новые документы
    #[serde(rename = "isActive", default)]
    pub is_active: bool,
}

impl Warehouse {
    pub fn new_for_insert(
        code: String,
        description: String,
        organization_id: String,
        address: String,
        comment: Option<String>,
    ) -> Self {
        let mut base = BaseAggregate::new(WarehouseId::new_v4(), code, description);
        base.comment = comment;

        Self {
            base,
            organization_id,
            address,
            is_active: true,
        }
    }

    pub fn to_string_id(&self) -> String {
        self.base.id.as_string()
    }

    pub fn update(&mut self, dto: &WarehouseDto) {
        self.base.code = dto.code.clone().unwrap_or_default();
        self.base.description = dto.description.clone();
        self.base.comment = dto.comment.clone();
        self.organization_id = dto.organization_id.clone();
        self.address = dto.address.clone();
        self.is_active = dto.is_active;
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.base.description.trim().is_empty() {
            return Err("Описание не может быть пустым".into());
        }
        if self.organization_id.trim().is_empty() {
            return Err("Не указана организация".into());
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.base.touch();
    }
}

impl AggregateRoot for Warehouse {
    type Id = WarehouseId;

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
        "a002"
    }

    fn collection_name() -> &'static str {
        "warehouse"
    }
}

// ============================================================================
// DTO
// ============================================================================

/// DTO для создания/обновления склада
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseDto {
    pub id: Option<String>,
    pub code: Option<String>,
    pub description: String,
    #[serde(rename = "organizationId")]
    pub organization_id: String,
    pub address: String,
    #[serde(rename = "isActive", default = "default_true")]
    pub is_active: bool,
    pub comment: Option<String>,
}

fn default_true() -> bool {
    true
}
