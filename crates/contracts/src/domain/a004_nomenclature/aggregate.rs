use crate::domain::common::{AggregateId, AggregateRoot, BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ID Type
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NomenclatureId(pub Uuid);

impl NomenclatureId {
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

impl AggregateId for NomenclatureId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(NomenclatureId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Номенклатура — справочник товаров. Помимо описания хранит коды
/// по умолчанию, которыми дозаполняются строки документов, если код
/// не пришёл ни в запросе, ни из связанного заказа.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nomenclature {
    #[serde(flatten)]
    pub base: BaseAggregate<NomenclatureId>,

    /// Артикул
    pub article: String,

    /// Единица измерения ("шт", "кг", ...)
    pub unit: String,

    /// Группа справочника (папка)
    #[serde(rename = "isFolder", default)]
    pub is_folder: bool,

    #[serde(rename = "parentId")]
    pub parent_id: Option<String>,

    /// Код учёта по умолчанию (внутренний)
    #[serde(rename = "defaultInternalCode", default)]
    pub default_internal_code: String,

    /// Код товара в системе поставщика по умолчанию
    #[serde(rename = "defaultSupplierCode", default)]
    pub default_supplier_code: String,
}

impl Nomenclature {
    pub fn new_for_insert(
        code: String,
        description: String,
        article: String,
        unit: String,
        comment: Option<String>,
    ) -> Self {
        let mut base = BaseAggregate::new(NomenclatureId::new_v4(), code, description);
        base.comment = comment;

        Self {
            base,
            article,
            unit,
            is_folder: false,
            parent_id: None,
            default_internal_code: String::new(),
            default_supplier_code: String::new(),
        }
    }

    pub fn to_string_id(&self) -> String {
        self.base.id.as_string()
    }

    pub fn update(&mut self, dto: &NomenclatureDto) {
        self.base.code = dto.code.clone().unwrap_or_default();
        self.base.description = dto.description.clone();
        self.base.comment = dto.comment.clone();
        self.article = dto.article.clone();
        self.unit = dto.unit.clone();
        self.is_folder = dto.is_folder;
        self.parent_id = dto.parent_id.clone();
        self.default_internal_code = dto.default_internal_code.clone();
        self.default_supplier_code = dto.default_supplier_code.clone();
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.base.description.trim().is_empty() {
            return Err("Описание не может быть пустым".into());
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.base.touch();
    }
}

impl AggregateRoot for Nomenclature {
    type Id = NomenclatureId;

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
        "a004"
    }

    fn collection_name() -> &'static str {
        "nomenclature"
    }
}

// ============================================================================
// DTO
// ============================================================================

/// DTO для создания/обновления номенклатуры
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NomenclatureDto {
    pub id: Option<String>,
    pub code: Option<String>,
    pub description: String,
    pub article: String,
    pub unit: String,
    #[serde(rename = "isFolder", default)]
    pub is_folder: bool,
    #[serde(rename = "parentId")]
    pub parent_id: Option<String>,
    #[serde(rename = "defaultInternalCode", default)]
    pub default_internal_code: String,
    #[serde(rename = "defaultSupplierCode", default)]
    pub default_supplier_code: String,
    pub comment: Option<String>,
}
