use serde::{Deserialize, Serialize};

/// Ссылка на связанную сущность в записи аудита
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditLink {
    /// Полное имя агрегата (напр. "a005_purchase_order")
    pub entity_kind: String,
    pub entity_id: String,
}

/// Запись аудита о создании/изменении бизнес-сущности
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: String,

    /// Полное имя агрегата (напр. "a006_goods_receipt")
    pub entity_kind: String,
    pub entity_id: String,

    pub organization_id: String,

    /// Кто выполнил операцию
    pub principal: String,

    /// Статус сущности на момент записи (напр. "draft")
    pub status: String,

    /// Связанные сущности (документ-основание, входящий счёт)
    pub links: Vec<AuditLink>,

    pub message: String,
}
