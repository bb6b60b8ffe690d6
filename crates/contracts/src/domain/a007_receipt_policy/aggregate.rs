use serde::{Deserialize, Serialize};

/// Политика приёмки организации (агрегат a007).
///
/// Ограничивает ускоренный путь (приёмка без документа-основания):
/// потолки сумм, порог предупреждения и срок регуляризации.
/// Хранится одной строкой на организацию; при отсутствии строки
/// действуют значения по умолчанию.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReceiptPolicy {
    pub organization_id: String,

    /// Потолок итоговой суммы документа на ускоренном пути
    pub fast_track_total_ceiling: f64,

    /// Потолок суммы одной строки на ускоренном пути
    pub fast_track_line_ceiling: f64,

    /// Порог предупреждения: сумма выше него (но в пределах потолка)
    /// не блокирует создание, а попадает в предупреждения документа
    pub fast_track_warn_threshold: f64,

    /// Срок регуляризации для ускоренного пути, дней
    pub fast_track_grace_days: i64,
}

impl ReceiptPolicy {
    pub fn default_for(organization_id: &str) -> Self {
        Self {
            organization_id: organization_id.to_string(),
            fast_track_total_ceiling: 10_000.0,
            fast_track_line_ceiling: 5_000.0,
            fast_track_warn_threshold: 8_000.0,
            fast_track_grace_days: 10,
        }
    }
}

/// DTO для чтения/записи политики организации
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptPolicyDto {
    #[serde(rename = "fastTrackTotalCeiling")]
    pub fast_track_total_ceiling: f64,
    #[serde(rename = "fastTrackLineCeiling")]
    pub fast_track_line_ceiling: f64,
    #[serde(rename = "fastTrackWarnThreshold")]
    pub fast_track_warn_threshold: f64,
    #[serde(rename = "fastTrackGraceDays")]
    pub fast_track_grace_days: i64,
}
