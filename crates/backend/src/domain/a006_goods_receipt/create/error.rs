use serde::Serialize;
use thiserror::Error;

/// Машиночитаемый код отказа бизнес-проверки (стабилен для UI)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectCode {
    WarehouseUnavailable,
    SupplierNotFound,
    SupplierBlocked,
    OrderNotFound,
    OrderStateInvalid,
    SupplierMismatch,
}

impl RejectCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectCode::WarehouseUnavailable => "warehouse_unavailable",
            RejectCode::SupplierNotFound => "supplier_not_found",
            RejectCode::SupplierBlocked => "supplier_blocked",
            RejectCode::OrderNotFound => "order_not_found",
            RejectCode::OrderStateInvalid => "order_state_invalid",
            RejectCode::SupplierMismatch => "supplier_mismatch",
        }
    }
}

impl std::fmt::Display for RejectCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ошибки создания документа.
///
/// Классифицируются вызывающим без разбора текста: отказ гейта несёт
/// стабильный код, нарушение политики — список правил, исчерпание
/// повторов отделено от прочих ошибок хранилища.
#[derive(Debug, Error)]
pub enum CreateReceiptError {
    /// Запрос не прошёл первичную валидацию (исправляется вызывающим)
    #[error("invalid request: {0}")]
    Validation(String),

    /// Терминальный отказ бизнес-проверки, повтор не выполняется
    #[error("creation rejected ({code}): {reason}")]
    GateRejected { code: RejectCode, reason: String },

    /// Нарушение политики ускоренной приёмки: список нарушенных правил
    /// плюс неблокирующие предупреждения, накопленные к этому моменту
    #[error("fast-track policy violated: {}", violations.join("; "))]
    PolicyViolation {
        violations: Vec<String>,
        warnings: Vec<String>,
    },

    /// Кандидат не помещается в фиксированную ширину суффикса серии
    #[error("document number space exhausted for series {prefix}")]
    NumberSpaceExhausted { prefix: String },

    /// Конфликты номера не прекратились за отведённые попытки
    #[error("could not allocate document number after {attempts} attempts")]
    RetryExhausted { attempts: u32 },

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}
