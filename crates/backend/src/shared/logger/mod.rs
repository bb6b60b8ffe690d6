pub mod repository;

use contracts::shared::audit::AuditLink;
use repository::{audit_event_internal, log_event_internal};

/// Логирование события на сервере
///
/// # Примеры
/// ```
/// logger::log("startup", "Сервер запущен");
/// logger::log("creation", "Создан документ REC-2026-00004");
/// ```
pub fn log(category: &str, message: &str) {
    log_event_internal("server", category, message);
}

/// Запись аудита о создании/изменении бизнес-сущности.
/// Пишется fire-and-forget: приёмник аудита не влияет на исход операции.
pub fn audit(
    entity_kind: &str,
    entity_id: &str,
    organization_id: &str,
    principal: &str,
    status: &str,
    links: Vec<AuditLink>,
    message: &str,
) {
    audit_event_internal(
        entity_kind,
        entity_id,
        organization_id,
        principal,
        status,
        links,
        message,
    );
}
