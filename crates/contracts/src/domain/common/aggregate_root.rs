use super::EntityMetadata;

/// Трейт для корня агрегата
///
/// Определяет обязательные методы и метаданные для всех агрегатов системы
pub trait AggregateRoot {
    /// Тип идентификатора агрегата
    type Id;

    /// Получить ID записи
    fn id(&self) -> Self::Id;

    /// Получить бизнес-код записи
    fn code(&self) -> &str;

    /// Получить описание/название записи
    fn description(&self) -> &str;

    /// Получить метаданные жизненного цикла
    fn metadata(&self) -> &EntityMetadata;

    /// Получить изменяемые метаданные
    fn metadata_mut(&mut self) -> &mut EntityMetadata;

    /// Индекс агрегата в системе (например, "a006")
    fn aggregate_index() -> &'static str;

    /// Имя коллекции для БД (например, "goods_receipt")
    fn collection_name() -> &'static str;

    /// Полное имя агрегата (например, "a006_goods_receipt").
    /// Используется как имя таблицы и как entity_kind в аудите.
    fn full_name() -> String {
        format!("{}_{}", Self::aggregate_index(), Self::collection_name())
    }
}
