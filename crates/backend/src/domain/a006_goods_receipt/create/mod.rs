//! Движок создания приходной накладной.
//!
//! Порядок обработки запроса:
//! 1. валидация полей запроса;
//! 2. цепочка бизнес-проверок (гейтов) — до открытия транзакции,
//!    первый отказ останавливает цепочку без каких-либо записей;
//! 3. расчёт производных полей (суммы, срок регуляризации,
//!    дозаполнение кодов строк);
//! 4. ограниченные попытки атомарной вставки: скан серии внутри
//!    транзакции, номер-кандидат со смещением попытки, шапка и строки
//!    одной транзакцией; конфликт номера — единственная причина повтора;
//! 5. best-effort подтверждение источника после фиксации.
//!
//! Рабочие процессы не делят изменяемое состояние: корректность
//! обеспечивает только уникальный индекс номера в хранилище.

pub mod calc;
pub mod engine;
pub mod error;
pub mod gates;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use engine::create_receipt;
pub use error::{CreateReceiptError, RejectCode};
pub use store::{InsertAttempt, ReceiptStore, SqlReceiptStore};

/// Префикс серии номеров приходных накладных
pub const RECEIPT_SERIES_PREFIX: &str = "REC";
