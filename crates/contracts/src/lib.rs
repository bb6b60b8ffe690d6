//! Общие контракты домена: агрегаты, DTO и типы, разделяемые
//! между backend и внешними потребителями API.

pub mod domain;
pub mod shared;
