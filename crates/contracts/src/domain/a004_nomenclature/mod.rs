pub mod aggregate;

pub use aggregate::{Nomenclature, NomenclatureDto, NomenclatureId};
