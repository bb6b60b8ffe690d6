pub mod common;

pub mod a001_organization;
pub mod a002_warehouse;
pub mod a003_supplier;
pub mod a004_nomenclature;
pub mod a005_purchase_order;
pub mod a006_goods_receipt;
pub mod a007_receipt_policy;
