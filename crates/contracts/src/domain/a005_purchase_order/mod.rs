pub mod aggregate;

pub use aggregate::{OrderState, PurchaseOrder, PurchaseOrderId, PurchaseOrderLine};
