pub mod aggregate;
pub mod create;

pub use aggregate::{
    GoodsReceipt, GoodsReceiptId, GoodsReceiptLine, ReceiptKind, ReceiptStatus,
};
pub use create::{CreateReceiptRequest, CreatedReceipt, CreationTrigger, ReceiptLineInput};
