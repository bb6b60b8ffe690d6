pub mod aggregate;

pub use aggregate::{ReceiptPolicy, ReceiptPolicyDto};
