//! Checkout module.
//!
//! Contains the order record, its status state machine, and the
//! shipping-fee policy.

mod order;
mod shipping;

pub use order::{
    Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus, StatusHistoryEntry,
};
pub use shipping::{FlatRateShipping, ShippingPolicy};
