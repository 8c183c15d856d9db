//! Commerce error types.
//!
//! Every variant's display string is a human-readable reason suitable
//! for returning to the caller directly.

use thiserror::Error;

/// Errors that can occur in commerce operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommerceError {
    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Promotion not found.
    #[error("Promotion not found: {0}")]
    PromotionNotFound(String),

    /// Address not found.
    #[error("Address not found: {0}")]
    AddressNotFound(String),

    /// User not found.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Item not in cart.
    #[error("Item not in cart: {0}")]
    ItemNotInCart(String),

    /// The cart has no items to check out.
    #[error("Cart is empty")]
    EmptyCart,

    /// Not enough stock to satisfy the requested quantity.
    #[error("Insufficient stock for {product}: requested {requested}, available {available}")]
    InsufficientStock {
        product: String,
        requested: i64,
        available: i64,
    },

    /// Product is no longer sold.
    #[error("Product is no longer available: {0}")]
    ProductInactive(String),

    /// Invalid quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Invalid order status transition.
    #[error("Order cannot move from {from} to {to}")]
    InvalidOrderTransition { from: String, to: String },

    /// Coupon code already exists.
    #[error("Coupon code already exists: {0}")]
    DuplicateCouponCode(String),

    /// Coupon failed validation; carries the validation message.
    #[error("{0}")]
    CouponRejected(String),

    /// Percentage discount value outside [1, 100].
    #[error("Percentage discount must be between 1 and 100, got {0}")]
    InvalidPercentage(u32),

    /// Checkout request carried neither a stored address nor complete
    /// inline receiver fields.
    #[error("Receiver name, phone, and shipping address are required")]
    IncompleteReceiver,

    /// Caller does not own the resource.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Arithmetic overflow in a money calculation.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,
}
