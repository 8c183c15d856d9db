//! E-commerce domain types and logic for the PetShop backend.
//!
//! This crate holds the pure business core, with no storage and no HTTP:
//!
//! - **Catalog**: products with regular/sale pricing and stock counts
//! - **Cart**: a per-user aggregate of snapshot-priced line items
//! - **Promotion**: coupon validation rules and discount calculation
//! - **Checkout**: the order record and its status state machine
//!
//! Persistence and the service layer wrapping these types in atomic
//! transactions live in `petshop-backend`.
//!
//! # Example
//!
//! ```rust
//! use petshop_commerce::prelude::*;
//!
//! let product = Product::new("Royal Canin 2kg", "RC-2K", Money::vnd(350_000), 10);
//!
//! let mut cart = Cart::new(UserId::new("user-1"));
//! cart.upsert_item(&product, 2).unwrap();
//! assert_eq!(cart.total_price, Money::vnd(700_000));
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod customer;
pub mod promotion;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Get current Unix timestamp in seconds.
pub(crate) fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{Product, ProductStatus};

    // Customer
    pub use crate::customer::{Address, Receiver, User};

    // Cart
    pub use crate::cart::{Cart, CartItem, CartSummary};

    // Promotion
    pub use crate::promotion::{
        CouponRejection, CouponValidation, CustomerFacts, DiscountValue, Promotion,
        PromotionUsage,
    };

    // Checkout
    pub use crate::checkout::{
        FlatRateShipping, Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus,
        ShippingPolicy, StatusHistoryEntry,
    };
}
