//! Transactional backend for the PetShop commerce core.
//!
//! [`MemoryStore`] holds the whole shop state behind one mutex with a
//! clone-and-commit [`MemoryStore::transaction`] boundary; the services
//! wrap the domain types from `petshop-commerce` in atomic operations:
//!
//! - [`CartService`]: stock-checked cart mutations and coupon apply
//! - [`PromotionEngine`]: promotion admin, validation, redemption
//! - [`CheckoutService`]: the cart-to-order orchestration
//! - [`OrderService`]: lifecycle transitions, stock release on cancel
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use petshop_backend::{CartService, CheckoutService, PlaceOrderRequest};
//! use petshop_commerce::prelude::*;
//!
//! let store = Arc::new(petshop_backend::MemoryStore::new());
//! let mut user_id = UserId::new("");
//! let mut product_id = ProductId::new("");
//! store.seed(|state| {
//!     user_id = state.insert_user(User::new("Lan"));
//!     product_id = state.insert_product(Product::new(
//!         "Dog Collar",
//!         "DC-01",
//!         Money::vnd(80_000),
//!         20,
//!     ));
//! });
//!
//! let carts = CartService::new(Arc::clone(&store));
//! carts.add_item(&user_id, &product_id, 2).unwrap();
//!
//! let checkout = CheckoutService::new(Arc::clone(&store));
//! let order = checkout
//!     .place_order(
//!         &user_id,
//!         PlaceOrderRequest {
//!             receiver_name: Some("Lan".into()),
//!             receiver_phone: Some("0900000000".into()),
//!             shipping_address: Some("1 Le Loi, Da Nang".into()),
//!             ..PlaceOrderRequest::default()
//!         },
//!     )
//!     .unwrap();
//! assert_eq!(order.total_amount, Money::vnd(190_000));
//! ```

pub mod cart;
pub mod checkout;
pub mod order;
pub mod promotion;
pub mod store;

pub use cart::CartService;
pub use checkout::{CheckoutService, PlaceOrderRequest};
pub use order::{Actor, OrderService, OrderTracking};
pub use promotion::PromotionEngine;
pub use store::{MemoryStore, ProductStore, StoreState, UserStore};

/// Get current Unix timestamp in seconds.
pub(crate) fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
