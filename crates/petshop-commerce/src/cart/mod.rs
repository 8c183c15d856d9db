//! Shopping cart module.
//!
//! Contains the cart aggregate, snapshot-priced items, and the summary
//! view.

mod cart;
mod item;

pub use cart::{Cart, CartSummary, MAX_QUANTITY_PER_ITEM};
pub use item::CartItem;
