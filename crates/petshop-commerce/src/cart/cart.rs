//! The cart aggregate.

use crate::cart::CartItem;
use crate::catalog::Product;
use crate::error::CommerceError;
use crate::ids::{CartId, CartItemId, ProductId, UserId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Maximum quantity allowed per line item.
pub const MAX_QUANTITY_PER_ITEM: i64 = 999;

/// A user's shopping cart.
///
/// `total_price` and `total_quantity` are derived from the current items
/// and recomputed by every mutation; nothing outside this aggregate sets
/// them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    /// Unique cart identifier.
    pub id: CartId,
    /// Owning user (carts are 1:1 with users).
    pub user_id: UserId,
    /// Items in the cart.
    pub items: Vec<CartItem>,
    /// Derived: sum of item subtotals.
    pub total_price: Money,
    /// Derived: sum of item quantities.
    pub total_quantity: i64,
    /// Applied coupon code, if any.
    pub coupon_code: Option<String>,
    /// Discount amount for the applied coupon.
    pub discount: Money,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Cart {
    /// Create an empty cart for a user.
    pub fn new(user_id: UserId) -> Self {
        Self {
            id: CartId::generate(),
            user_id,
            items: Vec::new(),
            total_price: Money::zero(Currency::VND),
            total_quantity: 0,
            coupon_code: None,
            discount: Money::zero(Currency::VND),
            updated_at: crate::current_timestamp(),
        }
    }

    /// Check if the cart has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get an item by ID.
    pub fn get_item(&self, item_id: &CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.id == item_id)
    }

    /// Quantity of a product already in the cart (0 when absent).
    pub fn quantity_of(&self, product_id: &ProductId) -> i64 {
        self.items
            .iter()
            .find(|i| &i.product_id == product_id)
            .map(|i| i.quantity)
            .unwrap_or(0)
    }

    /// Add a product, merging with an existing line for the same product.
    ///
    /// Stock availability must already be checked against the merged
    /// quantity by the caller; this only mutates the aggregate. The price
    /// snapshot of a merged line is refreshed.
    pub fn upsert_item(
        &mut self,
        product: &Product,
        quantity: i64,
    ) -> Result<CartItemId, CommerceError> {
        if quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }

        let id = if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.product_id == product.id)
        {
            let merged = existing
                .quantity
                .checked_add(quantity)
                .ok_or(CommerceError::Overflow)?;
            if merged > MAX_QUANTITY_PER_ITEM {
                return Err(CommerceError::InvalidQuantity(merged));
            }
            existing.quantity = merged;
            existing.refresh_snapshot(product)?;
            existing.id.clone()
        } else {
            if quantity > MAX_QUANTITY_PER_ITEM {
                return Err(CommerceError::InvalidQuantity(quantity));
            }
            let item = CartItem::new(product, quantity)?;
            let id = item.id.clone();
            self.items.push(item);
            id
        };

        self.recompute_totals()?;
        Ok(id)
    }

    /// Set the quantity of an existing item, refreshing its price
    /// snapshot from the live product.
    pub fn set_item_quantity(
        &mut self,
        item_id: &CartItemId,
        product: &Product,
        quantity: i64,
    ) -> Result<(), CommerceError> {
        if quantity <= 0 || quantity > MAX_QUANTITY_PER_ITEM {
            return Err(CommerceError::InvalidQuantity(quantity));
        }

        let item = self
            .items
            .iter_mut()
            .find(|i| &i.id == item_id)
            .ok_or_else(|| CommerceError::ItemNotInCart(item_id.to_string()))?;

        item.quantity = quantity;
        item.refresh_snapshot(product)?;
        self.recompute_totals()
    }

    /// Remove an item. Returns an error when the item is not present.
    pub fn remove_item(&mut self, item_id: &CartItemId) -> Result<(), CommerceError> {
        let len_before = self.items.len();
        self.items.retain(|i| &i.id != item_id);
        if self.items.len() == len_before {
            return Err(CommerceError::ItemNotInCart(item_id.to_string()));
        }
        self.recompute_totals()
    }

    /// Clear all items, the applied coupon, and the discount.
    pub fn clear(&mut self) {
        self.items.clear();
        self.coupon_code = None;
        self.discount = Money::zero(self.total_price.currency);
        self.total_price = Money::zero(self.total_price.currency);
        self.total_quantity = 0;
        self.updated_at = crate::current_timestamp();
    }

    /// Record a validated coupon on the cart.
    pub fn set_coupon(&mut self, code: impl Into<String>, discount: Money) {
        self.coupon_code = Some(code.into());
        self.discount = discount;
        self.updated_at = crate::current_timestamp();
    }

    /// Recompute the derived totals from the current items.
    fn recompute_totals(&mut self) -> Result<(), CommerceError> {
        let currency = self.total_price.currency;
        self.total_price = Money::try_sum(self.items.iter().map(|i| &i.subtotal), currency)
            .ok_or(CommerceError::Overflow)?;
        self.total_quantity = self.items.iter().map(|i| i.quantity).sum();
        self.updated_at = crate::current_timestamp();
        Ok(())
    }
}

/// Snapshot view of a cart with shipping applied, for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartSummary {
    /// Total item count.
    pub total_items: i64,
    /// Sum of item subtotals.
    pub subtotal: Money,
    /// Discount from the applied coupon.
    pub discount: Money,
    /// Applied coupon code.
    pub coupon_code: Option<String>,
    /// Shipping fee under the current policy.
    pub shipping_fee: Money,
    /// subtotal − discount + shipping fee.
    pub total: Money,
    /// True when any item's quantity exceeds current stock.
    pub has_out_of_stock_items: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, price: i64) -> Product {
        Product::new(name, format!("SKU-{name}"), Money::vnd(price), 50)
    }

    fn totals_invariant(cart: &Cart) {
        let expected_price: i64 = cart.items.iter().map(|i| i.subtotal.amount).sum();
        let expected_qty: i64 = cart.items.iter().map(|i| i.quantity).sum();
        assert_eq!(cart.total_price.amount, expected_price);
        assert_eq!(cart.total_quantity, expected_qty);
    }

    #[test]
    fn test_upsert_new_item() {
        let mut cart = Cart::new(UserId::new("u1"));
        cart.upsert_item(&product("a", 100_000), 2).unwrap();

        assert_eq!(cart.total_quantity, 2);
        assert_eq!(cart.total_price, Money::vnd(200_000));
        totals_invariant(&cart);
    }

    #[test]
    fn test_upsert_merges_same_product() {
        let mut cart = Cart::new(UserId::new("u1"));
        let p = product("a", 100_000);
        cart.upsert_item(&p, 1).unwrap();
        cart.upsert_item(&p, 2).unwrap();

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.total_quantity, 3);
        totals_invariant(&cart);
    }

    #[test]
    fn test_merge_refreshes_snapshot() {
        let mut cart = Cart::new(UserId::new("u1"));
        let mut p = product("a", 100_000);
        cart.upsert_item(&p, 1).unwrap();

        p.price = Money::vnd(80_000);
        cart.upsert_item(&p, 1).unwrap();

        // Both units now priced at the refreshed snapshot.
        assert_eq!(cart.total_price, Money::vnd(160_000));
        totals_invariant(&cart);
    }

    #[test]
    fn test_set_quantity_recomputes_totals() {
        let mut cart = Cart::new(UserId::new("u1"));
        let p = product("a", 100_000);
        let item_id = cart.upsert_item(&p, 1).unwrap();

        cart.set_item_quantity(&item_id, &p, 5).unwrap();
        assert_eq!(cart.total_price, Money::vnd(500_000));
        totals_invariant(&cart);
    }

    #[test]
    fn test_remove_item() {
        let mut cart = Cart::new(UserId::new("u1"));
        let id_a = cart.upsert_item(&product("a", 100_000), 2).unwrap();
        cart.upsert_item(&product("b", 50_000), 1).unwrap();

        cart.remove_item(&id_a).unwrap();
        assert_eq!(cart.total_price, Money::vnd(50_000));
        totals_invariant(&cart);
    }

    #[test]
    fn test_remove_missing_item_fails() {
        let mut cart = Cart::new(UserId::new("u1"));
        let err = cart.remove_item(&CartItemId::new("nope")).unwrap_err();
        assert!(matches!(err, CommerceError::ItemNotInCart(_)));
    }

    #[test]
    fn test_clear_drops_coupon_and_discount() {
        let mut cart = Cart::new(UserId::new("u1"));
        cart.upsert_item(&product("a", 100_000), 2).unwrap();
        cart.set_coupon("SALE10", Money::vnd(20_000));

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.coupon_code, None);
        assert!(cart.discount.is_zero());
        assert!(cart.total_price.is_zero());
        assert_eq!(cart.total_quantity, 0);
    }

    #[test]
    fn test_invalid_quantity_rejected() {
        let mut cart = Cart::new(UserId::new("u1"));
        let p = product("a", 100_000);
        assert!(cart.upsert_item(&p, 0).is_err());
        assert!(cart.upsert_item(&p, -3).is_err());
        assert!(cart.upsert_item(&p, MAX_QUANTITY_PER_ITEM + 1).is_err());
    }
}
