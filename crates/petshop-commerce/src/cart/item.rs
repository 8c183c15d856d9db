//! Cart line items with price snapshots.

use crate::catalog::Product;
use crate::error::CommerceError;
use crate::ids::{CartItemId, ProductId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// A line item in a cart.
///
/// Prices are a snapshot taken when the item was added or last touched,
/// never a live reference to the product, so displayed prices can drift
/// from the catalog until the item is mutated again.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    /// Unique line item identifier.
    pub id: CartItemId,
    /// Product being purchased.
    pub product_id: ProductId,
    /// Product name (denormalized for display).
    pub product_name: String,
    /// SKU (denormalized for display).
    pub sku: String,
    /// Image URL (denormalized for display).
    pub image: Option<String>,
    /// Quantity.
    pub quantity: i64,
    /// Regular price at snapshot time.
    pub price_at_time: Money,
    /// Sale price at snapshot time, if any.
    pub sale_price_at_time: Option<Money>,
    /// Derived: effective price × quantity.
    pub subtotal: Money,
    /// Unix timestamp when the item was added.
    pub added_at: i64,
}

impl CartItem {
    /// Create a new line item with a fresh price snapshot.
    pub fn new(product: &Product, quantity: i64) -> Result<Self, CommerceError> {
        let mut item = Self {
            id: CartItemId::generate(),
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            sku: product.sku.clone(),
            image: product.image.clone(),
            quantity,
            price_at_time: product.price,
            sale_price_at_time: product.sale_price,
            subtotal: Money::zero(product.price.currency),
            added_at: crate::current_timestamp(),
        };
        item.recalculate_subtotal()?;
        Ok(item)
    }

    /// The price this item is charged at: the snapshotted sale price when
    /// set and positive, otherwise the snapshotted regular price.
    pub fn effective_price(&self) -> Money {
        match self.sale_price_at_time {
            Some(sale) if sale.is_positive() => sale,
            _ => self.price_at_time,
        }
    }

    /// Refresh the price snapshot from the live product. Quantity is
    /// untouched.
    pub fn refresh_snapshot(&mut self, product: &Product) -> Result<(), CommerceError> {
        self.price_at_time = product.price;
        self.sale_price_at_time = product.sale_price;
        self.recalculate_subtotal()
    }

    /// Recompute `subtotal` from the effective price and quantity.
    pub fn recalculate_subtotal(&mut self) -> Result<(), CommerceError> {
        self.subtotal = self
            .effective_price()
            .try_multiply(self.quantity)
            .ok_or(CommerceError::Overflow)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: i64, sale: Option<i64>) -> Product {
        let mut p = Product::new("Dog Food 2kg", "DF-2K", Money::vnd(price), 20);
        p.sale_price = sale.map(Money::vnd);
        p
    }

    #[test]
    fn test_snapshot_captured_at_creation() {
        let p = product(120_000, Some(99_000));
        let item = CartItem::new(&p, 2).unwrap();
        assert_eq!(item.price_at_time, Money::vnd(120_000));
        assert_eq!(item.sale_price_at_time, Some(Money::vnd(99_000)));
        assert_eq!(item.subtotal, Money::vnd(198_000));
    }

    #[test]
    fn test_snapshot_survives_product_price_change() {
        let mut p = product(120_000, None);
        let item = CartItem::new(&p, 1).unwrap();

        p.price = Money::vnd(150_000);
        // Untouched item keeps the old price.
        assert_eq!(item.effective_price(), Money::vnd(120_000));
    }

    #[test]
    fn test_refresh_snapshot_picks_up_new_prices() {
        let mut p = product(120_000, None);
        let mut item = CartItem::new(&p, 3).unwrap();

        p.price = Money::vnd(100_000);
        item.refresh_snapshot(&p).unwrap();
        assert_eq!(item.effective_price(), Money::vnd(100_000));
        assert_eq!(item.subtotal, Money::vnd(300_000));
    }

    #[test]
    fn test_zero_sale_price_falls_back_to_regular() {
        let p = product(120_000, Some(0));
        let item = CartItem::new(&p, 1).unwrap();
        assert_eq!(item.effective_price(), Money::vnd(120_000));
    }
}
