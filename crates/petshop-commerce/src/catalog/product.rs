//! Product types.

use crate::ids::{CategoryId, ProductId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Whether a product can be sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ProductStatus {
    /// Available for purchase.
    #[default]
    Active,
    /// Discontinued; cannot be added to carts or ordered.
    Inactive,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::Inactive => "inactive",
        }
    }
}

/// A product in the catalog.
///
/// The commerce core treats products as collaborator data: catalog CRUD
/// lives elsewhere, but stock and sold counts are owned by the inventory
/// ledger and mutated only inside its transactions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Stock-keeping unit.
    pub sku: String,
    /// Primary image URL.
    pub image: Option<String>,
    /// Regular price.
    pub price: Money,
    /// Sale price; only counts as "on sale" when positive and below `price`.
    pub sale_price: Option<Money>,
    /// Units in stock. Never negative.
    pub stock: i64,
    /// Units sold to date.
    pub sold_quantity: i64,
    /// Whether the product can be sold.
    pub status: ProductStatus,
    /// Owning category.
    pub category_id: Option<CategoryId>,
}

impl Product {
    /// Create a product with the given price and stock.
    pub fn new(name: impl Into<String>, sku: impl Into<String>, price: Money, stock: i64) -> Self {
        Self {
            id: ProductId::generate(),
            name: name.into(),
            sku: sku.into(),
            image: None,
            price,
            sale_price: None,
            stock,
            sold_quantity: 0,
            status: ProductStatus::Active,
            category_id: None,
        }
    }

    /// Check if the product is available for sale.
    pub fn is_active(&self) -> bool {
        self.status == ProductStatus::Active
    }

    /// The price a buyer pays right now: the sale price when set and
    /// positive, otherwise the regular price.
    pub fn effective_price(&self) -> Money {
        match self.sale_price {
            Some(sale) if sale.is_positive() => sale,
            _ => self.price,
        }
    }

    /// Check if the product is on sale (positive sale price below the
    /// regular price).
    pub fn is_on_sale(&self) -> bool {
        matches!(self.sale_price, Some(sale) if sale.is_positive() && sale < self.price)
    }
}
