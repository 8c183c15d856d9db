//! The shop's complete in-memory state.

use std::collections::HashMap;

use petshop_commerce::prelude::*;

use super::contracts::{ProductStore, UserStore};

/// Every record the backend persists, keyed for the lookups the
/// services perform. Cloning the whole state is what makes the
/// transaction boundary in [`MemoryStore`](super::MemoryStore) cheap to
/// express.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    products: HashMap<ProductId, Product>,
    users: HashMap<UserId, User>,
    addresses: HashMap<AddressId, Address>,
    carts: HashMap<UserId, Cart>,
    orders: HashMap<OrderId, Order>,
    promotions: HashMap<PromotionId, Promotion>,
    usages: Vec<PromotionUsage>,
}

impl StoreState {
    pub fn insert_product(&mut self, product: Product) -> ProductId {
        let id = product.id.clone();
        self.products.insert(id.clone(), product);
        id
    }

    pub fn insert_user(&mut self, user: User) -> UserId {
        let id = user.id.clone();
        self.users.insert(id.clone(), user);
        id
    }

    pub fn insert_address(&mut self, address: Address) -> AddressId {
        let id = address.id.clone();
        self.addresses.insert(id.clone(), address);
        id
    }

    pub fn insert_promotion(&mut self, promotion: Promotion) -> PromotionId {
        let id = promotion.id.clone();
        self.promotions.insert(id.clone(), promotion);
        id
    }

    pub fn product_mut(&mut self, id: &ProductId) -> Result<&mut Product, CommerceError> {
        self.products
            .get_mut(id)
            .ok_or_else(|| CommerceError::ProductNotFound(id.to_string()))
    }

    pub fn address(&self, id: &AddressId) -> Result<&Address, CommerceError> {
        self.addresses
            .get(id)
            .ok_or_else(|| CommerceError::AddressNotFound(id.to_string()))
    }

    // -- carts ---------------------------------------------------------

    pub fn cart(&self, user_id: &UserId) -> Option<&Cart> {
        self.carts.get(user_id)
    }

    pub fn cart_mut(&mut self, user_id: &UserId) -> Option<&mut Cart> {
        self.carts.get_mut(user_id)
    }

    /// Fetch the user's cart, creating an empty one on first access.
    /// The user must exist.
    pub fn cart_or_create(&mut self, user_id: &UserId) -> Result<&mut Cart, CommerceError> {
        if !self.users.contains_key(user_id) {
            return Err(CommerceError::UserNotFound(user_id.to_string()));
        }
        Ok(self
            .carts
            .entry(user_id.clone())
            .or_insert_with(|| Cart::new(user_id.clone())))
    }

    // -- orders --------------------------------------------------------

    pub fn insert_order(&mut self, order: Order) {
        self.orders.insert(order.id.clone(), order);
    }

    pub fn order(&self, id: &OrderId) -> Result<&Order, CommerceError> {
        self.orders
            .get(id)
            .ok_or_else(|| CommerceError::OrderNotFound(id.to_string()))
    }

    pub fn order_mut(&mut self, id: &OrderId) -> Result<&mut Order, CommerceError> {
        self.orders
            .get_mut(id)
            .ok_or_else(|| CommerceError::OrderNotFound(id.to_string()))
    }

    pub fn order_by_code(&self, code: &str) -> Result<&Order, CommerceError> {
        self.orders
            .values()
            .find(|o| o.order_code == code)
            .ok_or_else(|| CommerceError::OrderNotFound(code.to_string()))
    }

    /// All orders of one user, newest first.
    pub fn orders_for_user(&self, user_id: &UserId) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .orders
            .values()
            .filter(|o| &o.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.ordered_at.cmp(&a.ordered_at));
        orders
    }

    // -- promotions ----------------------------------------------------

    pub fn promotion_mut(&mut self, id: &PromotionId) -> Result<&mut Promotion, CommerceError> {
        self.promotions
            .get_mut(id)
            .ok_or_else(|| CommerceError::PromotionNotFound(id.to_string()))
    }

    /// Look up a promotion by coupon code. Codes are stored uppercased,
    /// so the lookup is case-insensitive.
    pub fn promotion_by_code(&self, code: &str) -> Option<&Promotion> {
        let code = code.to_uppercase();
        self.promotions.values().find(|p| p.coupon_code == code)
    }

    pub fn promotion_by_code_mut(&mut self, code: &str) -> Option<&mut Promotion> {
        let code = code.to_uppercase();
        self.promotions.values_mut().find(|p| p.coupon_code == code)
    }

    pub fn push_usage(&mut self, usage: PromotionUsage) {
        self.usages.push(usage);
    }

    /// Every usage row counts against the per-customer limit, whatever
    /// became of the order it was tied to.
    pub fn usage_count(&self, promotion_id: &PromotionId, user_id: &UserId) -> i64 {
        self.usages
            .iter()
            .filter(|u| &u.promotion_id == promotion_id && &u.user_id == user_id)
            .count() as i64
    }

    pub fn usages_for(&self, promotion_id: &PromotionId) -> Vec<PromotionUsage> {
        self.usages
            .iter()
            .filter(|u| &u.promotion_id == promotion_id)
            .cloned()
            .collect()
    }

    /// The user-scoped inputs of coupon validation.
    pub fn customer_facts(&self, promotion_id: &PromotionId, user_id: &UserId) -> CustomerFacts {
        CustomerFacts {
            has_completed_orders: self.has_completed_orders(user_id),
            usage_count: self.usage_count(promotion_id, user_id),
        }
    }
}

impl ProductStore for StoreState {
    fn find_product(&self, id: &ProductId) -> Result<&Product, CommerceError> {
        self.products
            .get(id)
            .ok_or_else(|| CommerceError::ProductNotFound(id.to_string()))
    }

    fn decrement_stock(&mut self, id: &ProductId, quantity: i64) -> Result<(), CommerceError> {
        let product = self.product_mut(id)?;
        if !product.is_active() {
            return Err(CommerceError::ProductInactive(product.name.clone()));
        }
        if product.stock < quantity {
            return Err(CommerceError::InsufficientStock {
                product: product.name.clone(),
                requested: quantity,
                available: product.stock,
            });
        }
        product.stock -= quantity;
        product.sold_quantity += quantity;
        Ok(())
    }

    fn increment_stock(&mut self, id: &ProductId, quantity: i64) {
        if let Some(product) = self.products.get_mut(id) {
            product.stock += quantity;
            product.sold_quantity = (product.sold_quantity - quantity).max(0);
        }
    }
}

impl UserStore for StoreState {
    fn find_user(&self, id: &UserId) -> Result<&User, CommerceError> {
        self.users
            .get(id)
            .ok_or_else(|| CommerceError::UserNotFound(id.to_string()))
    }

    fn has_completed_orders(&self, id: &UserId) -> bool {
        self.orders
            .values()
            .any(|o| &o.user_id == id && o.status == OrderStatus::Completed)
    }
}
