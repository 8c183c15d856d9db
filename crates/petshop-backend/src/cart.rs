//! Cart service: stock-checked cart mutations and coupon apply.

use std::sync::Arc;

use petshop_commerce::prelude::*;

use crate::promotion::validate_in_state;
use crate::store::{MemoryStore, ProductStore};

/// Wraps per-user cart mutations in store transactions, checking live
/// stock and product status before the aggregate is touched.
pub struct CartService {
    store: Arc<MemoryStore>,
}

impl CartService {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    /// Fetch the user's cart, creating an empty one on first access.
    pub fn get_cart(&self, user_id: &UserId) -> Result<Cart, CommerceError> {
        self.store
            .transaction(|state| Ok(state.cart_or_create(user_id)?.clone()))
    }

    /// Add a product to the cart, merging quantities when a line for it
    /// already exists. Stock is checked against the merged quantity, so
    /// a cart can never hold more of a product than the shop has.
    pub fn add_item(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<Cart, CommerceError> {
        self.store.transaction(|state| {
            let product = state.find_product(product_id)?.clone();
            if !product.is_active() {
                return Err(CommerceError::ProductInactive(product.name.clone()));
            }

            let in_cart = state
                .cart(user_id)
                .map(|c| c.quantity_of(product_id))
                .unwrap_or(0);
            let merged = in_cart
                .checked_add(quantity)
                .ok_or(CommerceError::Overflow)?;
            if quantity > 0 && merged > product.stock {
                return Err(CommerceError::InsufficientStock {
                    product: product.name.clone(),
                    requested: merged,
                    available: product.stock,
                });
            }

            let cart = state.cart_or_create(user_id)?;
            cart.upsert_item(&product, quantity)?;
            Ok(cart.clone())
        })
    }

    /// Set the quantity of an existing cart line, refreshing its price
    /// snapshot from the live product.
    pub fn update_item(
        &self,
        user_id: &UserId,
        item_id: &CartItemId,
        quantity: i64,
    ) -> Result<Cart, CommerceError> {
        self.store.transaction(|state| {
            let product_id = state
                .cart(user_id)
                .and_then(|c| c.get_item(item_id))
                .map(|i| i.product_id.clone())
                .ok_or_else(|| CommerceError::ItemNotInCart(item_id.to_string()))?;

            let product = state.find_product(&product_id)?.clone();
            if !product.is_active() {
                return Err(CommerceError::ProductInactive(product.name.clone()));
            }
            if quantity > product.stock {
                return Err(CommerceError::InsufficientStock {
                    product: product.name.clone(),
                    requested: quantity,
                    available: product.stock,
                });
            }

            let cart = state.cart_or_create(user_id)?;
            cart.set_item_quantity(item_id, &product, quantity)?;
            Ok(cart.clone())
        })
    }

    pub fn remove_item(
        &self,
        user_id: &UserId,
        item_id: &CartItemId,
    ) -> Result<Cart, CommerceError> {
        self.store.transaction(|state| {
            let cart = state
                .cart_mut(user_id)
                .ok_or_else(|| CommerceError::ItemNotInCart(item_id.to_string()))?;
            cart.remove_item(item_id)?;
            Ok(cart.clone())
        })
    }

    /// Empty the cart in place. The cart record itself survives.
    pub fn clear(&self, user_id: &UserId) -> Result<(), CommerceError> {
        self.store.transaction(|state| {
            if let Some(cart) = state.cart_mut(user_id) {
                cart.clear();
            }
            Ok(())
        })
    }

    /// Validate a coupon against the cart's current subtotal and attach
    /// it. Strict: a failing check is returned to the caller instead of
    /// being dropped.
    pub fn apply_coupon(&self, user_id: &UserId, code: &str) -> Result<Cart, CommerceError> {
        self.store.transaction(|state| {
            let subtotal = state.cart_or_create(user_id)?.total_price;
            match validate_in_state(state, code, subtotal, Some(user_id)) {
                Ok(coupon) => {
                    let cart = state.cart_or_create(user_id)?;
                    cart.set_coupon(coupon.coupon_code, coupon.discount);
                    Ok(cart.clone())
                }
                Err(rejection) => Err(CommerceError::CouponRejected(rejection.to_string())),
            }
        })
    }

    /// Display snapshot of the cart with the shipping fee applied and
    /// each line re-checked against live stock.
    pub fn summary(
        &self,
        user_id: &UserId,
        shipping: &dyn ShippingPolicy,
    ) -> Result<CartSummary, CommerceError> {
        self.store.read(|state| {
            let cart = match state.cart(user_id) {
                Some(cart) => cart,
                None => return Ok(empty_summary()),
            };

            let shipping_fee = if cart.is_empty() {
                Money::zero(cart.total_price.currency)
            } else {
                shipping.fee(cart.total_price)
            };
            let total = cart
                .total_price
                .try_subtract(&cart.discount)
                .and_then(|t| t.try_add(&shipping_fee))
                .ok_or(CommerceError::Overflow)?;
            let has_out_of_stock_items = cart.items.iter().any(|item| {
                state
                    .find_product(&item.product_id)
                    .map(|p| !p.is_active() || p.stock < item.quantity)
                    .unwrap_or(true)
            });

            Ok(CartSummary {
                total_items: cart.total_quantity,
                subtotal: cart.total_price,
                discount: cart.discount,
                coupon_code: cart.coupon_code.clone(),
                shipping_fee,
                total,
                has_out_of_stock_items,
            })
        })
    }
}

fn empty_summary() -> CartSummary {
    CartSummary {
        total_items: 0,
        subtotal: Money::default(),
        discount: Money::default(),
        coupon_code: None,
        shipping_fee: Money::default(),
        total: Money::default(),
        has_out_of_stock_items: false,
    }
}
