//! Checkout orchestration: cart to order in one atomic step.

use std::sync::Arc;

use petshop_commerce::prelude::*;
use serde::{Deserialize, Serialize};

use crate::promotion::{redeem_in_state, validate_in_state, ValidatedCoupon};
use crate::store::{MemoryStore, ProductStore, StoreState, UserStore};

/// Everything the checkout needs beyond the cart itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    /// Coupon to apply; takes precedence over a coupon already attached
    /// to the cart.
    pub coupon_code: Option<String>,
    /// Saved address to ship to. When absent, the inline receiver
    /// fields below are required.
    pub address_id: Option<AddressId>,
    pub receiver_name: Option<String>,
    pub receiver_phone: Option<String>,
    pub shipping_address: Option<String>,
}

/// Runs the whole place-order sequence inside one store transaction, so
/// pricing, order creation, stock reservation, coupon redemption, and
/// cart clearing all happen or none do.
pub struct CheckoutService {
    store: Arc<MemoryStore>,
    shipping: Box<dyn ShippingPolicy + Send + Sync>,
}

impl CheckoutService {
    /// Checkout with the shop's standard flat-rate shipping rule.
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self::with_shipping(store, FlatRateShipping::default())
    }

    pub fn with_shipping(
        store: Arc<MemoryStore>,
        shipping: impl ShippingPolicy + Send + Sync + 'static,
    ) -> Self {
        Self {
            store,
            shipping: Box::new(shipping),
        }
    }

    /// Turn the user's cart into a PENDING order.
    pub fn place_order(
        &self,
        user_id: &UserId,
        request: PlaceOrderRequest,
    ) -> Result<Order, CommerceError> {
        let shipping = self.shipping.as_ref();
        let order = self
            .store
            .transaction(|state| place_order_in_state(state, user_id, request, shipping))?;
        tracing::info!(
            order = %order.order_code,
            user = %user_id,
            total = %order.total_amount,
            "order placed"
        );
        Ok(order)
    }
}

fn place_order_in_state(
    state: &mut StoreState,
    user_id: &UserId,
    request: PlaceOrderRequest,
    shipping: &dyn ShippingPolicy,
) -> Result<Order, CommerceError> {
    let cart = match state.cart(user_id) {
        Some(cart) if !cart.is_empty() => cart.clone(),
        _ => return Err(CommerceError::EmptyCart),
    };

    // every line must be satisfiable before anything is written
    for item in &cart.items {
        let product = state.find_product(&item.product_id)?;
        if !product.is_active() {
            return Err(CommerceError::ProductInactive(product.name.clone()));
        }
        if product.stock < item.quantity {
            return Err(CommerceError::InsufficientStock {
                product: product.name.clone(),
                requested: item.quantity,
                available: product.stock,
            });
        }
    }

    let receiver = resolve_receiver(state, user_id, &request)?;

    let subtotal = cart.total_price;
    let shipping_fee = shipping.fee(subtotal);

    // At this stage a failing coupon is dropped with a warning rather
    // than blocking the purchase.
    let coupon_code = request
        .coupon_code
        .clone()
        .or_else(|| cart.coupon_code.clone());
    let mut applied: Option<ValidatedCoupon> = None;
    if let Some(code) = coupon_code {
        match validate_in_state(state, &code, subtotal, Some(user_id)) {
            Ok(coupon) => applied = Some(coupon),
            Err(rejection) => {
                tracing::warn!(
                    coupon = %code,
                    user = %user_id,
                    reason = %rejection,
                    "coupon dropped at checkout"
                );
            }
        }
    }
    let discount = applied
        .as_ref()
        .map(|c| c.discount)
        .unwrap_or_else(|| Money::zero(subtotal.currency));

    let mut order = Order::new(user_id.clone(), receiver, request.payment_method);
    order.notes = request.notes;
    order.subtotal = subtotal;
    order.shipping_fee = shipping_fee;
    order.discount = discount;
    order.coupon_code = applied.as_ref().map(|c| c.coupon_code.clone());
    for item in &cart.items {
        let product = state.find_product(&item.product_id)?;
        order.items.push(OrderItem::new(product, item.quantity)?);
    }
    order.calculate_total_amount()?;

    for item in &order.items {
        state.decrement_stock(&item.product_id, item.quantity)?;
    }

    if let Some(coupon) = &applied {
        redeem_in_state(
            state,
            &coupon.coupon_code,
            user_id,
            &order.id,
            coupon.discount,
            subtotal,
        );
    }

    // the cart record survives, emptied for the next visit
    if let Some(cart) = state.cart_mut(user_id) {
        cart.clear();
    }

    state.insert_order(order.clone());
    Ok(order)
}

fn resolve_receiver(
    state: &StoreState,
    user_id: &UserId,
    request: &PlaceOrderRequest,
) -> Result<Receiver, CommerceError> {
    if let Some(address_id) = &request.address_id {
        let address = state.address(address_id)?;
        if &address.user_id != user_id {
            return Err(CommerceError::Forbidden(
                "address belongs to another customer".to_string(),
            ));
        }
        let user = state.find_user(user_id)?;
        return Ok(Receiver::from_address(address, user));
    }

    match (
        &request.receiver_name,
        &request.receiver_phone,
        &request.shipping_address,
    ) {
        (Some(name), Some(phone), Some(address)) => Ok(Receiver {
            name: name.clone(),
            phone: phone.clone(),
            shipping_address: address.clone(),
        }),
        _ => Err(CommerceError::IncompleteReceiver),
    }
}
