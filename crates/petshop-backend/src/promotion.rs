//! Promotion engine: promotion admin, coupon validation, redemption.

use std::sync::Arc;

use petshop_commerce::prelude::*;

use crate::store::{MemoryStore, StoreState};

/// A coupon that passed every validation check, with the computed
/// discount and the canonical code the redemption step needs.
#[derive(Debug, Clone)]
pub(crate) struct ValidatedCoupon {
    pub coupon_code: String,
    pub discount: Money,
}

/// Run the full ordered validation against the state: existence first,
/// then the promotion's own checks with this customer's facts.
/// `user_id` is None for anonymous validation, which skips the
/// user-scoped checks.
pub(crate) fn validate_in_state(
    state: &StoreState,
    code: &str,
    order_amount: Money,
    user_id: Option<&UserId>,
) -> Result<ValidatedCoupon, CouponRejection> {
    let promotion = state
        .promotion_by_code(code)
        .ok_or(CouponRejection::NotFound)?;
    let facts = user_id.map(|u| state.customer_facts(&promotion.id, u));
    let discount = promotion.validate_at(crate::current_timestamp(), order_amount, facts.as_ref())?;
    Ok(ValidatedCoupon {
        coupon_code: promotion.coupon_code.clone(),
        discount,
    })
}

/// Record a successful redemption: bump the promotion's used count and
/// append the audit row. An order that already exists must not be undone
/// by a redemption hiccup, so an unknown code is logged and dropped.
pub(crate) fn redeem_in_state(
    state: &mut StoreState,
    code: &str,
    user_id: &UserId,
    order_id: &OrderId,
    discount: Money,
    order_amount: Money,
) {
    match state.promotion_by_code_mut(code) {
        Some(promotion) => {
            promotion.increment_usage();
            let promotion_id = promotion.id.clone();
            state.push_usage(PromotionUsage::new(
                promotion_id,
                user_id.clone(),
                order_id.clone(),
                discount,
                order_amount,
            ));
        }
        None => {
            tracing::warn!(
                coupon = code,
                order = %order_id,
                "redemption skipped, promotion no longer exists"
            );
        }
    }
}

/// Service wrapping promotion management and coupon checks in store
/// transactions.
pub struct PromotionEngine {
    store: Arc<MemoryStore>,
}

impl PromotionEngine {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    /// Register a promotion. Coupon codes are unique across all
    /// promotions, live or not.
    pub fn create_promotion(&self, promotion: Promotion) -> Result<Promotion, CommerceError> {
        self.store.transaction(|state| {
            if state.promotion_by_code(&promotion.coupon_code).is_some() {
                return Err(CommerceError::DuplicateCouponCode(
                    promotion.coupon_code.clone(),
                ));
            }
            state.insert_promotion(promotion.clone());
            Ok(promotion)
        })
    }

    /// Flip a promotion on or off.
    pub fn toggle_status(&self, id: &PromotionId) -> Result<Promotion, CommerceError> {
        self.store.transaction(|state| {
            let promotion = state.promotion_mut(id)?;
            promotion.status = !promotion.status;
            Ok(promotion.clone())
        })
    }

    /// Read-only validation shaped for an API response. Rejections come
    /// back as an invalid result carrying the reason, never an error.
    pub fn validate_coupon(
        &self,
        code: &str,
        order_amount: Money,
        user_id: Option<&UserId>,
    ) -> CouponValidation {
        self.store.read(|state| {
            let promotion = match state.promotion_by_code(code) {
                Some(p) => p,
                None => return CouponValidation::invalid(&CouponRejection::NotFound),
            };
            let facts = user_id.map(|u| state.customer_facts(&promotion.id, u));
            match promotion.validate_at(crate::current_timestamp(), order_amount, facts.as_ref()) {
                Ok(discount) => CouponValidation::valid(promotion, discount),
                Err(rejection) => CouponValidation::invalid(&rejection),
            }
        })
    }

    /// Record a redemption for an order that was already placed. A
    /// failure here is swallowed so the order stands.
    pub fn redeem(
        &self,
        code: &str,
        user_id: &UserId,
        order_id: &OrderId,
        discount: Money,
        order_amount: Money,
    ) -> Result<(), CommerceError> {
        self.store.transaction(|state| {
            redeem_in_state(state, code, user_id, order_id, discount, order_amount);
            Ok(())
        })
    }
}
