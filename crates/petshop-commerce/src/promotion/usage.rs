//! Promotion redemption audit rows.

use crate::ids::{OrderId, PromotionId, PromotionUsageId, UserId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// One successful coupon redemption: created exactly once per order that
/// applies a coupon, and counted against per-customer limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromotionUsage {
    /// Unique row identifier.
    pub id: PromotionUsageId,
    /// The redeemed promotion.
    pub promotion_id: PromotionId,
    /// The redeeming user.
    pub user_id: UserId,
    /// The order the redemption is tied to.
    pub order_id: OrderId,
    /// Discount granted.
    pub discount_amount: Money,
    /// Order amount the discount was computed from.
    pub order_amount: Money,
    /// Unix timestamp of redemption.
    pub used_at: i64,
}

impl PromotionUsage {
    pub fn new(
        promotion_id: PromotionId,
        user_id: UserId,
        order_id: OrderId,
        discount_amount: Money,
        order_amount: Money,
    ) -> Self {
        Self {
            id: PromotionUsageId::generate(),
            promotion_id,
            user_id,
            order_id,
            discount_amount,
            order_amount,
            used_at: crate::current_timestamp(),
        }
    }
}
