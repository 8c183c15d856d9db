//! Promotion records and coupon validation rules.

use crate::error::CommerceError;
use crate::ids::{CategoryId, ProductId, PromotionId};
use crate::money::Money;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Value of a discount.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum DiscountValue {
    /// Percentage off the order amount, in whole percent [1, 100].
    Percentage(u32),
    /// Fixed amount off.
    FixedAmount(Money),
}

/// Why a coupon failed validation. Display strings are shown to the
/// customer as-is.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CouponRejection {
    #[error("Coupon not found")]
    NotFound,
    #[error("Coupon is not yet active")]
    NotYetActive,
    #[error("Coupon has expired")]
    Expired,
    #[error("Coupon is inactive")]
    Inactive,
    #[error("Coupon usage limit has been reached")]
    UsageExhausted,
    #[error("Order must be at least {min} to use this coupon")]
    BelowMinimum { min: Money },
    #[error("Coupon is for new customers only")]
    NewCustomersOnly,
    #[error("You have reached the usage limit for this coupon")]
    PerCustomerLimitReached,
}

/// Customer-specific facts needed by the user-scoped validation checks.
/// Supplied by the backend from its stores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CustomerFacts {
    /// Whether the customer has any completed orders.
    pub has_completed_orders: bool,
    /// How many times this customer has redeemed this promotion.
    pub usage_count: i64,
}

/// Wire-shaped result of validating a coupon code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CouponValidation {
    /// Whether the coupon may be applied.
    pub valid: bool,
    /// Human-readable outcome message.
    pub message: String,
    /// Computed discount; zero when invalid.
    pub discount_amount: Money,
    /// The coupon code, echoed back uppercased.
    pub coupon_code: Option<String>,
    /// Promotion display name.
    pub promotion_name: Option<String>,
}

impl CouponValidation {
    /// Build the success response for a validated promotion.
    pub fn valid(promotion: &Promotion, discount: Money) -> Self {
        Self {
            valid: true,
            message: "Coupon is valid".to_string(),
            discount_amount: discount,
            coupon_code: Some(promotion.coupon_code.clone()),
            promotion_name: Some(promotion.name.clone()),
        }
    }

    /// Build the failure response for a rejection.
    pub fn invalid(rejection: &CouponRejection) -> Self {
        Self {
            valid: false,
            message: rejection.to_string(),
            discount_amount: Money::default(),
            coupon_code: None,
            promotion_name: None,
        }
    }
}

/// A discount rule identified by a unique coupon code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Promotion {
    /// Unique promotion identifier.
    pub id: PromotionId,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Unique coupon code, stored uppercased.
    pub coupon_code: String,
    /// Discount value.
    pub value: DiscountValue,
    /// Cap on the computed discount (percentage promotions).
    pub max_discount_amount: Option<Money>,
    /// Minimum order amount to qualify.
    pub min_order_amount: Money,
    /// Global usage limit (None = unlimited).
    pub max_usage_count: Option<i64>,
    /// Successful redemptions to date.
    pub used_count: i64,
    /// Per-customer usage limit.
    pub limit_per_customer: Option<i64>,
    /// Validity window start (inclusive), Unix timestamp.
    pub starts_at: i64,
    /// Validity window end (exclusive), Unix timestamp.
    pub ends_at: i64,
    /// Whether the promotion is switched on.
    pub status: bool,
    /// Restrict to new customers (zero completed orders).
    pub for_new_customers_only: bool,
    /// Optional product allow-list.
    pub applicable_product_ids: Vec<ProductId>,
    /// Optional category allow-list.
    pub applicable_category_ids: Vec<CategoryId>,
}

impl Promotion {
    /// Create a percentage promotion. Fails when the percentage is
    /// outside [1, 100].
    pub fn percentage(
        code: impl Into<String>,
        name: impl Into<String>,
        percent: u32,
        starts_at: i64,
        ends_at: i64,
    ) -> Result<Self, CommerceError> {
        if !(1..=100).contains(&percent) {
            return Err(CommerceError::InvalidPercentage(percent));
        }
        Ok(Self::with_value(
            code,
            name,
            DiscountValue::Percentage(percent),
            starts_at,
            ends_at,
        ))
    }

    /// Create a fixed-amount promotion.
    pub fn fixed_amount(
        code: impl Into<String>,
        name: impl Into<String>,
        amount: Money,
        starts_at: i64,
        ends_at: i64,
    ) -> Self {
        Self::with_value(
            code,
            name,
            DiscountValue::FixedAmount(amount),
            starts_at,
            ends_at,
        )
    }

    fn with_value(
        code: impl Into<String>,
        name: impl Into<String>,
        value: DiscountValue,
        starts_at: i64,
        ends_at: i64,
    ) -> Self {
        Self {
            id: PromotionId::generate(),
            name: name.into(),
            description: None,
            coupon_code: code.into().to_uppercase(),
            value,
            max_discount_amount: None,
            min_order_amount: Money::default(),
            max_usage_count: None,
            used_count: 0,
            limit_per_customer: None,
            starts_at,
            ends_at,
            status: true,
            for_new_customers_only: false,
            applicable_product_ids: Vec::new(),
            applicable_category_ids: Vec::new(),
        }
    }

    /// Set the minimum qualifying order amount.
    pub fn with_min_order_amount(mut self, min: Money) -> Self {
        self.min_order_amount = min;
        self
    }

    /// Cap the computed discount.
    pub fn with_max_discount(mut self, cap: Money) -> Self {
        self.max_discount_amount = Some(cap);
        self
    }

    /// Set the global usage limit.
    pub fn with_usage_limit(mut self, limit: i64) -> Self {
        self.max_usage_count = Some(limit);
        self
    }

    /// Set the per-customer usage limit.
    pub fn with_per_customer_limit(mut self, limit: i64) -> Self {
        self.limit_per_customer = Some(limit);
        self
    }

    /// Restrict to customers with zero completed orders.
    pub fn for_new_customers(mut self) -> Self {
        self.for_new_customers_only = true;
        self
    }

    /// Whether the promotion is switched on and inside its validity
    /// window at `now`. The window is `[starts_at, ends_at)`.
    pub fn is_active_at(&self, now: i64) -> bool {
        self.status && now >= self.starts_at && now < self.ends_at
    }

    /// Whether the global usage limit is exhausted.
    pub fn is_exhausted(&self) -> bool {
        self.max_usage_count
            .map(|limit| self.used_count >= limit)
            .unwrap_or(false)
    }

    /// Run the ordered validation checks and compute the discount.
    ///
    /// First failing check wins. Existence (check 1 of the contract) is
    /// the store's responsibility; this starts at the activity check.
    /// `customer` is None for anonymous validation, which skips the
    /// user-scoped checks.
    pub fn validate_at(
        &self,
        now: i64,
        order_amount: Money,
        customer: Option<&CustomerFacts>,
    ) -> Result<Money, CouponRejection> {
        if !self.is_active_at(now) {
            return Err(if !self.status {
                CouponRejection::Inactive
            } else if now < self.starts_at {
                CouponRejection::NotYetActive
            } else {
                CouponRejection::Expired
            });
        }

        if self.is_exhausted() {
            return Err(CouponRejection::UsageExhausted);
        }

        if order_amount < self.min_order_amount {
            return Err(CouponRejection::BelowMinimum {
                min: self.min_order_amount,
            });
        }

        if let Some(facts) = customer {
            if self.for_new_customers_only && facts.has_completed_orders {
                return Err(CouponRejection::NewCustomersOnly);
            }
            if let Some(limit) = self.limit_per_customer {
                if facts.usage_count >= limit {
                    return Err(CouponRejection::PerCustomerLimitReached);
                }
            }
        }

        Ok(self.calculate_discount(order_amount))
    }

    /// Compute the discount for an order amount.
    ///
    /// Percentage discounts are capped by `max_discount_amount`; either
    /// type is capped at the order amount itself.
    pub fn calculate_discount(&self, order_amount: Money) -> Money {
        let discount = match self.value {
            DiscountValue::Percentage(percent) => {
                let raw = order_amount
                    .percentage(percent)
                    .unwrap_or_else(|| Money::zero(order_amount.currency));
                match self.max_discount_amount {
                    Some(cap) => raw.min(cap),
                    None => raw,
                }
            }
            DiscountValue::FixedAmount(amount) => amount,
        };
        discount.min(order_amount)
    }

    /// Record one successful redemption against the global counter.
    pub fn increment_usage(&mut self) {
        self.used_count += 1;
    }
}
