//! Promotion and coupon module.
//!
//! Contains the promotion record, the ordered coupon validation rules,
//! discount calculation, and the redemption audit row.

mod promotion;
mod usage;

pub use promotion::{
    CouponRejection, CouponValidation, CustomerFacts, DiscountValue, Promotion,
};
pub use usage::PromotionUsage;
