//! Shipping fee policy.

use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Pluggable rule for computing the shipping fee of an order.
pub trait ShippingPolicy {
    /// Fee for an order with the given subtotal.
    fn fee(&self, subtotal: Money) -> Money;
}

/// Flat-rate shipping with threshold-based free shipping: free at or
/// above the threshold, a fixed fee below it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FlatRateShipping {
    /// Orders at or above this subtotal ship free.
    pub free_threshold: Money,
    /// Fee charged below the threshold.
    pub flat_fee: Money,
}

impl FlatRateShipping {
    pub fn new(free_threshold: Money, flat_fee: Money) -> Self {
        Self {
            free_threshold,
            flat_fee,
        }
    }
}

impl Default for FlatRateShipping {
    /// The shop's standard rule: free shipping from 500,000 VND,
    /// otherwise 30,000 VND.
    fn default() -> Self {
        Self::new(Money::vnd(500_000), Money::vnd(30_000))
    }
}

impl ShippingPolicy for FlatRateShipping {
    fn fee(&self, subtotal: Money) -> Money {
        if subtotal >= self.free_threshold {
            Money::zero(subtotal.currency)
        } else {
            self.flat_fee
        }
    }
}
