//! Store contracts the service layer depends on.

use petshop_commerce::prelude::*;

/// Product lookup and the stock ledger.
pub trait ProductStore {
    fn find_product(&self, id: &ProductId) -> Result<&Product, CommerceError>;

    /// Reserve stock for an order line. Fails when the product is
    /// inactive or fewer than `quantity` units remain; on success the
    /// stock count drops and the sold count rises by `quantity`.
    fn decrement_stock(&mut self, id: &ProductId, quantity: i64) -> Result<(), CommerceError>;

    /// Return previously reserved stock to inventory. Adds back
    /// `quantity` units and reduces the sold count, floored at zero.
    /// Unknown products are a no-op.
    fn increment_stock(&mut self, id: &ProductId, quantity: i64);
}

/// Customer lookup and the facts coupon validation needs.
pub trait UserStore {
    fn find_user(&self, id: &UserId) -> Result<&User, CommerceError>;

    /// Whether the user has at least one COMPLETED order. A customer
    /// with none counts as new for new-customer-only promotions.
    fn has_completed_orders(&self, id: &UserId) -> bool;
}
