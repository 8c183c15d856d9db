//! Order records and the status state machine.
//!
//! Transitions follow a fixed table: PENDING → CONFIRMED → SHIPPING →
//! COMPLETED, with CANCELLED reachable from PENDING or CONFIRMED only.
//! Anything else fails with `InvalidOrderTransition` and changes nothing.

use crate::catalog::Product;
use crate::customer::Receiver;
use crate::error::CommerceError;
use crate::ids::{OrderId, OrderItemId, ProductId, UserId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Order placed, awaiting confirmation.
    #[default]
    Pending,
    /// Order confirmed by staff.
    Confirmed,
    /// Order handed to the carrier.
    Shipping,
    /// Order delivered and paid.
    Completed,
    /// Order cancelled; stock returned.
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipping => "shipping",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Check if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Check if an order in this status can be cancelled.
    pub fn can_cancel(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Confirmed)
    }
}

/// Payment method chosen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    Cod,
    /// Bank transfer.
    BankTransfer,
}

/// Payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    /// Awaiting payment.
    #[default]
    Pending,
    /// Payment received.
    Paid,
    /// Payment returned after cancellation.
    Refunded,
}

/// A customer order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,
    /// Human-readable order code (e.g., "DH17259..").
    pub order_code: String,
    /// Owning user.
    pub user_id: UserId,
    /// Current status.
    pub status: OrderStatus,
    /// Sum of item subtotals.
    pub subtotal: Money,
    /// Shipping fee charged.
    pub shipping_fee: Money,
    /// Discount applied.
    pub discount: Money,
    /// subtotal + shipping_fee − discount.
    pub total_amount: Money,
    /// Applied coupon code, if any.
    pub coupon_code: Option<String>,
    /// Payment method.
    pub payment_method: PaymentMethod,
    /// Payment status.
    pub payment_status: PaymentStatus,
    /// Delivery receiver.
    pub receiver: Receiver,
    /// Carrier tracking number, set when shipped.
    pub tracking_number: Option<String>,
    /// Customer note.
    pub notes: Option<String>,
    /// Reason recorded at cancellation.
    pub cancellation_reason: Option<String>,
    /// Snapshotted items.
    pub items: Vec<OrderItem>,
    /// Unix timestamp when placed.
    pub ordered_at: i64,
    /// Set once on confirm.
    pub confirmed_at: Option<i64>,
    /// Set once on ship.
    pub shipped_at: Option<i64>,
    /// Set once on complete.
    pub completed_at: Option<i64>,
    /// Set once on cancel.
    pub cancelled_at: Option<i64>,
}

impl Order {
    /// Create a PENDING order shell; monetary fields are filled in by the
    /// checkout orchestrator before persisting.
    pub fn new(user_id: UserId, receiver: Receiver, payment_method: PaymentMethod) -> Self {
        Self {
            id: OrderId::generate(),
            order_code: generate_order_code(),
            user_id,
            status: OrderStatus::Pending,
            subtotal: Money::zero(Currency::VND),
            shipping_fee: Money::zero(Currency::VND),
            discount: Money::zero(Currency::VND),
            total_amount: Money::zero(Currency::VND),
            coupon_code: None,
            payment_method,
            payment_status: PaymentStatus::Pending,
            receiver,
            tracking_number: None,
            notes: None,
            cancellation_reason: None,
            items: Vec::new(),
            ordered_at: crate::current_timestamp(),
            confirmed_at: None,
            shipped_at: None,
            completed_at: None,
            cancelled_at: None,
        }
    }

    /// Recompute `total_amount = subtotal + shipping_fee − discount`.
    /// The caller guarantees the discount never exceeds subtotal plus
    /// shipping, so the total stays non-negative.
    pub fn calculate_total_amount(&mut self) -> Result<(), CommerceError> {
        self.total_amount = self
            .subtotal
            .try_add(&self.shipping_fee)
            .and_then(|t| t.try_subtract(&self.discount))
            .ok_or(CommerceError::Overflow)?;
        Ok(())
    }

    /// Total item count.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// PENDING → CONFIRMED.
    pub fn confirm(&mut self) -> Result<(), CommerceError> {
        if self.status != OrderStatus::Pending {
            return Err(self.transition_error(OrderStatus::Confirmed));
        }
        self.status = OrderStatus::Confirmed;
        set_once(&mut self.confirmed_at);
        Ok(())
    }

    /// CONFIRMED → SHIPPING, recording the tracking number when given.
    pub fn ship(&mut self, tracking_number: Option<String>) -> Result<(), CommerceError> {
        if self.status != OrderStatus::Confirmed {
            return Err(self.transition_error(OrderStatus::Shipping));
        }
        self.status = OrderStatus::Shipping;
        set_once(&mut self.shipped_at);
        if tracking_number.is_some() {
            self.tracking_number = tracking_number;
        }
        Ok(())
    }

    /// SHIPPING → COMPLETED; payment moves to PAID.
    pub fn complete(&mut self) -> Result<(), CommerceError> {
        if self.status != OrderStatus::Shipping {
            return Err(self.transition_error(OrderStatus::Completed));
        }
        self.status = OrderStatus::Completed;
        set_once(&mut self.completed_at);
        self.payment_status = PaymentStatus::Paid;
        Ok(())
    }

    /// PENDING/CONFIRMED → CANCELLED, recording the reason.
    ///
    /// Releasing the reserved stock of the order's items is the caller's
    /// side of this transition; it happens in the same transaction.
    pub fn cancel(&mut self, reason: Option<String>) -> Result<(), CommerceError> {
        if !self.status.can_cancel() {
            return Err(self.transition_error(OrderStatus::Cancelled));
        }
        self.status = OrderStatus::Cancelled;
        set_once(&mut self.cancelled_at);
        self.cancellation_reason = reason;
        Ok(())
    }

    fn transition_error(&self, to: OrderStatus) -> CommerceError {
        CommerceError::InvalidOrderTransition {
            from: self.status.as_str().to_string(),
            to: to.as_str().to_string(),
        }
    }

    /// Reconstruct the status history from the recorded timestamps, in
    /// order of occurrence.
    pub fn status_history(&self) -> Vec<StatusHistoryEntry> {
        let mut history = vec![StatusHistoryEntry {
            status: OrderStatus::Pending,
            at: self.ordered_at,
            note: "Order placed".to_string(),
        }];
        if let Some(at) = self.confirmed_at {
            history.push(StatusHistoryEntry {
                status: OrderStatus::Confirmed,
                at,
                note: "Order confirmed".to_string(),
            });
        }
        if let Some(at) = self.shipped_at {
            let note = match &self.tracking_number {
                Some(t) => format!("Order shipped - tracking {t}"),
                None => "Order shipped".to_string(),
            };
            history.push(StatusHistoryEntry {
                status: OrderStatus::Shipping,
                at,
                note,
            });
        }
        if let Some(at) = self.completed_at {
            history.push(StatusHistoryEntry {
                status: OrderStatus::Completed,
                at,
                note: "Order completed".to_string(),
            });
        }
        if let Some(at) = self.cancelled_at {
            let note = match &self.cancellation_reason {
                Some(r) => format!("Order cancelled - {r}"),
                None => "Order cancelled".to_string(),
            };
            history.push(StatusHistoryEntry {
                status: OrderStatus::Cancelled,
                at,
                note,
            });
        }
        history
    }
}

/// One step in an order's status history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusHistoryEntry {
    /// Status reached.
    pub status: OrderStatus,
    /// Unix timestamp of the transition.
    pub at: i64,
    /// Display note.
    pub note: String,
}

/// An immutable snapshot of a product at order time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    /// Unique line identifier.
    pub id: OrderItemId,
    /// Product ordered.
    pub product_id: ProductId,
    /// Product name at order time.
    pub product_name: String,
    /// SKU at order time.
    pub sku: String,
    /// Image URL at order time.
    pub image: Option<String>,
    /// Quantity ordered.
    pub quantity: i64,
    /// Regular price at order time.
    pub price_at_time: Money,
    /// Sale price at order time, if any.
    pub sale_price_at_time: Option<Money>,
    /// Effective price × quantity.
    pub subtotal: Money,
}

impl OrderItem {
    /// Snapshot a product into an order line.
    pub fn new(product: &Product, quantity: i64) -> Result<Self, CommerceError> {
        let subtotal = product
            .effective_price()
            .try_multiply(quantity)
            .ok_or(CommerceError::Overflow)?;
        Ok(Self {
            id: OrderItemId::generate(),
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            sku: product.sku.clone(),
            image: product.image.clone(),
            quantity,
            price_at_time: product.price,
            sale_price_at_time: product.sale_price,
            subtotal,
        })
    }
}

/// Generate a human-readable order code.
fn generate_order_code() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let counter = COUNTER.fetch_add(1, Ordering::SeqCst);

    format!("DH{}{:03}", millis, counter % 1000)
}

/// Set a timestamp slot the first time only; retries keep the original.
fn set_once(slot: &mut Option<i64>) {
    if slot.is_none() {
        *slot = Some(crate::current_timestamp());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receiver() -> Receiver {
        Receiver {
            name: "Tran Minh".to_string(),
            phone: "0901234567".to_string(),
            shipping_address: "12 Nguyen Trai, Ha Noi".to_string(),
        }
    }

    fn order() -> Order {
        Order::new(UserId::new("u1"), receiver(), PaymentMethod::Cod)
    }

    #[test]
    fn test_order_code_format() {
        let o = order();
        assert!(o.order_code.starts_with("DH"));
        assert_ne!(o.order_code, order().order_code);
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut o = order();
        o.confirm().unwrap();
        assert_eq!(o.status, OrderStatus::Confirmed);
        assert!(o.confirmed_at.is_some());

        o.ship(Some("GHN123".to_string())).unwrap();
        assert_eq!(o.status, OrderStatus::Shipping);
        assert_eq!(o.tracking_number.as_deref(), Some("GHN123"));

        o.complete().unwrap();
        assert_eq!(o.status, OrderStatus::Completed);
        assert_eq!(o.payment_status, PaymentStatus::Paid);
        assert!(o.completed_at.is_some());
    }

    #[test]
    fn test_cancel_from_pending_and_confirmed() {
        let mut o = order();
        o.cancel(Some("changed my mind".to_string())).unwrap();
        assert_eq!(o.status, OrderStatus::Cancelled);
        assert_eq!(o.cancellation_reason.as_deref(), Some("changed my mind"));

        let mut o = order();
        o.confirm().unwrap();
        o.cancel(None).unwrap();
        assert_eq!(o.status, OrderStatus::Cancelled);
    }

    #[test]
    fn test_illegal_transitions_leave_state_unchanged() {
        // Every (state, event) pair outside the table must fail and
        // change nothing.
        let mut shipping = order();
        shipping.confirm().unwrap();
        shipping.ship(None).unwrap();

        let before = shipping.clone();
        assert!(shipping.confirm().is_err());
        assert!(shipping.ship(None).is_err());
        assert!(shipping.cancel(None).is_err());
        assert_eq!(shipping, before);

        let mut completed = before.clone();
        completed.complete().unwrap();
        let before = completed.clone();
        assert!(completed.confirm().is_err());
        assert!(completed.ship(None).is_err());
        assert!(completed.complete().is_err());
        assert!(completed.cancel(None).is_err());
        assert_eq!(completed, before);

        let mut cancelled = order();
        cancelled.cancel(None).unwrap();
        let before = cancelled.clone();
        assert!(cancelled.confirm().is_err());
        assert!(cancelled.ship(None).is_err());
        assert!(cancelled.complete().is_err());
        assert!(cancelled.cancel(None).is_err());
        assert_eq!(cancelled, before);

        let mut pending = order();
        assert!(pending.ship(None).is_err());
        assert!(pending.complete().is_err());
        assert_eq!(pending.status, OrderStatus::Pending);
    }

    #[test]
    fn test_timestamps_set_once() {
        let mut o = order();
        o.confirm().unwrap();
        let first = o.confirmed_at;
        // A rejected retry must not disturb the recorded timestamp.
        assert!(o.confirm().is_err());
        assert_eq!(o.confirmed_at, first);
    }

    #[test]
    fn test_total_amount_breakdown() {
        let mut o = order();
        o.subtotal = Money::vnd(200_000);
        o.shipping_fee = Money::vnd(30_000);
        o.discount = Money::vnd(20_000);
        o.calculate_total_amount().unwrap();
        assert_eq!(o.total_amount, Money::vnd(210_000));
    }

    #[test]
    fn test_status_history_order() {
        let mut o = order();
        o.confirm().unwrap();
        o.ship(Some("GHN9".to_string())).unwrap();
        o.complete().unwrap();

        let history = o.status_history();
        let statuses: Vec<OrderStatus> = history.iter().map(|h| h.status).collect();
        assert_eq!(
            statuses,
            vec![
                OrderStatus::Pending,
                OrderStatus::Confirmed,
                OrderStatus::Shipping,
                OrderStatus::Completed,
            ]
        );
        assert!(history[2].note.contains("GHN9"));
    }
}
