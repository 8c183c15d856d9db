//! Order lifecycle service: guarded transitions, ownership checks, and
//! stock release on cancellation.

use std::sync::Arc;

use petshop_commerce::prelude::*;
use serde::{Deserialize, Serialize};

use crate::store::{MemoryStore, ProductStore};

/// Who is asking for an order operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Actor {
    /// Back-office staff; may act on any order.
    Staff,
    /// A customer; may only act on their own orders.
    Customer(UserId),
}

impl Actor {
    fn authorize(&self, order: &Order) -> Result<(), CommerceError> {
        match self {
            Actor::Staff => Ok(()),
            Actor::Customer(user_id) if *user_id == order.user_id => Ok(()),
            Actor::Customer(_) => Err(CommerceError::Forbidden(
                "order belongs to another customer".to_string(),
            )),
        }
    }
}

/// Public tracking view of an order, addressed by order code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderTracking {
    pub order_code: String,
    pub status: OrderStatus,
    pub tracking_number: Option<String>,
    pub history: Vec<StatusHistoryEntry>,
}

pub struct OrderService {
    store: Arc<MemoryStore>,
}

impl OrderService {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    pub fn get(&self, order_id: &OrderId, actor: &Actor) -> Result<Order, CommerceError> {
        self.store.read(|state| {
            let order = state.order(order_id)?;
            actor.authorize(order)?;
            Ok(order.clone())
        })
    }

    /// All orders of one user, newest first.
    pub fn orders_for_user(&self, user_id: &UserId) -> Vec<Order> {
        self.store.read(|state| state.orders_for_user(user_id))
    }

    /// Staff accepts a pending order.
    pub fn confirm(&self, order_id: &OrderId) -> Result<Order, CommerceError> {
        let order = self.store.transaction(|state| {
            let order = state.order_mut(order_id)?;
            order.confirm()?;
            Ok(order.clone())
        })?;
        tracing::info!(order = %order.order_code, "order confirmed");
        Ok(order)
    }

    /// Hand the order to the carrier, recording the tracking number.
    pub fn ship(
        &self,
        order_id: &OrderId,
        tracking_number: Option<String>,
    ) -> Result<Order, CommerceError> {
        let order = self.store.transaction(|state| {
            let order = state.order_mut(order_id)?;
            order.ship(tracking_number)?;
            Ok(order.clone())
        })?;
        tracing::info!(order = %order.order_code, "order shipped");
        Ok(order)
    }

    /// Mark the order delivered. COD payment settles on delivery, so
    /// this also marks the order paid.
    pub fn complete(&self, order_id: &OrderId) -> Result<Order, CommerceError> {
        let order = self.store.transaction(|state| {
            let order = state.order_mut(order_id)?;
            order.complete()?;
            Ok(order.clone())
        })?;
        tracing::info!(order = %order.order_code, "order completed and paid");
        Ok(order)
    }

    /// Cancel an order and return its reserved stock to inventory, in
    /// the same transaction. Customers may only cancel their own orders.
    pub fn cancel(
        &self,
        order_id: &OrderId,
        actor: &Actor,
        reason: Option<String>,
    ) -> Result<Order, CommerceError> {
        let order = self.store.transaction(|state| {
            let order = state.order_mut(order_id)?;
            actor.authorize(order)?;
            order.cancel(reason)?;
            let order = order.clone();
            for item in &order.items {
                state.increment_stock(&item.product_id, item.quantity);
            }
            Ok(order)
        })?;
        tracing::info!(order = %order.order_code, "order cancelled, stock released");
        Ok(order)
    }

    /// Public tracking by order code.
    pub fn track(&self, order_code: &str) -> Result<OrderTracking, CommerceError> {
        self.store.read(|state| {
            let order = state.order_by_code(order_code)?;
            Ok(OrderTracking {
                order_code: order.order_code.clone(),
                status: order.status,
                tracking_number: order.tracking_number.clone(),
                history: order.status_history(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::{CheckoutService, PlaceOrderRequest};
    use crate::CartService;

    fn placed_order(quantity: i64, stock: i64) -> (Arc<MemoryStore>, OrderService, Order, UserId, ProductId) {
        let store = Arc::new(MemoryStore::new());
        let mut user_id = UserId::new("placeholder");
        let mut product_id = ProductId::new("placeholder");
        store.seed(|state| {
            user_id = state.insert_user(User::new("Lan"));
            product_id = state.insert_product(Product::new(
                "Bird Cage",
                "BC-01",
                Money::vnd(250_000),
                stock,
            ));
        });
        CartService::new(Arc::clone(&store))
            .add_item(&user_id, &product_id, quantity)
            .unwrap();
        let order = CheckoutService::new(Arc::clone(&store))
            .place_order(
                &user_id,
                PlaceOrderRequest {
                    receiver_name: Some("Lan".to_string()),
                    receiver_phone: Some("0900000000".to_string()),
                    shipping_address: Some("1 Le Loi, Da Nang".to_string()),
                    ..PlaceOrderRequest::default()
                },
            )
            .unwrap();
        let service = OrderService::new(Arc::clone(&store));
        (store, service, order, user_id, product_id)
    }

    #[test]
    fn test_full_lifecycle_marks_paid_on_complete() {
        let (_, service, order, _, _) = placed_order(1, 10);

        let order = service.confirm(&order.id).unwrap();
        assert_eq!(order.status, OrderStatus::Confirmed);

        let order = service.ship(&order.id, Some("GHN123".to_string())).unwrap();
        assert_eq!(order.status, OrderStatus::Shipping);
        assert_eq!(order.tracking_number.as_deref(), Some("GHN123"));

        let order = service.complete(&order.id).unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn test_cancel_releases_every_line_independently() {
        let store = Arc::new(MemoryStore::new());
        let mut user_id = UserId::new("placeholder");
        let mut cage_id = ProductId::new("placeholder");
        let mut food_id = ProductId::new("placeholder");
        store.seed(|state| {
            user_id = state.insert_user(User::new("Lan"));
            cage_id = state.insert_product(Product::new(
                "Bird Cage",
                "BC-01",
                Money::vnd(250_000),
                10,
            ));
            food_id = state.insert_product(Product::new(
                "Bird Seed 500g",
                "BS-500",
                Money::vnd(40_000),
                20,
            ));
        });
        let carts = CartService::new(Arc::clone(&store));
        carts.add_item(&user_id, &cage_id, 1).unwrap();
        carts.add_item(&user_id, &food_id, 3).unwrap();
        let order = CheckoutService::new(Arc::clone(&store))
            .place_order(
                &user_id,
                PlaceOrderRequest {
                    receiver_name: Some("Lan".to_string()),
                    receiver_phone: Some("0900000000".to_string()),
                    shipping_address: Some("1 Le Loi, Da Nang".to_string()),
                    ..PlaceOrderRequest::default()
                },
            )
            .unwrap();
        store.read(|state| {
            assert_eq!(state.find_product(&cage_id).unwrap().stock, 9);
            assert_eq!(state.find_product(&food_id).unwrap().stock, 17);
        });

        let service = OrderService::new(Arc::clone(&store));
        service
            .cancel(&order.id, &Actor::Customer(user_id), None)
            .unwrap();

        store.read(|state| {
            let cage = state.find_product(&cage_id).unwrap();
            assert_eq!(cage.stock, 10);
            assert_eq!(cage.sold_quantity, 0);
            let food = state.find_product(&food_id).unwrap();
            assert_eq!(food.stock, 20);
            assert_eq!(food.sold_quantity, 0);
        });

        // a second cancel must not release the stock again
        let err = service.cancel(&order.id, &Actor::Staff, None).unwrap_err();
        assert!(matches!(err, CommerceError::InvalidOrderTransition { .. }));
        let stock = store.read(|state| state.find_product(&food_id).unwrap().stock);
        assert_eq!(stock, 20);
    }

    #[test]
    fn test_cancel_releases_single_unit() {
        let (store, service, order, user_id, product_id) = placed_order(1, 10);

        service
            .cancel(&order.id, &Actor::Customer(user_id), None)
            .unwrap();

        let product = store.read(|state| state.find_product(&product_id).unwrap().clone());
        assert_eq!(product.stock, 10);
        assert_eq!(product.sold_quantity, 0);
    }

    #[test]
    fn test_cancel_releases_stock() {
        let (store, service, order, user_id, product_id) = placed_order(3, 10);
        let before = store.read(|state| state.find_product(&product_id).unwrap().clone());
        assert_eq!(before.stock, 7);
        assert_eq!(before.sold_quantity, 3);

        let cancelled = service
            .cancel(&order.id, &Actor::Customer(user_id), Some("changed my mind".to_string()))
            .unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(cancelled.cancellation_reason.as_deref(), Some("changed my mind"));

        let after = store.read(|state| state.find_product(&product_id).unwrap().clone());
        assert_eq!(after.stock, 10);
        assert_eq!(after.sold_quantity, 0);
    }

    #[test]
    fn test_cancel_twice_rejected_and_stock_released_once() {
        let (store, service, order, _, product_id) = placed_order(2, 10);

        service.cancel(&order.id, &Actor::Staff, None).unwrap();
        let err = service.cancel(&order.id, &Actor::Staff, None).unwrap_err();
        assert!(matches!(err, CommerceError::InvalidOrderTransition { .. }));

        let stock = store.read(|state| state.find_product(&product_id).unwrap().stock);
        assert_eq!(stock, 10);
    }

    #[test]
    fn test_customer_cannot_touch_foreign_order() {
        let (_, service, order, _, _) = placed_order(1, 10);
        let stranger = Actor::Customer(UserId::new("someone-else"));

        let err = service.cancel(&order.id, &stranger, None).unwrap_err();
        assert!(matches!(err, CommerceError::Forbidden(_)));

        let err = service.get(&order.id, &stranger).unwrap_err();
        assert!(matches!(err, CommerceError::Forbidden(_)));

        // staff sees everything
        assert!(service.get(&order.id, &Actor::Staff).is_ok());
    }

    #[test]
    fn test_cancel_after_ship_rejected() {
        let (_, service, order, user_id, _) = placed_order(1, 10);
        service.confirm(&order.id).unwrap();
        service.ship(&order.id, None).unwrap();

        let err = service
            .cancel(&order.id, &Actor::Customer(user_id), None)
            .unwrap_err();
        assert!(matches!(err, CommerceError::InvalidOrderTransition { .. }));
    }

    #[test]
    fn test_track_by_order_code() {
        let (_, service, order, _, _) = placed_order(1, 10);
        service.confirm(&order.id).unwrap();

        let tracking = service.track(&order.order_code).unwrap();
        assert_eq!(tracking.status, OrderStatus::Confirmed);
        assert_eq!(tracking.history.len(), 2);
        assert_eq!(tracking.history[0].status, OrderStatus::Pending);

        let err = service.track("DH000").unwrap_err();
        assert!(matches!(err, CommerceError::OrderNotFound(_)));
    }
}
