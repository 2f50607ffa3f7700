use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{OrderLineRequest, OrderPage, OrderStatus, OrderView};
use crate::domain::ports::OrderStore;

/// The order engine's application surface: input validation and
/// authorization on top of the transactional store.
pub struct OrderService<R> {
    repo: R,
}

impl<R: OrderStore> OrderService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn place_order(
        &self,
        user_id: Uuid,
        shipping_address: String,
        payment_method: String,
        lines: Vec<OrderLineRequest>,
    ) -> Result<OrderView, DomainError> {
        if lines.is_empty() {
            return Err(DomainError::InvalidInput(
                "order must contain at least one item".to_string(),
            ));
        }
        if let Some(bad) = lines.iter().find(|l| l.quantity <= 0) {
            return Err(DomainError::InvalidInput(format!(
                "quantity must be positive for product {}",
                bad.product_id
            )));
        }
        if shipping_address.trim().is_empty() {
            return Err(DomainError::InvalidInput(
                "shipping address is required".to_string(),
            ));
        }
        if payment_method.trim().is_empty() {
            return Err(DomainError::InvalidInput(
                "payment method is required".to_string(),
            ));
        }
        self.repo
            .place(user_id, shipping_address, payment_method, lines)
    }

    /// An order is visible to its owner and to administrators only.
    pub fn get_order(
        &self,
        id: Uuid,
        requester: Uuid,
        is_admin: bool,
    ) -> Result<OrderView, DomainError> {
        let order = self.repo.find_by_id(id)?.ok_or(DomainError::NotFound)?;
        if order.user_id != requester && !is_admin {
            return Err(DomainError::Forbidden(
                "You do not have permission to view this order".to_string(),
            ));
        }
        Ok(order)
    }

    pub fn list_my_orders(&self, user_id: Uuid) -> Result<Vec<OrderView>, DomainError> {
        self.repo.list_for_user(user_id)
    }

    pub fn list_all_orders(&self, page: i64, limit: i64) -> Result<OrderPage, DomainError> {
        self.repo.list_all(page, limit)
    }

    /// Administrative status overwrite; any status may move to any other.
    pub fn update_status(&self, id: Uuid, status: &str) -> Result<OrderView, DomainError> {
        let status: OrderStatus = status.parse()?;
        self.repo.set_status(id, status)
    }

    pub fn cancel_order(&self, id: Uuid, requester: Uuid) -> Result<OrderView, DomainError> {
        self.repo.cancel(id, requester)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use bigdecimal::BigDecimal;
    use chrono::Utc;
    use uuid::Uuid;

    use super::OrderService;
    use crate::domain::errors::DomainError;
    use crate::domain::order::{
        OrderLineRequest, OrderPage, OrderStatus, OrderView, PaymentStatus,
    };
    use crate::domain::ports::OrderStore;

    /// Canned store: returns the configured orders, records which methods
    /// the service actually reached.
    struct StubStore {
        orders: Vec<OrderView>,
        placed: Mutex<u32>,
    }

    impl StubStore {
        fn with_orders(orders: Vec<OrderView>) -> Self {
            Self {
                orders,
                placed: Mutex::new(0),
            }
        }
    }

    fn sample_order(user_id: Uuid) -> OrderView {
        OrderView {
            id: Uuid::new_v4(),
            order_number: "ORD-20250610-001".to_string(),
            user_id,
            status: OrderStatus::Pending,
            total_amount: BigDecimal::from(0),
            shipping_address: "1 Main Street".to_string(),
            payment_method: "credit_card".to_string(),
            payment_status: PaymentStatus::Pending,
            ordered_at: Utc::now(),
            updated_at: Utc::now(),
            delivered_at: None,
            items: vec![],
        }
    }

    impl OrderStore for StubStore {
        fn place(
            &self,
            user_id: Uuid,
            _shipping_address: String,
            _payment_method: String,
            _lines: Vec<OrderLineRequest>,
        ) -> Result<OrderView, DomainError> {
            *self.placed.lock().unwrap() += 1;
            Ok(sample_order(user_id))
        }

        fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
            Ok(self.orders.iter().find(|o| o.id == id).cloned())
        }

        fn list_for_user(&self, user_id: Uuid) -> Result<Vec<OrderView>, DomainError> {
            Ok(self
                .orders
                .iter()
                .filter(|o| o.user_id == user_id)
                .cloned()
                .collect())
        }

        fn list_all(&self, _page: i64, _limit: i64) -> Result<OrderPage, DomainError> {
            Ok(OrderPage {
                items: self.orders.clone(),
                total: self.orders.len() as i64,
            })
        }

        fn set_status(&self, _id: Uuid, status: OrderStatus) -> Result<OrderView, DomainError> {
            let mut order = sample_order(Uuid::new_v4());
            order.status = status;
            Ok(order)
        }

        fn cancel(&self, _id: Uuid, requester: Uuid) -> Result<OrderView, DomainError> {
            let mut order = sample_order(requester);
            order.status = OrderStatus::Cancelled;
            Ok(order)
        }
    }

    #[test]
    fn empty_cart_is_rejected_before_reaching_the_store() {
        let store = StubStore::with_orders(vec![]);
        let service = OrderService::new(store);

        let err = service
            .place_order(
                Uuid::new_v4(),
                "1 Main Street".to_string(),
                "credit_card".to_string(),
                vec![],
            )
            .unwrap_err();

        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert_eq!(*service.repo.placed.lock().unwrap(), 0);
    }

    #[test]
    fn nonpositive_quantity_is_rejected() {
        let service = OrderService::new(StubStore::with_orders(vec![]));

        let err = service
            .place_order(
                Uuid::new_v4(),
                "1 Main Street".to_string(),
                "credit_card".to_string(),
                vec![OrderLineRequest {
                    product_id: Uuid::new_v4(),
                    quantity: 0,
                }],
            )
            .unwrap_err();

        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn blank_shipping_address_is_rejected() {
        let service = OrderService::new(StubStore::with_orders(vec![]));

        let err = service
            .place_order(
                Uuid::new_v4(),
                "   ".to_string(),
                "credit_card".to_string(),
                vec![OrderLineRequest {
                    product_id: Uuid::new_v4(),
                    quantity: 1,
                }],
            )
            .unwrap_err();

        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn owner_and_admin_may_read_an_order_others_may_not() {
        let owner = Uuid::new_v4();
        let order = sample_order(owner);
        let order_id = order.id;
        let service = OrderService::new(StubStore::with_orders(vec![order]));

        assert!(service.get_order(order_id, owner, false).is_ok());
        assert!(service.get_order(order_id, Uuid::new_v4(), true).is_ok());

        let err = service
            .get_order(order_id, Uuid::new_v4(), false)
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[test]
    fn reading_a_missing_order_is_not_found() {
        let service = OrderService::new(StubStore::with_orders(vec![]));

        let err = service
            .get_order(Uuid::new_v4(), Uuid::new_v4(), true)
            .unwrap_err();

        assert!(matches!(err, DomainError::NotFound));
    }

    #[test]
    fn unknown_status_never_reaches_the_store() {
        let service = OrderService::new(StubStore::with_orders(vec![]));

        let err = service
            .update_status(Uuid::new_v4(), "refunded")
            .unwrap_err();

        assert!(matches!(err, DomainError::InvalidStatus(s) if s == "refunded"));
    }

    #[test]
    fn known_status_is_forwarded() {
        let service = OrderService::new(StubStore::with_orders(vec![]));

        let order = service
            .update_status(Uuid::new_v4(), "shipped")
            .expect("update failed");

        assert_eq!(order.status, OrderStatus::Shipped);
    }
}
