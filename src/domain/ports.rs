use uuid::Uuid;

use super::errors::DomainError;
use super::order::{OrderLineRequest, OrderPage, OrderStatus, OrderView};
use super::product::ProductView;

/// Authoritative record of product price and stock.
pub trait CatalogStore: Send + Sync + 'static {
    fn get_product(&self, id: Uuid) -> Result<Option<ProductView>, DomainError>;

    /// Applies `stock_quantity += delta` (negative for a sale, positive for
    /// a restock or a cancellation reversal). Fails with
    /// `InsufficientStock` when the result would go negative; concurrent
    /// adjustments of the same product serialize on the row.
    fn adjust_stock(&self, product_id: Uuid, delta: i32) -> Result<(), DomainError>;
}

/// Persistence arm of the order engine. `place` and `cancel` are each one
/// atomic transaction: the order rows and every stock adjustment commit
/// together or not at all.
pub trait OrderStore: Send + Sync + 'static {
    fn place(
        &self,
        user_id: Uuid,
        shipping_address: String,
        payment_method: String,
        lines: Vec<OrderLineRequest>,
    ) -> Result<OrderView, DomainError>;

    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError>;

    fn list_for_user(&self, user_id: Uuid) -> Result<Vec<OrderView>, DomainError>;

    fn list_all(&self, page: i64, limit: i64) -> Result<OrderPage, DomainError>;

    fn set_status(&self, id: Uuid, status: OrderStatus) -> Result<OrderView, DomainError>;

    fn cancel(&self, id: Uuid, requester: Uuid) -> Result<OrderView, DomainError>;
}
