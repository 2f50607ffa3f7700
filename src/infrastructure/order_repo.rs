use std::collections::HashMap;

use bigdecimal::BigDecimal;
use chrono::{Days, NaiveDate, NaiveTime, TimeZone, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{
    order_number, OrderItemView, OrderLineRequest, OrderPage, OrderStatus, OrderView, PaymentStatus,
};
use crate::domain::ports::OrderStore;
use crate::models::order::{NewOrder, Order};
use crate::models::order_item::{NewOrderItem, OrderItem};
use crate::models::product::Product;
use crate::schema::{order_items, orders, products};

use super::catalog::apply_stock_adjustment;

/// Bounded retry for the whole placement transaction. Two placements on
/// the same day can compute the same sequence number; the loser's insert
/// aborts on the order_number unique constraint, and the next attempt
/// recomputes the sequence from the fresh count. Serialization failures
/// reported by Postgres retry the same way.
const PLACE_ATTEMPTS: u32 = 3;

// ── Repository ────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl OrderStore for DieselOrderRepository {
    fn place(
        &self,
        user_id: Uuid,
        shipping_address: String,
        payment_method: String,
        lines: Vec<OrderLineRequest>,
    ) -> Result<OrderView, DomainError> {
        let mut conn = self.pool.get()?;
        let mut last = DomainError::Internal("order placement retries exhausted".to_string());
        for _ in 0..PLACE_ATTEMPTS {
            match place_in_transaction(&mut conn, user_id, &shipping_address, &payment_method, &lines)
            {
                Err(DomainError::Conflict(msg)) => last = DomainError::Conflict(msg),
                other => return other,
            }
        }
        Err(last)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;
        let order = orders::table
            .filter(orders::id.eq(id))
            .select(Order::as_select())
            .first(&mut conn)
            .optional()?;
        let Some(order) = order else {
            return Ok(None);
        };
        let items = load_items(&mut conn, &[order.id])?
            .remove(&order.id)
            .unwrap_or_default();
        view_from_row(order, items).map(Some)
    }

    fn list_for_user(&self, user_id: Uuid) -> Result<Vec<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows: Vec<Order> = orders::table
            .filter(orders::user_id.eq(user_id))
            .order(orders::ordered_at.desc())
            .select(Order::as_select())
            .load(&mut conn)?;
        let ids: Vec<Uuid> = rows.iter().map(|o| o.id).collect();
        let mut items = load_items(&mut conn, &ids)?;
        rows.into_iter()
            .map(|order| {
                let order_items = items.remove(&order.id).unwrap_or_default();
                view_from_row(order, order_items)
            })
            .collect()
    }

    fn list_all(&self, page: i64, limit: i64) -> Result<OrderPage, DomainError> {
        let mut conn = self.pool.get()?;
        let offset = (page - 1) * limit;
        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = orders::table.count().get_result(conn)?;

            let rows: Vec<Order> = orders::table
                .select(Order::as_select())
                .order(orders::ordered_at.desc())
                .limit(limit)
                .offset(offset)
                .load(conn)?;
            let ids: Vec<Uuid> = rows.iter().map(|o| o.id).collect();
            let mut items = load_items(conn, &ids)?;
            let views = rows
                .into_iter()
                .map(|order| {
                    let order_items = items.remove(&order.id).unwrap_or_default();
                    view_from_row(order, order_items)
                })
                .collect::<Result<Vec<_>, _>>()?;

            Ok(OrderPage {
                items: views,
                total,
            })
        })
    }

    fn set_status(&self, id: Uuid, status: OrderStatus) -> Result<OrderView, DomainError> {
        let mut conn = self.pool.get()?;
        let target = orders::table.filter(orders::id.eq(id));
        let updated: Option<Order> = if status == OrderStatus::Delivered {
            diesel::update(target)
                .set((
                    orders::status.eq(status.as_str()),
                    orders::delivered_at.eq(Some(Utc::now())),
                ))
                .returning(Order::as_returning())
                .get_result(&mut conn)
                .optional()?
        } else {
            diesel::update(target)
                .set(orders::status.eq(status.as_str()))
                .returning(Order::as_returning())
                .get_result(&mut conn)
                .optional()?
        };
        let order = updated.ok_or(DomainError::NotFound)?;
        let items = load_items(&mut conn, &[order.id])?
            .remove(&order.id)
            .unwrap_or_default();
        view_from_row(order, items)
    }

    fn cancel(&self, id: Uuid, requester: Uuid) -> Result<OrderView, DomainError> {
        let mut conn = self.pool.get()?;
        conn.transaction::<_, DomainError, _>(|conn| {
            let order: Order = orders::table
                .filter(orders::id.eq(id))
                .select(Order::as_select())
                .for_update()
                .first(conn)
                .optional()?
                .ok_or(DomainError::NotFound)?;

            if order.user_id != requester {
                return Err(DomainError::Forbidden(
                    "You do not have permission to cancel this order".to_string(),
                ));
            }
            if order.status != OrderStatus::Pending.as_str() {
                return Err(DomainError::InvalidState(
                    "Only pending orders can be cancelled".to_string(),
                ));
            }

            let rows: Vec<OrderItem> = order_items::table
                .filter(order_items::order_id.eq(order.id))
                .select(OrderItem::as_select())
                .load(conn)?;

            // Restock in product-id order, mirroring placement's lock order.
            let mut restock: HashMap<Uuid, i32> = HashMap::new();
            for item in &rows {
                *restock.entry(item.product_id).or_insert(0) += item.quantity;
            }
            let mut restock: Vec<(Uuid, i32)> = restock.into_iter().collect();
            restock.sort_by_key(|(product_id, _)| *product_id);
            for (product_id, quantity) in restock {
                apply_stock_adjustment(conn, product_id, quantity)?;
            }

            let cancelled: Order = diesel::update(orders::table.filter(orders::id.eq(order.id)))
                .set(orders::status.eq(OrderStatus::Cancelled.as_str()))
                .returning(Order::as_returning())
                .get_result(conn)?;

            let items = load_items(conn, &[cancelled.id])?
                .remove(&cancelled.id)
                .unwrap_or_default();
            view_from_row(cancelled, items)
        })
    }
}

// ── Placement transaction ─────────────────────────────────────────────────────

/// One atomic attempt at order placement: lock the product rows, validate
/// stock, snapshot prices, number the order, insert it with its items, and
/// decrement stock. Any failure rolls the whole attempt back.
fn place_in_transaction(
    conn: &mut PgConnection,
    user_id: Uuid,
    shipping_address: &str,
    payment_method: &str,
    lines: &[OrderLineRequest],
) -> Result<OrderView, DomainError> {
    conn.transaction::<_, DomainError, _>(|conn| {
        // Lock in ascending product-id order so two carts touching the same
        // products cannot deadlock against each other.
        let mut product_ids: Vec<Uuid> = lines.iter().map(|l| l.product_id).collect();
        product_ids.sort();
        product_ids.dedup();

        let mut locked: HashMap<Uuid, Product> = HashMap::new();
        for product_id in product_ids.iter().copied() {
            let product = products::table
                .filter(products::id.eq(product_id))
                .select(Product::as_select())
                .for_update()
                .first(conn)
                .optional()?
                .ok_or(DomainError::NotFound)?;
            locked.insert(product.id, product);
        }

        // Validate against a running remainder: a cart that repeats a
        // product must not pass line-by-line while overshooting in total.
        let order_id = Uuid::new_v4();
        let mut remaining: HashMap<Uuid, i32> = HashMap::new();
        let mut new_items = Vec::with_capacity(lines.len());
        let mut total_amount = BigDecimal::from(0);
        for line in lines {
            let product = locked.get(&line.product_id).ok_or(DomainError::NotFound)?;
            let left = remaining.entry(product.id).or_insert(product.stock_quantity);
            if *left < line.quantity {
                return Err(DomainError::InsufficientStock {
                    product: product.name.clone(),
                    available: *left,
                });
            }
            *left -= line.quantity;

            let price = product.price.clone();
            let subtotal = (price.clone() * BigDecimal::from(line.quantity)).with_scale(2);
            total_amount += subtotal.clone();
            new_items.push(NewOrderItem {
                id: Uuid::new_v4(),
                order_id,
                product_id: product.id,
                quantity: line.quantity,
                price,
                subtotal,
            });
        }

        let today = Utc::now().date_naive();
        let sequence = orders_created_on(conn, today)? + 1;

        let order: Order = diesel::insert_into(orders::table)
            .values(&NewOrder {
                id: order_id,
                order_number: order_number(today, sequence),
                user_id,
                status: OrderStatus::Pending.as_str().to_string(),
                total_amount: total_amount.with_scale(2),
                shipping_address: shipping_address.to_string(),
                payment_method: payment_method.to_string(),
                payment_status: PaymentStatus::Pending.as_str().to_string(),
            })
            .returning(Order::as_returning())
            .get_result(conn)?;

        let inserted: Vec<OrderItem> = diesel::insert_into(order_items::table)
            .values(&new_items)
            .returning(OrderItem::as_returning())
            .get_results(conn)?;

        for line in lines {
            apply_stock_adjustment(conn, line.product_id, -line.quantity)?;
        }

        let item_views = inserted
            .into_iter()
            .map(|item| {
                let product_name = locked
                    .get(&item.product_id)
                    .map(|p| p.name.clone())
                    .unwrap_or_default();
                item_view(item, product_name)
            })
            .collect();
        view_from_row(order, item_views)
    })
}

/// Count of orders created on `day` (UTC), used to derive the day's next
/// sequence number inside the placement transaction.
fn orders_created_on(conn: &mut PgConnection, day: NaiveDate) -> Result<i64, DomainError> {
    let start = Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN));
    let end = Utc.from_utc_datetime(&(day + Days::new(1)).and_time(NaiveTime::MIN));
    let count = orders::table
        .filter(orders::ordered_at.ge(start))
        .filter(orders::ordered_at.lt(end))
        .count()
        .get_result(conn)?;
    Ok(count)
}

// ── Row/view mapping ──────────────────────────────────────────────────────────

fn load_items(
    conn: &mut PgConnection,
    order_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<OrderItemView>>, DomainError> {
    if order_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(OrderItem, String)> = order_items::table
        .inner_join(products::table)
        .filter(order_items::order_id.eq_any(order_ids))
        .select((OrderItem::as_select(), products::name))
        .load(conn)?;
    let mut by_order: HashMap<Uuid, Vec<OrderItemView>> = HashMap::new();
    for (item, product_name) in rows {
        by_order
            .entry(item.order_id)
            .or_default()
            .push(item_view(item, product_name));
    }
    Ok(by_order)
}

fn item_view(item: OrderItem, product_name: String) -> OrderItemView {
    OrderItemView {
        id: item.id,
        product_id: item.product_id,
        product_name,
        quantity: item.quantity,
        price: item.price,
        subtotal: item.subtotal,
    }
}

fn view_from_row(order: Order, items: Vec<OrderItemView>) -> Result<OrderView, DomainError> {
    let status = order.status.parse::<OrderStatus>().map_err(|_| {
        DomainError::Internal(format!(
            "order {} carries unknown status '{}'",
            order.id, order.status
        ))
    })?;
    let payment_status = order.payment_status.parse::<PaymentStatus>().map_err(|_| {
        DomainError::Internal(format!(
            "order {} carries unknown payment status '{}'",
            order.id, order.payment_status
        ))
    })?;
    Ok(OrderView {
        id: order.id,
        order_number: order.order_number,
        user_id: order.user_id,
        status,
        total_amount: order.total_amount,
        shipping_address: order.shipping_address,
        payment_method: order.payment_method,
        payment_status,
        ordered_at: order.ordered_at,
        updated_at: order.updated_at,
        delivered_at: order.delivered_at,
        items,
    })
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use uuid::Uuid;

    use super::DieselOrderRepository;
    use crate::domain::errors::DomainError;
    use crate::domain::order::{OrderLineRequest, OrderStatus, PaymentStatus};
    use crate::domain::ports::OrderStore;
    use crate::infrastructure::testing::{order_count, product_stock, seed_product, setup_db};

    fn line(product_id: Uuid, quantity: i32) -> OrderLineRequest {
        OrderLineRequest {
            product_id,
            quantity,
        }
    }

    fn place(
        repo: &DieselOrderRepository,
        user_id: Uuid,
        lines: Vec<OrderLineRequest>,
    ) -> Result<crate::domain::order::OrderView, DomainError> {
        repo.place(
            user_id,
            "1 Main Street".to_string(),
            "credit_card".to_string(),
            lines,
        )
    }

    fn decimal(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    #[tokio::test]
    async fn place_creates_order_with_items_and_decrements_stock() {
        let (_container, pool) = setup_db().await;
        let lamp = seed_product(&pool, "Desk Lamp", "9.99", 10);
        let mug = seed_product(&pool, "Coffee Mug", "4.25", 3);
        let repo = DieselOrderRepository::new(pool.clone());
        let user_id = Uuid::new_v4();

        let order = place(&repo, user_id, vec![line(lamp, 2), line(mug, 1)]).expect("place failed");

        assert_eq!(order.user_id, user_id);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert!(order.order_number.starts_with("ORD-"));
        assert_eq!(order.total_amount, decimal("24.23"));
        assert_eq!(order.items.len(), 2);

        let lamp_item = order
            .items
            .iter()
            .find(|i| i.product_id == lamp)
            .expect("lamp item missing");
        assert_eq!(lamp_item.product_name, "Desk Lamp");
        assert_eq!(lamp_item.quantity, 2);
        assert_eq!(lamp_item.price, decimal("9.99"));
        assert_eq!(lamp_item.subtotal, decimal("19.98"));

        assert_eq!(product_stock(&pool, lamp), 8);
        assert_eq!(product_stock(&pool, mug), 2);
    }

    #[tokio::test]
    async fn place_is_all_or_nothing_when_any_line_lacks_stock() {
        let (_container, pool) = setup_db().await;
        let lamp = seed_product(&pool, "Desk Lamp", "9.99", 10);
        let mug = seed_product(&pool, "Coffee Mug", "4.25", 1);
        let repo = DieselOrderRepository::new(pool.clone());

        let err = place(&repo, Uuid::new_v4(), vec![line(lamp, 2), line(mug, 5)]).unwrap_err();

        match err {
            DomainError::InsufficientStock { product, available } => {
                assert_eq!(product, "Coffee Mug");
                assert_eq!(available, 1);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
        assert_eq!(order_count(&pool), 0);
        assert_eq!(product_stock(&pool, lamp), 10);
        assert_eq!(product_stock(&pool, mug), 1);
    }

    #[tokio::test]
    async fn repeated_product_lines_validate_against_aggregate_quantity() {
        let (_container, pool) = setup_db().await;
        let lamp = seed_product(&pool, "Desk Lamp", "9.99", 5);
        let repo = DieselOrderRepository::new(pool.clone());

        let err = place(&repo, Uuid::new_v4(), vec![line(lamp, 3), line(lamp, 3)]).unwrap_err();

        assert!(matches!(err, DomainError::InsufficientStock { .. }));
        assert_eq!(order_count(&pool), 0);
        assert_eq!(product_stock(&pool, lamp), 5);
    }

    #[tokio::test]
    async fn place_with_unknown_product_is_not_found() {
        let (_container, pool) = setup_db().await;
        let repo = DieselOrderRepository::new(pool.clone());

        let err = place(&repo, Uuid::new_v4(), vec![line(Uuid::new_v4(), 1)]).unwrap_err();

        assert!(matches!(err, DomainError::NotFound));
        assert_eq!(order_count(&pool), 0);
    }

    #[tokio::test]
    async fn cancel_restores_stock_and_rejects_a_second_attempt() {
        let (_container, pool) = setup_db().await;
        let lamp = seed_product(&pool, "Desk Lamp", "9.99", 10);
        let repo = DieselOrderRepository::new(pool.clone());
        let user_id = Uuid::new_v4();

        let order = place(&repo, user_id, vec![line(lamp, 2)]).expect("place failed");
        assert_eq!(order.total_amount, decimal("19.98"));
        assert_eq!(product_stock(&pool, lamp), 8);

        let cancelled = repo.cancel(order.id, user_id).expect("cancel failed");
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(product_stock(&pool, lamp), 10);

        let err = repo.cancel(order.id, user_id).unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
        assert_eq!(product_stock(&pool, lamp), 10);
    }

    #[tokio::test]
    async fn cancel_by_non_owner_is_forbidden() {
        let (_container, pool) = setup_db().await;
        let lamp = seed_product(&pool, "Desk Lamp", "9.99", 10);
        let repo = DieselOrderRepository::new(pool.clone());
        let owner = Uuid::new_v4();

        let order = place(&repo, owner, vec![line(lamp, 2)]).expect("place failed");

        let err = repo.cancel(order.id, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let unchanged = repo
            .find_by_id(order.id)
            .expect("find failed")
            .expect("order should exist");
        assert_eq!(unchanged.status, OrderStatus::Pending);
        assert_eq!(product_stock(&pool, lamp), 8);
    }

    #[tokio::test]
    async fn cancel_after_shipment_is_rejected_and_changes_nothing() {
        let (_container, pool) = setup_db().await;
        let lamp = seed_product(&pool, "Desk Lamp", "9.99", 10);
        let repo = DieselOrderRepository::new(pool.clone());
        let user_id = Uuid::new_v4();

        let order = place(&repo, user_id, vec![line(lamp, 2)]).expect("place failed");
        repo.set_status(order.id, OrderStatus::Shipped)
            .expect("status update failed");

        let err = repo.cancel(order.id, user_id).unwrap_err();

        assert!(matches!(err, DomainError::InvalidState(_)));
        let unchanged = repo
            .find_by_id(order.id)
            .expect("find failed")
            .expect("order should exist");
        assert_eq!(unchanged.status, OrderStatus::Shipped);
        assert_eq!(product_stock(&pool, lamp), 8);
    }

    #[tokio::test]
    async fn set_status_stamps_delivery_time() {
        let (_container, pool) = setup_db().await;
        let lamp = seed_product(&pool, "Desk Lamp", "9.99", 10);
        let repo = DieselOrderRepository::new(pool.clone());

        let order = place(&repo, Uuid::new_v4(), vec![line(lamp, 1)]).expect("place failed");
        assert!(order.delivered_at.is_none());

        let delivered = repo
            .set_status(order.id, OrderStatus::Delivered)
            .expect("status update failed");

        assert_eq!(delivered.status, OrderStatus::Delivered);
        assert!(delivered.delivered_at.is_some());
    }

    #[tokio::test]
    async fn set_status_for_unknown_order_is_not_found() {
        let (_container, pool) = setup_db().await;
        let repo = DieselOrderRepository::new(pool);

        let err = repo
            .set_status(Uuid::new_v4(), OrderStatus::Confirmed)
            .unwrap_err();

        assert!(matches!(err, DomainError::NotFound));
    }

    #[tokio::test]
    async fn find_by_id_returns_none_for_unknown_id() {
        let (_container, pool) = setup_db().await;
        let repo = DieselOrderRepository::new(pool);

        let result = repo
            .find_by_id(Uuid::new_v4())
            .expect("find should not error");

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn order_numbers_are_distinct_within_a_day() {
        let (_container, pool) = setup_db().await;
        let lamp = seed_product(&pool, "Desk Lamp", "9.99", 100);
        let repo = DieselOrderRepository::new(pool);
        let user_id = Uuid::new_v4();

        let mut numbers = Vec::new();
        for _ in 0..5 {
            let order = place(&repo, user_id, vec![line(lamp, 1)]).expect("place failed");
            numbers.push(order.order_number);
        }

        let mut deduped = numbers.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), 5, "numbers must be unique: {numbers:?}");
        assert!(numbers[0].ends_with("-001"));
        assert!(numbers[4].ends_with("-005"));
    }

    #[tokio::test]
    async fn concurrent_placement_never_oversells() {
        let (_container, pool) = setup_db().await;
        let lamp = seed_product(&pool, "Desk Lamp", "5.00", 5);
        let repo = DieselOrderRepository::new(pool.clone());

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let repo = repo.clone();
                std::thread::spawn(move || {
                    repo.place(
                        Uuid::new_v4(),
                        "1 Main Street".to_string(),
                        "credit_card".to_string(),
                        vec![OrderLineRequest {
                            product_id: lamp,
                            quantity: 3,
                        }],
                    )
                })
            })
            .collect();
        let results: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("placement thread panicked"))
            .collect();

        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1, "exactly one placement must win: {results:?}");
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(DomainError::InsufficientStock { .. }))));
        assert_eq!(product_stock(&pool, lamp), 2);
    }

    #[tokio::test]
    async fn concurrent_placements_receive_distinct_order_numbers() {
        let (_container, pool) = setup_db().await;
        let lamp = seed_product(&pool, "Desk Lamp", "9.99", 10);
        let mug = seed_product(&pool, "Coffee Mug", "4.25", 10);
        let repo = DieselOrderRepository::new(pool);

        let handles: Vec<_> = [lamp, mug]
            .into_iter()
            .map(|product_id| {
                let repo = repo.clone();
                std::thread::spawn(move || {
                    repo.place(
                        Uuid::new_v4(),
                        "1 Main Street".to_string(),
                        "credit_card".to_string(),
                        vec![OrderLineRequest {
                            product_id,
                            quantity: 1,
                        }],
                    )
                })
            })
            .collect();
        let results: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("placement thread panicked"))
            .collect();

        let numbers: Vec<String> = results
            .into_iter()
            .map(|r| r.expect("both placements should succeed").order_number)
            .collect();
        assert_ne!(numbers[0], numbers[1]);
    }

    #[tokio::test]
    async fn list_for_user_returns_only_their_orders_newest_first() {
        let (_container, pool) = setup_db().await;
        let lamp = seed_product(&pool, "Desk Lamp", "9.99", 100);
        let repo = DieselOrderRepository::new(pool);
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        place(&repo, alice, vec![line(lamp, 1)]).expect("place failed");
        place(&repo, bob, vec![line(lamp, 1)]).expect("place failed");
        place(&repo, alice, vec![line(lamp, 2)]).expect("place failed");

        let listed = repo.list_for_user(alice).expect("list failed");

        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|o| o.user_id == alice));
        assert_eq!(listed[0].items.len(), 1);
        assert_eq!(listed[0].items[0].quantity, 2, "newest order first");
    }

    #[tokio::test]
    async fn list_all_paginates() {
        let (_container, pool) = setup_db().await;
        let lamp = seed_product(&pool, "Desk Lamp", "9.99", 100);
        let repo = DieselOrderRepository::new(pool);
        let user_id = Uuid::new_v4();

        for _ in 0..5 {
            place(&repo, user_id, vec![line(lamp, 1)]).expect("place failed");
        }

        let page1 = repo.list_all(1, 3).expect("list page 1 failed");
        assert_eq!(page1.total, 5);
        assert_eq!(page1.items.len(), 3);

        let page2 = repo.list_all(2, 3).expect("list page 2 failed");
        assert_eq!(page2.total, 5);
        assert_eq!(page2.items.len(), 2);
    }
}
