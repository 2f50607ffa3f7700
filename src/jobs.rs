use std::env;
use std::time::Duration;

use bigdecimal::BigDecimal;
use chrono::{Days, NaiveTime, TimeZone, Utc};
use diesel::prelude::*;
use serde_json::json;
use uuid::Uuid;

use crate::audit::{self, ActivityEvent};
use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::OrderStatus;
use crate::models::daily_sales::NewDailySales;
use crate::schema::{daily_sales, order_items, orders, products};

const DEFAULT_INTERVAL_SECS: u64 = 3600;

/// Spawns the recurring analytics runner. Jobs run immediately at startup
/// and then every `JOBS_INTERVAL_SECS` seconds, on the blocking pool.
pub fn spawn(pool: DbPool) {
    let interval_secs = env::var("JOBS_INTERVAL_SECS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_INTERVAL_SECS);
    log::info!("Scheduling analytics jobs every {interval_secs}s");

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        loop {
            ticker.tick().await;
            let pool = pool.clone();
            if let Err(e) = tokio::task::spawn_blocking(move || run_all(&pool)).await {
                log::error!("analytics job runner panicked: {e}");
            }
        }
    });
}

fn run_all(pool: &DbPool) {
    if let Err(e) = daily_sales_aggregation(pool) {
        log::error!("daily_sales_aggregation failed: {e}");
    }
    if let Err(e) = low_stock_alert(pool) {
        log::error!("low_stock_alert failed: {e}");
    }
    if let Err(e) = pending_order_reminder(pool) {
        log::error!("pending_order_reminder failed: {e}");
    }
}

/// Aggregates yesterday's delivered orders into one `daily_sales` row,
/// overwriting any earlier run for the same day.
pub fn daily_sales_aggregation(pool: &DbPool) -> Result<(), DomainError> {
    log::info!("Running daily_sales_aggregation...");
    let mut conn = pool.get()?;

    let yesterday = Utc::now().date_naive() - Days::new(1);
    let start = Utc.from_utc_datetime(&yesterday.and_time(NaiveTime::MIN));
    let end = Utc.from_utc_datetime(&(yesterday + Days::new(1)).and_time(NaiveTime::MIN));
    let delivered = OrderStatus::Delivered.as_str();

    let total_orders: i64 = orders::table
        .filter(orders::status.eq(delivered))
        .filter(orders::ordered_at.ge(start))
        .filter(orders::ordered_at.lt(end))
        .count()
        .get_result(&mut conn)?;

    let total_revenue: Option<BigDecimal> = orders::table
        .filter(orders::status.eq(delivered))
        .filter(orders::ordered_at.ge(start))
        .filter(orders::ordered_at.lt(end))
        .select(diesel::dsl::sum(orders::total_amount))
        .first(&mut conn)?;
    let total_revenue = total_revenue.unwrap_or_else(|| BigDecimal::from(0));

    let total_items_sold: Option<i64> = order_items::table
        .inner_join(orders::table)
        .filter(orders::status.eq(delivered))
        .filter(orders::ordered_at.ge(start))
        .filter(orders::ordered_at.lt(end))
        .select(diesel::dsl::sum(order_items::quantity))
        .first(&mut conn)?;
    let total_items_sold = total_items_sold.unwrap_or(0);

    let average_order_value = if total_orders > 0 {
        (total_revenue.clone() / BigDecimal::from(total_orders)).with_scale(2)
    } else {
        BigDecimal::from(0)
    };

    let row = NewDailySales {
        id: Uuid::new_v4(),
        date: yesterday,
        total_orders: total_orders as i32,
        total_revenue: total_revenue.clone(),
        total_items_sold: total_items_sold as i32,
        average_order_value,
    };
    diesel::insert_into(daily_sales::table)
        .values(&row)
        .on_conflict(daily_sales::date)
        .do_update()
        .set((
            daily_sales::total_orders.eq(row.total_orders),
            daily_sales::total_revenue.eq(row.total_revenue.clone()),
            daily_sales::total_items_sold.eq(row.total_items_sold),
            daily_sales::average_order_value.eq(row.average_order_value.clone()),
        ))
        .execute(&mut conn)?;

    log::info!("Aggregated sales for {yesterday}: {total_revenue} (Orders: {total_orders})");
    Ok(())
}

/// Records an audit event naming every product at or below its low-stock
/// threshold.
pub fn low_stock_alert(pool: &DbPool) -> Result<(), DomainError> {
    log::info!("Running low_stock_alert...");
    let mut conn = pool.get()?;

    let names: Vec<String> = products::table
        .filter(products::stock_quantity.le(products::low_stock_threshold))
        .select(products::name)
        .load(&mut conn)?;

    if names.is_empty() {
        log::info!("No low stock products found.");
        return Ok(());
    }

    log::warn!("Low stock alert: {} products", names.len());
    audit::record(
        pool,
        ActivityEvent::new("low_stock_alert")
            .on("system", "")
            .with_details(json!({ "count": names.len(), "products": names })),
    );
    Ok(())
}

/// Records an audit event counting orders still pending 24 hours after
/// placement.
pub fn pending_order_reminder(pool: &DbPool) -> Result<(), DomainError> {
    log::info!("Running pending_order_reminder...");
    let mut conn = pool.get()?;

    let cutoff = Utc::now() - chrono::Duration::hours(24);
    let count: i64 = orders::table
        .filter(orders::status.eq(OrderStatus::Pending.as_str()))
        .filter(orders::ordered_at.le(cutoff))
        .count()
        .get_result(&mut conn)?;

    if count == 0 {
        return Ok(());
    }

    log::warn!("Pending order reminder: {count} orders older than 24h");
    audit::record(
        pool,
        ActivityEvent::new("pending_order_reminder")
            .on("system", "")
            .with_details(json!({ "count": count })),
    );
    Ok(())
}
