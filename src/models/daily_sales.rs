use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::daily_sales;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = daily_sales)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DailySales {
    pub id: Uuid,
    pub date: NaiveDate,
    pub total_orders: i32,
    pub total_revenue: BigDecimal,
    pub total_items_sold: i32,
    pub average_order_value: BigDecimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = daily_sales)]
pub struct NewDailySales {
    pub id: Uuid,
    pub date: NaiveDate,
    pub total_orders: i32,
    pub total_revenue: BigDecimal,
    pub total_items_sold: i32,
    pub average_order_value: BigDecimal,
}
