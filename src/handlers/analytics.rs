use actix_web::{web, HttpResponse};
use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::AdminUser;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::daily_sales::DailySales;
use crate::schema::daily_sales;

#[derive(Debug, Serialize, ToSchema)]
pub struct DailySalesResponse {
    pub date: String,
    pub total_orders: i32,
    pub total_revenue: String,
    pub total_items_sold: i32,
    pub average_order_value: String,
}

impl From<DailySales> for DailySalesResponse {
    fn from(row: DailySales) -> Self {
        DailySalesResponse {
            date: row.date.to_string(),
            total_orders: row.total_orders,
            total_revenue: row.total_revenue.to_string(),
            total_items_sold: row.total_items_sold,
            average_order_value: row.average_order_value.to_string(),
        }
    }
}

/// GET /analytics/daily-sales
///
/// Per-day aggregates produced by the scheduled aggregation job, newest
/// day first.
#[utoipa::path(
    get,
    path = "/analytics/daily-sales",
    responses(
        (status = 200, description = "Daily sales aggregates", body = [DailySalesResponse]),
        (status = 403, description = "Caller is not an administrator"),
    ),
    tag = "analytics"
)]
pub async fn list_daily_sales(
    pool: web::Data<DbPool>,
    _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    let rows = web::block(move || -> Result<Vec<DailySales>, AppError> {
        let mut conn = pool.get()?;
        Ok(daily_sales::table
            .select(DailySales::as_select())
            .order(daily_sales::date.desc())
            .load(&mut conn)?)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let responses: Vec<DailySalesResponse> =
        rows.into_iter().map(DailySalesResponse::from).collect();
    Ok(HttpResponse::Ok().json(responses))
}
