use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::products;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub category_id: Uuid,
    pub price: BigDecimal,
    pub discount_price: Option<BigDecimal>,
    pub stock_quantity: i32,
    pub low_stock_threshold: i32,
    pub sku: String,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProduct {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub category_id: Uuid,
    pub price: BigDecimal,
    pub discount_price: Option<BigDecimal>,
    pub stock_quantity: i32,
    pub low_stock_threshold: i32,
    pub sku: String,
    pub image_url: Option<String>,
    pub is_active: bool,
}

/// Partial update for `PUT /products/{id}`. The slug is set at creation
/// and never touched again, and stock only moves through the catalog
/// store's adjustment operation, so neither appears here.
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = products)]
pub struct ProductChangeset {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub price: Option<BigDecimal>,
    pub discount_price: Option<Option<BigDecimal>>,
    pub low_stock_threshold: Option<i32>,
    pub image_url: Option<Option<String>>,
    pub is_active: Option<bool>,
}
