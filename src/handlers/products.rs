use std::str::FromStr;

use actix_web::{web, HttpRequest, HttpResponse};
use bigdecimal::BigDecimal;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::audit::{self, ActivityEvent};
use crate::auth::AdminUser;
use crate::db::DbPool;
use crate::domain::ports::CatalogStore;
use crate::domain::product::slugify;
use crate::errors::AppError;
use crate::infrastructure::catalog::DieselCatalogStore;
use crate::models::product::{NewProduct, Product, ProductChangeset};
use crate::schema::{categories, order_items, products};

type Catalog = web::Data<DieselCatalogStore>;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    /// Derived from the name when omitted; immutable afterwards.
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    pub category_id: Uuid,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price: String,
    pub discount_price: Option<String>,
    #[serde(default)]
    pub stock_quantity: i32,
    pub low_stock_threshold: Option<i32>,
    pub sku: String,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub price: Option<String>,
    pub discount_price: Option<String>,
    pub low_stock_threshold: Option<i32>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdjustStockRequest {
    /// Negative for a manual write-down, positive for a restock.
    pub delta: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StockAdjustmentResponse {
    pub product_id: Uuid,
    pub stock_quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub category_id: Uuid,
    pub price: String,
    pub discount_price: Option<String>,
    pub stock_quantity: i32,
    pub low_stock_threshold: i32,
    pub sku: String,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        ProductResponse {
            id: p.id,
            name: p.name,
            slug: p.slug,
            description: p.description,
            category_id: p.category_id,
            price: p.price.to_string(),
            discount_price: p.discount_price.map(|d| d.to_string()),
            stock_quantity: p.stock_quantity,
            low_stock_threshold: p.low_stock_threshold,
            sku: p.sku,
            image_url: p.image_url,
            is_active: p.is_active,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductListParams {
    pub category: Option<Uuid>,
    pub is_active: Option<bool>,
    /// Free-text match against name and description.
    pub search: Option<String>,
    #[serde(default = "super::default_page")]
    pub page: i64,
    #[serde(default = "super::default_page_size")]
    pub page_size: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LowStockParams {
    #[serde(default = "super::default_page")]
    pub page: i64,
    #[serde(default = "super::default_page_size")]
    pub page_size: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductListResponse {
    pub count: i64,
    pub num_pages: i64,
    pub current_page: i64,
    pub results: Vec<ProductResponse>,
}

fn parse_price(field: &str, value: &str) -> Result<BigDecimal, AppError> {
    let price = BigDecimal::from_str(value)
        .map_err(|e| AppError::InvalidInput(format!("Invalid {field} '{value}': {e}")))?;
    if price < BigDecimal::from(0) {
        return Err(AppError::InvalidInput(format!(
            "{field} must not be negative"
        )));
    }
    Ok(price)
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /products
///
/// Public catalog listing with optional category/is_active filters and a
/// free-text search over name and description.
#[utoipa::path(
    get,
    path = "/products",
    params(
        ("category" = Option<Uuid>, Query, description = "Filter by category id"),
        ("is_active" = Option<bool>, Query, description = "Filter by active flag"),
        ("search" = Option<String>, Query, description = "Substring match on name/description"),
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("page_size" = Option<i64>, Query, description = "Items per page (default 10, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated product listing", body = ProductListResponse),
    ),
    tag = "products"
)]
pub async fn list_products(
    pool: web::Data<DbPool>,
    query: web::Query<ProductListParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let (page, page_size, offset) = super::clamp_page(params.page, params.page_size);

    let (count, rows) = web::block(move || -> Result<(i64, Vec<Product>), AppError> {
        let mut conn = pool.get()?;
        let filtered = || {
            let mut q = products::table.into_boxed();
            if let Some(category) = params.category {
                q = q.filter(products::category_id.eq(category));
            }
            if let Some(active) = params.is_active {
                q = q.filter(products::is_active.eq(active));
            }
            if let Some(search) = &params.search {
                let pattern = format!("%{search}%");
                q = q.filter(
                    products::name
                        .ilike(pattern.clone())
                        .or(products::description.ilike(pattern)),
                );
            }
            q
        };

        let count: i64 = filtered().count().get_result(&mut conn)?;
        let rows = filtered()
            .select(Product::as_select())
            .order(products::created_at.desc())
            .limit(page_size)
            .offset(offset)
            .load(&mut conn)?;
        Ok((count, rows))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ProductListResponse {
        count,
        num_pages: super::num_pages(count, page_size),
        current_page: page,
        results: rows.into_iter().map(ProductResponse::from).collect(),
    }))
}

/// POST /products
#[utoipa::path(
    post,
    path = "/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid price or stock value"),
        (status = 403, description = "Caller is not an administrator"),
        (status = 404, description = "Category does not exist"),
        (status = 409, description = "Duplicate sku or slug"),
    ),
    tag = "products"
)]
pub async fn create_product(
    pool: web::Data<DbPool>,
    admin: AdminUser,
    body: web::Json<CreateProductRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let price = parse_price("price", &body.price)?;
    let discount_price = body
        .discount_price
        .as_deref()
        .map(|value| parse_price("discount_price", value))
        .transpose()?;
    if body.stock_quantity < 0 {
        return Err(AppError::InvalidInput(
            "stock_quantity must not be negative".to_string(),
        ));
    }
    let slug = match body.slug {
        Some(slug) => slug,
        None => slugify(&body.name),
    };
    if slug.is_empty() {
        return Err(AppError::InvalidInput(
            "a slug could not be derived from the name".to_string(),
        ));
    }

    let db = pool.get_ref().clone();
    let product = web::block(move || -> Result<Product, AppError> {
        let mut conn = db.get()?;
        let category_exists: bool = diesel::select(diesel::dsl::exists(
            categories::table.filter(categories::id.eq(body.category_id)),
        ))
        .get_result(&mut conn)?;
        if !category_exists {
            return Err(AppError::NotFound);
        }

        let product = diesel::insert_into(products::table)
            .values(&NewProduct {
                id: Uuid::new_v4(),
                name: body.name,
                slug,
                description: body.description,
                category_id: body.category_id,
                price,
                discount_price,
                stock_quantity: body.stock_quantity,
                low_stock_threshold: body.low_stock_threshold.unwrap_or(10),
                sku: body.sku,
                image_url: body.image_url,
                is_active: body.is_active.unwrap_or(true),
            })
            .returning(Product::as_returning())
            .get_result(&mut conn)?;
        Ok(product)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    audit::dispatch(
        pool.get_ref().clone(),
        ActivityEvent::new("product_created")
            .by(&admin.0)
            .on("product", product.id)
            .with_details(json!({ "name": product.name.clone(), "sku": product.sku.clone() }))
            .from_request(&req),
    );

    Ok(HttpResponse::Created().json(ProductResponse::from(product)))
}

/// GET /products/low-stock
///
/// Products at or below their low-stock threshold, administrators only.
#[utoipa::path(
    get,
    path = "/products/low-stock",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("page_size" = Option<i64>, Query, description = "Items per page (default 10, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated low-stock listing", body = ProductListResponse),
        (status = 403, description = "Caller is not an administrator"),
    ),
    tag = "products"
)]
pub async fn low_stock_products(
    pool: web::Data<DbPool>,
    _admin: AdminUser,
    query: web::Query<LowStockParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let (page, page_size, offset) = super::clamp_page(params.page, params.page_size);

    let (count, rows) = web::block(move || -> Result<(i64, Vec<Product>), AppError> {
        let mut conn = pool.get()?;
        let low = || products::table.filter(products::stock_quantity.le(products::low_stock_threshold));
        let count: i64 = low().count().get_result(&mut conn)?;
        let rows = low()
            .select(Product::as_select())
            .order(products::stock_quantity.asc())
            .limit(page_size)
            .offset(offset)
            .load(&mut conn)?;
        Ok((count, rows))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ProductListResponse {
        count,
        num_pages: super::num_pages(count, page_size),
        current_page: page,
        results: rows.into_iter().map(ProductResponse::from).collect(),
    }))
}

/// GET /products/{id}
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn get_product(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let product = web::block(move || -> Result<Option<Product>, AppError> {
        let mut conn = pool.get()?;
        Ok(products::table
            .filter(products::id.eq(product_id))
            .select(Product::as_select())
            .first(&mut conn)
            .optional()?)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match product {
        Some(product) => Ok(HttpResponse::Ok().json(ProductResponse::from(product))),
        None => Err(AppError::NotFound),
    }
}

/// PUT /products/{id}
///
/// Partial update. Slug and stock are not updatable here: the slug is
/// fixed at creation, stock moves only through the adjustment endpoint.
#[utoipa::path(
    put,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Invalid price value"),
        (status = 403, description = "Caller is not an administrator"),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn update_product(
    pool: web::Data<DbPool>,
    admin: AdminUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdateProductRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let body = body.into_inner();

    let changes = ProductChangeset {
        name: body.name,
        description: body.description,
        category_id: body.category_id,
        price: body
            .price
            .as_deref()
            .map(|value| parse_price("price", value))
            .transpose()?,
        discount_price: body
            .discount_price
            .as_deref()
            .map(|value| parse_price("discount_price", value).map(Some))
            .transpose()?,
        low_stock_threshold: body.low_stock_threshold,
        image_url: body.image_url.map(Some),
        is_active: body.is_active,
    };

    let db = pool.get_ref().clone();
    let product = web::block(move || -> Result<Option<Product>, AppError> {
        let mut conn = db.get()?;
        let no_changes = changes.name.is_none()
            && changes.description.is_none()
            && changes.category_id.is_none()
            && changes.price.is_none()
            && changes.discount_price.is_none()
            && changes.low_stock_threshold.is_none()
            && changes.image_url.is_none()
            && changes.is_active.is_none();
        if no_changes {
            return Ok(products::table
                .filter(products::id.eq(product_id))
                .select(Product::as_select())
                .first(&mut conn)
                .optional()?);
        }
        Ok(diesel::update(products::table.filter(products::id.eq(product_id)))
            .set(&changes)
            .returning(Product::as_returning())
            .get_result(&mut conn)
            .optional()?)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let Some(product) = product else {
        return Err(AppError::NotFound);
    };

    audit::dispatch(
        pool.get_ref().clone(),
        ActivityEvent::new("product_updated")
            .by(&admin.0)
            .on("product", product.id)
            .with_details(json!({ "name": product.name.clone(), "sku": product.sku.clone() }))
            .from_request(&req),
    );

    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// DELETE /products/{id}
///
/// Refused while any order item references the product; order history
/// outlives the catalog.
#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 403, description = "Caller is not an administrator"),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Product is referenced by order history"),
    ),
    tag = "products"
)]
pub async fn delete_product(
    pool: web::Data<DbPool>,
    admin: AdminUser,
    path: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();

    let db = pool.get_ref().clone();
    let deleted = web::block(move || -> Result<Product, AppError> {
        let mut conn = db.get()?;
        let referenced: bool = diesel::select(diesel::dsl::exists(
            order_items::table.filter(order_items::product_id.eq(product_id)),
        ))
        .get_result(&mut conn)?;
        if referenced {
            return Err(AppError::Conflict(
                "Product is referenced by existing orders and cannot be deleted".to_string(),
            ));
        }
        diesel::delete(products::table.filter(products::id.eq(product_id)))
            .returning(Product::as_returning())
            .get_result(&mut conn)
            .optional()?
            .ok_or(AppError::NotFound)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    audit::dispatch(
        pool.get_ref().clone(),
        ActivityEvent::new("product_deleted")
            .by(&admin.0)
            .on("product", deleted.id)
            .with_details(json!({ "name": deleted.name, "sku": deleted.sku }))
            .from_request(&req),
    );

    Ok(HttpResponse::NoContent().finish())
}

/// POST /products/{id}/adjust-stock
///
/// Administrative restock or write-down through the catalog store's
/// guarded adjustment; going below zero is rejected.
#[utoipa::path(
    post,
    path = "/products/{id}/adjust-stock",
    params(("id" = Uuid, Path, description = "Product UUID")),
    request_body = AdjustStockRequest,
    responses(
        (status = 200, description = "Stock adjusted", body = StockAdjustmentResponse),
        (status = 400, description = "Adjustment would make stock negative"),
        (status = 403, description = "Caller is not an administrator"),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn adjust_product_stock(
    pool: web::Data<DbPool>,
    catalog: Catalog,
    admin: AdminUser,
    path: web::Path<Uuid>,
    body: web::Json<AdjustStockRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let delta = body.into_inner().delta;

    let catalog = catalog.clone();
    let product = web::block(move || {
        catalog.adjust_stock(product_id, delta)?;
        catalog.get_product(product_id)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??
    .ok_or(AppError::NotFound)?;

    audit::dispatch(
        pool.get_ref().clone(),
        ActivityEvent::new("stock_adjusted")
            .by(&admin.0)
            .on("product", product_id)
            .with_details(json!({
                "delta": delta,
                "stock_quantity": product.stock_quantity,
            }))
            .from_request(&req),
    );

    Ok(HttpResponse::Ok().json(StockAdjustmentResponse {
        product_id,
        stock_quantity: product.stock_quantity,
    }))
}
