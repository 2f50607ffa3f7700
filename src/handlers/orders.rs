use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::orders::OrderService;
use crate::audit::{self, ActivityEvent};
use crate::auth::{AdminUser, AuthenticatedUser};
use crate::db::DbPool;
use crate::domain::order::{OrderItemView, OrderLineRequest, OrderView};
use crate::errors::AppError;
use crate::infrastructure::order_repo::DieselOrderRepository;

type Orders = web::Data<OrderService<DieselOrderRepository>>;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub shipping_address: String,
    pub payment_method: String,
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price: String,
    pub subtotal: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Uuid,
    pub status: String,
    pub total_amount: String,
    pub shipping_address: String,
    pub payment_method: String,
    pub payment_status: String,
    pub ordered_at: String,
    pub updated_at: String,
    pub delivered_at: Option<String>,
    pub items: Vec<OrderItemResponse>,
}

impl From<OrderItemView> for OrderItemResponse {
    fn from(item: OrderItemView) -> Self {
        OrderItemResponse {
            id: item.id,
            product_id: item.product_id,
            product_name: item.product_name,
            quantity: item.quantity,
            price: item.price.to_string(),
            subtotal: item.subtotal.to_string(),
        }
    }
}

impl From<OrderView> for OrderResponse {
    fn from(order: OrderView) -> Self {
        OrderResponse {
            id: order.id,
            order_number: order.order_number,
            user_id: order.user_id,
            status: order.status.to_string(),
            total_amount: order.total_amount.to_string(),
            shipping_address: order.shipping_address,
            payment_method: order.payment_method,
            payment_status: order.payment_status.to_string(),
            ordered_at: order.ordered_at.to_rfc3339(),
            updated_at: order.updated_at.to_rfc3339(),
            delivered_at: order.delivered_at.map(|t| t.to_rfc3339()),
            items: order.items.into_iter().map(OrderItemResponse::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListOrdersParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "super::default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 10, maximum 100.
    #[serde(default = "super::default_page_size")]
    pub limit: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Places an order for the authenticated user. Stock validation, price
/// snapshotting, order numbering, the order/item inserts, and the stock
/// decrements all run in a single database transaction; a failure on any
/// line leaves nothing behind.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = OrderResponse),
        (status = 400, description = "Invalid cart or insufficient stock"),
        (status = 404, description = "Referenced product does not exist"),
        (status = 409, description = "Store contention, retry the request"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    service: Orders,
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
    body: web::Json<CreateOrderRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let lines: Vec<OrderLineRequest> = body
        .items
        .iter()
        .map(|item| OrderLineRequest {
            product_id: item.product_id,
            quantity: item.quantity,
        })
        .collect();

    let user_id = user.id;
    let service = service.clone();
    let order = web::block(move || {
        service.place_order(user_id, body.shipping_address, body.payment_method, lines)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    audit::dispatch(
        pool.get_ref().clone(),
        ActivityEvent::new("order_created")
            .by(&user)
            .on("order", order.id)
            .with_details(json!({
                "order_number": order.order_number.clone(),
                "total_amount": order.total_amount.to_string(),
            }))
            .from_request(&req),
    );

    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// GET /orders
///
/// The authenticated user's own orders, newest first.
#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "The caller's orders", body = [OrderResponse]),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    service: Orders,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let user_id = user.id;
    let service = service.clone();
    let orders = web::block(move || service.list_my_orders(user_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let responses: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
    Ok(HttpResponse::Ok().json(responses))
}

/// GET /orders/{id}
///
/// Visible to the order's owner and to administrators.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 403, description = "Caller is neither owner nor admin"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: Orders,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let requester = user.id;
    let is_admin = user.is_admin();
    let service = service.clone();
    let order = web::block(move || service.get_order(order_id, requester, is_admin))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// PATCH /orders/{id}/status
///
/// Administrative status overwrite. Any status may move to any other;
/// moving to `delivered` stamps the delivery time.
#[utoipa::path(
    patch,
    path = "/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order UUID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = OrderResponse),
        (status = 400, description = "Status not in the enumeration"),
        (status = 403, description = "Caller is not an administrator"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn update_order_status(
    service: Orders,
    pool: web::Data<DbPool>,
    admin: AdminUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdateOrderStatusRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let status = body.into_inner().status;
    let service = service.clone();
    let status_for_update = status.clone();
    let order = web::block(move || service.update_status(order_id, &status_for_update))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    audit::dispatch(
        pool.get_ref().clone(),
        ActivityEvent::new("order_status_updated")
            .by(&admin.0)
            .on("order", order.id)
            .with_details(json!({ "new_status": status }))
            .from_request(&req),
    );

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// DELETE /orders/{id}/cancel
///
/// Owner-driven cancellation of a pending order. The status change and
/// every restock adjustment commit as one transaction.
#[utoipa::path(
    delete,
    path = "/orders/{id}/cancel",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 204, description = "Order cancelled, stock restored"),
        (status = 400, description = "Order is no longer pending"),
        (status = 403, description = "Caller does not own the order"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn cancel_order(
    service: Orders,
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let requester = user.id;
    let service = service.clone();
    let order = web::block(move || service.cancel_order(order_id, requester))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    audit::dispatch(
        pool.get_ref().clone(),
        ActivityEvent::new("order_cancelled")
            .by(&user)
            .on("order", order.id)
            .with_details(json!({ "order_number": order.order_number }))
            .from_request(&req),
    );

    Ok(HttpResponse::NoContent().finish())
}

/// GET /orders/admin/all
///
/// Paginated listing of every order, administrators only.
#[utoipa::path(
    get,
    path = "/orders/admin/all",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 10, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
        (status = 403, description = "Caller is not an administrator"),
    ),
    tag = "orders"
)]
pub async fn admin_list_orders(
    service: Orders,
    _admin: AdminUser,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let (page, limit, _offset) = super::clamp_page(params.page, params.limit);

    let service = service.clone();
    let result = web::block(move || service.list_all_orders(page, limit))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        items: result.items.into_iter().map(OrderResponse::from).collect(),
        total: result.total,
        page,
        limit,
    }))
}
