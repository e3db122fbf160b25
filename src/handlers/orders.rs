use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Number;
use utoipa::ToSchema;

use crate::domain::order::{NewOrder, Order, OrderLine, OrderLineInput};
use crate::errors::AppError;
use crate::AppState;

use super::{money, SuccessResponse};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderLineRequest {
    pub product_id: u64,
    pub quantity: i64,
}

/// Checkout payload. Any client-side price or total is ignored; prices are
/// read from the catalog when the order is placed.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<CreateOrderLineRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub success: bool,
    pub order_id: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineResponse {
    pub product_id: u64,
    pub product_name: String,
    pub quantity: u32,
    /// Unit price captured when the order was placed
    #[schema(value_type = f64)]
    pub price: Number,
}

impl From<OrderLine> for OrderLineResponse {
    fn from(l: OrderLine) -> Self {
        Self {
            product_id: l.product_id,
            product_name: l.product_name,
            quantity: l.quantity,
            price: money::to_json(&l.unit_price),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: u64,
    pub customer_name: String,
    pub customer_phone: String,
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: String,
    pub items: Vec<OrderLineResponse>,
    #[schema(value_type = f64)]
    pub total: Number,
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        Self {
            id: o.id,
            customer_name: o.customer_name,
            customer_phone: o.customer_phone,
            notes: o.notes,
            timestamp: o.ordered_at,
            completed_at: o.completed_at,
            status: o.status.as_str().to_string(),
            items: o.lines.into_iter().map(Into::into).collect(),
            total: money::to_json(&o.total),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    /// pending, processing, completed or cancelled
    pub status: String,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/orders
///
/// Prices every line from the current catalog and records a `pending` order.
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = CreateOrderResponse),
        (status = 400, description = "Validation error naming the offending field"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    state: web::Data<AppState>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let new_order = NewOrder {
        customer_name: body.customer_name,
        customer_phone: body.customer_phone,
        notes: body.notes,
        lines: body
            .items
            .into_iter()
            .map(|l| OrderLineInput {
                product_id: l.product_id,
                quantity: l.quantity,
            })
            .collect(),
    };

    let order_id = state.orders.create_order(new_order).await?;
    Ok(HttpResponse::Created().json(CreateOrderResponse {
        success: true,
        order_id,
    }))
}

/// GET /api/orders
///
/// Returns every order, newest first.
#[utoipa::path(
    get,
    path = "/api/orders",
    responses(
        (status = 200, description = "Orders, newest first", body = Vec<OrderResponse>),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let mut orders = state.orders.list_orders().await?;
    orders.sort_by(|a, b| b.ordered_at.cmp(&a.ordered_at).then(b.id.cmp(&a.id)));

    let body: Vec<OrderResponse> = orders.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/orders/{id}
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = u64, Path, description = "Order id"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    match state.orders.get_order(order_id).await? {
        Some(order) => Ok(HttpResponse::Ok().json(OrderResponse::from(order))),
        None => Err(AppError::NotFound(format!("Order {order_id}"))),
    }
}

/// PUT /api/orders/{id}
///
/// Moves an order along pending → processing → completed, or to cancelled.
#[utoipa::path(
    put,
    path = "/api/orders/{id}",
    params(
        ("id" = u64, Path, description = "Order id"),
    ),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = SuccessResponse),
        (status = 400, description = "Unknown status or disallowed transition"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn update_order_status(
    state: web::Data<AppState>,
    path: web::Path<u64>,
    body: web::Json<UpdateOrderStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    state
        .orders
        .update_order_status(order_id, &body.status)
        .await?;
    Ok(HttpResponse::Ok().json(SuccessResponse::ok()))
}
